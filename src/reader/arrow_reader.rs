//! Readers for the `arrow` backend.
//!
//! Delimited and JSON Lines files infer their schema from the first
//! `infer_schema_length` records. Parquet and IPC files carry their own schema.
//! Every reader yields record batches of at most `batch_size` rows, stops
//! after `n_rows` rows and returns the requested `columns` in request order.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatchReader;
use log::trace;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{DocframeError, Result};
use crate::reader::ReadOptions;
use crate::table::{ArrowTable, DataFrame, Table};

/// Read options understood by the CSV and TSV readers.
pub const DELIMITED_OPTIONS: &[&str] = &[
    "delimiter",
    "has_header",
    "n_rows",
    "columns",
    "batch_size",
    "infer_schema_length",
];

/// Read options understood by the JSON Lines reader.
pub const JSON_OPTIONS: &[&str] = &["n_rows", "columns", "batch_size", "infer_schema_length"];

/// Read options understood by the Parquet reader.
pub const PARQUET_OPTIONS: &[&str] = &["n_rows", "columns", "batch_size"];

/// Read options understood by the IPC reader.
pub const IPC_OPTIONS: &[&str] = &["n_rows", "columns"];

pub fn read_csv(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    read_delimited(path, options, b',')
}

pub fn read_tsv(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    read_delimited(path, options, b'\t')
}

fn read_delimited(path: &Path, options: &ReadOptions, default_delimiter: u8) -> Result<DataFrame> {
    let format = Format::default()
        .with_header(options.get_bool("has_header")?.unwrap_or(true))
        .with_delimiter(options.delimiter(default_delimiter)?);

    let mut file = File::open(path)?;
    let (schema, scanned) =
        format.infer_schema(&mut file, Some(options.infer_schema_length()?))?;
    trace!("Inferred schema from {scanned} record(s) of {}", path.display());
    file.rewind()?;

    let schema = Arc::new(schema);
    let columns = options.columns()?;
    let mut builder = arrow::csv::ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size()?);
    if let Some(columns) = &columns {
        builder = builder.with_projection(column_positions(&schema, columns)?);
    }

    let reader = builder.build(file)?;
    let table = collect_batches(reader, options.n_rows()?)?;
    finish(table, columns)
}

pub fn read_jsonl(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let (schema, scanned) = arrow::json::reader::infer_json_schema(
        BufReader::new(File::open(path)?),
        Some(options.infer_schema_length()?),
    )?;
    trace!("Inferred schema from {scanned} record(s) of {}", path.display());

    let reader = arrow::json::ReaderBuilder::new(Arc::new(schema))
        .with_batch_size(options.batch_size()?)
        .build(BufReader::new(File::open(path)?))?;
    let table = collect_batches(reader, options.n_rows()?)?;
    finish(table, options.columns()?)
}

pub fn read_parquet(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let columns = options.columns()?;
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?
        .with_batch_size(options.batch_size()?);

    if let Some(columns) = &columns {
        let positions = column_positions(builder.schema(), columns)?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), positions);
        builder = builder.with_projection(mask);
    }
    if let Some(n_rows) = options.n_rows()? {
        builder = builder.with_limit(n_rows);
    }

    let table = collect_batches(builder.build()?, None)?;
    finish(table, columns)
}

pub fn read_ipc(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let reader = arrow::ipc::reader::FileReader::try_new(File::open(path)?, None)?;
    let table = collect_batches(reader, options.n_rows()?)?;
    finish(table, options.columns()?)
}

/// Positions of `columns` in `schema`; unknown names fail with `ColumnNotFound`.
fn column_positions(schema: &Schema, columns: &[String]) -> Result<Vec<usize>> {
    let mut positions = columns
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| DocframeError::column_not_found(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    positions.sort_unstable();
    positions.dedup();
    Ok(positions)
}

/// Drain a batch reader into a table, keeping at most `n_rows` rows.
fn collect_batches<R>(reader: R, n_rows: Option<usize>) -> Result<ArrowTable>
where
    R: RecordBatchReader,
{
    let schema: SchemaRef = reader.schema();
    let mut remaining = n_rows.unwrap_or(usize::MAX);
    let mut batches = Vec::new();

    for batch in reader {
        if remaining == 0 {
            break;
        }
        let batch = batch?;
        let take = batch.num_rows().min(remaining);
        batches.push(if take < batch.num_rows() {
            batch.slice(0, take)
        } else {
            batch
        });
        remaining -= take;
    }

    ArrowTable::from_batches(schema, batches)
}

fn finish(table: ArrowTable, columns: Option<Vec<String>>) -> Result<DataFrame> {
    let table = match columns {
        Some(columns) => table.select(&columns)?,
        None => table,
    };
    Ok(DataFrame::Arrow(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use serde_json::{Value, json};
    use tempfile::NamedTempFile;

    use crate::document::FieldValue;
    use crate::reader::ReadKwargs;
    use crate::table::Row;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn make_kwargs(value: Value) -> ReadKwargs {
        serde_json::from_value(value).unwrap()
    }

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("content", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
                Arc::new(Int64Array::from(vec![2022, 2023, 2024])),
            ],
        )
        .unwrap()
    }

    fn rows(table: &DataFrame) -> Vec<Row> {
        table.rows().collect::<Result<_>>().unwrap()
    }

    #[test]
    fn test_csv_infers_types() {
        let file = write_temp("content,year,active\nx,2024,true\ny,2023,false\n");
        let kwargs = ReadKwargs::new();
        let table = read_csv(file.path(), &ReadOptions::new(&kwargs)).unwrap();

        assert_eq!(table.num_rows(), 2);
        let rows = rows(&table);
        assert_eq!(rows[0].get("year"), Some(&FieldValue::Integer(2024)));
        assert_eq!(rows[1].get("active"), Some(&FieldValue::Boolean(false)));
    }

    #[test]
    fn test_csv_projection_and_limit() {
        let file = write_temp("a;b;c\n1;x;p\n2;y;q\n3;z;r\n");
        let kwargs = make_kwargs(json!({
            "delimiter": ";",
            "columns": ["c", "a"],
            "n_rows": 2,
            "batch_size": 1
        }));
        let table = read_csv(file.path(), &ReadOptions::new(&kwargs)).unwrap();

        assert_eq!(table.column_names(), vec!["c", "a"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.as_arrow().unwrap().batches().len(), 2);

        let kwargs = make_kwargs(json!({"columns": ["missing"]}));
        let err = read_csv(file.path(), &ReadOptions::new(&kwargs)).unwrap_err();
        assert!(matches!(err, DocframeError::ColumnNotFound(_)));
    }

    #[test]
    fn test_tsv_header_only() {
        let file = write_temp("content\tyear\n");
        let kwargs = ReadKwargs::new();
        let table = read_tsv(file.path(), &ReadOptions::new(&kwargs)).unwrap();
        assert_eq!(table.column_names(), vec!["content", "year"]);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn test_jsonl() {
        let file = write_temp("{\"content\": \"a\", \"n\": 1}\n{\"content\": \"b\"}\n");
        let kwargs = make_kwargs(json!({"columns": ["n", "content"]}));
        let table = read_jsonl(file.path(), &ReadOptions::new(&kwargs)).unwrap();

        assert_eq!(table.column_names(), vec!["n", "content"]);
        let rows = rows(&table);
        assert_eq!(rows[0].get("n"), Some(&FieldValue::Integer(1)));
        assert_eq!(rows[1].get("n"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_parquet() {
        let file = NamedTempFile::new().unwrap();
        let batch = sample_batch();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let kwargs = make_kwargs(json!({"columns": ["year", "content"], "n_rows": 2}));
        let table = read_parquet(file.path(), &ReadOptions::new(&kwargs)).unwrap();

        assert_eq!(table.column_names(), vec!["year", "content"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(rows(&table)[1].get("content"), Some(&FieldValue::from("b")));
    }

    #[test]
    fn test_ipc() {
        let file = NamedTempFile::new().unwrap();
        let batch = sample_batch();
        let mut writer =
            arrow::ipc::writer::FileWriter::try_new(file.reopen().unwrap(), &batch.schema())
                .unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        let kwargs = make_kwargs(json!({"n_rows": 1}));
        let table = read_ipc(file.path(), &ReadOptions::new(&kwargs)).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(rows(&table)[0].get("year"), Some(&FieldValue::Integer(2022)));
    }
}
