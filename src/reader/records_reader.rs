//! Readers for the `records` backend.
//!
//! Delimited files are parsed with the `csv` crate and JSON files with
//! `serde_json`. With a header row, the first row holds the column names:
//! ```csv
//! content,year,price,active
//! Rust Programming,2024,19.99,true
//! Python Basics,2023,15.50,false
//! ```
//!
//! Cell types are inferred per value (boolean, integer, float, then text) and
//! empty cells become nulls. JSON values keep their own types.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Value};

use crate::document::field_value::FieldValue;
use crate::error::{DocframeError, Result};
use crate::reader::ReadOptions;
use crate::table::{DataFrame, RecordTable, Table};

/// Read options understood by the CSV and TSV readers.
pub const DELIMITED_OPTIONS: &[&str] = &[
    "delimiter",
    "has_header",
    "n_rows",
    "skip_rows",
    "columns",
    "trim",
    "infer_types",
    "index_col",
];

/// Read options understood by the JSON reader.
pub const JSON_OPTIONS: &[&str] = &["orient", "n_rows", "columns", "index_col"];

/// Read options understood by the JSON Lines reader.
pub const JSONL_OPTIONS: &[&str] = &["n_rows", "columns", "index_col"];

pub fn read_csv(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    read_delimited(path, options, b',')
}

pub fn read_tsv(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    read_delimited(path, options, b'\t')
}

fn read_delimited(path: &Path, options: &ReadOptions, default_delimiter: u8) -> Result<DataFrame> {
    let delimiter = options.delimiter(default_delimiter)?;
    let has_header = options.get_bool("has_header")?.unwrap_or(true);
    let trim = options.get_bool("trim")?.unwrap_or(true);
    let infer_types = options.get_bool("infer_types")?.unwrap_or(true);
    let skip_rows = options.get_usize("skip_rows")?.unwrap_or(0);
    let n_rows = options.n_rows()?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_header)
        .trim(if trim { csv::Trim::All } else { csv::Trim::None })
        .from_path(path)?;

    let mut names: Vec<String> = if has_header {
        reader.headers()?.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for record in reader.records().skip(skip_rows) {
        if n_rows.is_some_and(|n| rows.len() >= n) {
            break;
        }
        let record = record?;
        if names.is_empty() {
            names = (1..=record.len()).map(|i| format!("column_{i}")).collect();
        }
        let row: Vec<FieldValue> = record
            .iter()
            .map(|value| {
                if infer_types {
                    FieldValue::infer(value)
                } else if value.is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::Text(value.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    let table = RecordTable::from_rows(names, rows)?;
    finish(table, options)
}

pub fn read_json(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    let n_rows = options.n_rows()?;

    let table = match options.get_str("orient")?.unwrap_or("records") {
        "records" => {
            let Value::Array(items) = value else {
                return Err(DocframeError::invalid_argument(
                    "JSON with orient 'records' must be an array of objects",
                ));
            };
            let objects = items
                .into_iter()
                .take(n_rows.unwrap_or(usize::MAX))
                .enumerate()
                .map(|(position, item)| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(DocframeError::invalid_argument(format!(
                        "JSON record {position} is not an object"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            table_from_objects(objects)?
        }
        "columns" => {
            let Value::Object(map) = value else {
                return Err(DocframeError::invalid_argument(
                    "JSON with orient 'columns' must be an object of arrays",
                ));
            };
            let columns = map
                .into_iter()
                .map(|(name, values)| match values {
                    Value::Array(values) => Ok((
                        name,
                        values
                            .iter()
                            .take(n_rows.unwrap_or(usize::MAX))
                            .map(FieldValue::from_json)
                            .collect(),
                    )),
                    _ => Err(DocframeError::invalid_argument(format!(
                        "JSON column {name} is not an array"
                    ))),
                })
                .collect::<Result<Vec<(String, Vec<FieldValue>)>>>()?;
            RecordTable::from_columns(columns)?
        }
        other => {
            return Err(DocframeError::invalid_argument(format!(
                "unsupported JSON orient '{other}', expected 'records' or 'columns'"
            )));
        }
    };

    finish(table, options)
}

pub fn read_jsonl(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let file = File::open(path)?;
    let n_rows = options.n_rows()?;

    let mut objects = Vec::new();
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        if n_rows.is_some_and(|n| objects.len() >= n) {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&line)? {
            Value::Object(map) => objects.push(map),
            _ => {
                return Err(DocframeError::invalid_argument(format!(
                    "line {} is not a JSON object",
                    line_num + 1
                )));
            }
        }
    }

    finish(table_from_objects(objects)?, options)
}

/// Build a table from JSON objects.
///
/// Columns appear in first-seen key order; keys missing from an object are
/// null in that row.
fn table_from_objects(objects: Vec<Map<String, Value>>) -> Result<RecordTable> {
    let mut names: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            names
                .iter()
                .map(|name| object.get(name).map_or(FieldValue::Null, FieldValue::from_json))
                .collect()
        })
        .collect();

    RecordTable::from_rows(names, rows)
}

/// Apply the options shared by every records reader: `columns` then `index_col`.
fn finish(table: RecordTable, options: &ReadOptions) -> Result<DataFrame> {
    let table = match options.columns()? {
        Some(columns) => {
            let mut keep = columns;
            if let Some(index_columns) = options.get_strings("index_col")? {
                for column in index_columns {
                    if !keep.contains(&column) {
                        keep.push(column);
                    }
                }
            }
            table.select(&keep)?
        }
        None => table,
    };

    let table = match options.get_strings("index_col")? {
        Some(index_columns) => table.set_index(&index_columns)?,
        None => table,
    };

    Ok(DataFrame::Records(table))
}
