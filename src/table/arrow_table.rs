//! Arrow-backed table.
//!
//! Wraps a schema and the record batches read for it. Cells are converted to
//! [`FieldValue`]s lazily while iterating rows.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, Schema, SchemaRef, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;

use crate::document::field_value::FieldValue;
use crate::error::{DocframeError, Result};
use crate::table::row_index::RowIndex;
use crate::table::{Backend, Row, Table};

/// A table made of Arrow record batches sharing one schema.
#[derive(Debug, Clone)]
pub struct ArrowTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Default for ArrowTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrowTable {
    /// Create an empty table without columns.
    pub fn new() -> Self {
        ArrowTable {
            schema: Arc::new(Schema::empty()),
            batches: Vec::new(),
        }
    }

    /// Create an empty table with the given schema.
    pub fn empty(schema: SchemaRef) -> Self {
        ArrowTable {
            schema,
            batches: Vec::new(),
        }
    }

    /// Wrap a single record batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        ArrowTable {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Wrap record batches read for `schema`.
    pub fn from_batches(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for batch in &batches {
            if !same_structure(&schema, batch.schema_ref()) {
                return Err(DocframeError::schema_mismatch(format!(
                    "record batch schema [{}] does not match table schema [{}]",
                    describe_schema(batch.schema_ref()),
                    describe_schema(&schema)
                )));
            }
        }
        Ok(ArrowTable { schema, batches })
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Merge all batches into one.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        Ok(concat_batches(&self.schema, &self.batches)?)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> ArrowTable {
        let mut remaining = n;
        let mut batches = Vec::new();
        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = batch.num_rows().min(remaining);
            batches.push(batch.slice(0, take));
            remaining -= take;
        }
        ArrowTable {
            schema: self.schema.clone(),
            batches,
        }
    }

    /// Concatenate tables vertically, in order.
    ///
    /// Column names and data types must match exactly; nullability is ignored.
    pub fn concat(tables: Vec<ArrowTable>) -> Result<ArrowTable> {
        let mut tables = tables.into_iter();
        let Some(first) = tables.next() else {
            return Ok(ArrowTable::new());
        };

        let schema = first.schema;
        let mut batches = first.batches;
        for (position, table) in tables.enumerate() {
            if !same_structure(&schema, &table.schema) {
                return Err(DocframeError::schema_mismatch(format!(
                    "table {} has schema [{}], expected [{}]",
                    position + 1,
                    describe_schema(&table.schema),
                    describe_schema(&schema)
                )));
            }
            batches.extend(table.batches);
        }

        Ok(ArrowTable { schema, batches })
    }

    fn column_position(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .map_err(|_| DocframeError::column_not_found(name))
    }
}

impl Table for ArrowTable {
    fn backend(&self) -> Backend {
        Backend::Arrow
    }

    fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_ok()
    }

    fn row_index(&self) -> RowIndex {
        RowIndex::Positional(self.num_rows())
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Result<Row>> + '_> {
        Box::new(
            self.batches
                .iter()
                .flat_map(|batch| (0..batch.num_rows()).map(move |row| batch_row(batch, row))),
        )
    }

    fn select(&self, columns: &[String]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            if seen.insert(name.as_str()) {
                indices.push(self.column_position(name)?);
            }
        }

        let schema = Arc::new(self.schema.project(&indices)?);
        let batches = self
            .batches
            .iter()
            .map(|batch| batch.project(&indices))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ArrowTable { schema, batches })
    }
}

fn batch_row(batch: &RecordBatch, row: usize) -> Result<Row> {
    let mut out = Row::with_capacity(batch.num_columns());
    for (field, column) in batch.schema_ref().fields().iter().zip(batch.columns()) {
        out.push(field.name().clone(), cell_value(column.as_ref(), row)?);
    }
    Ok(out)
}

/// Check that two schemas have the same column names and data types.
pub(crate) fn same_structure(left: &Schema, right: &Schema) -> bool {
    left.fields().len() == right.fields().len()
        && left
            .fields()
            .iter()
            .zip(right.fields().iter())
            .all(|(l, r)| l.name() == r.name() && l.data_type() == r.data_type())
}

pub(crate) fn describe_schema(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|field| format!("{}: {}", field.name(), field.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert one Arrow cell into a field value.
///
/// Types without a direct counterpart are rendered with Arrow's display
/// formatting.
pub fn cell_value(array: &dyn Array, row: usize) -> Result<FieldValue> {
    if array.is_null(row) {
        return Ok(FieldValue::Null);
    }

    let value = match array.data_type() {
        DataType::Null => FieldValue::Null,
        DataType::Boolean => FieldValue::Boolean(array.as_boolean().value(row)),
        DataType::Int8 => FieldValue::Integer(array.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => FieldValue::Integer(array.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => FieldValue::Integer(array.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => FieldValue::Integer(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => FieldValue::Integer(array.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => {
            FieldValue::Integer(array.as_primitive::<UInt16Type>().value(row) as i64)
        }
        DataType::UInt32 => {
            FieldValue::Integer(array.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::UInt64 => {
            let value = array.as_primitive::<UInt64Type>().value(row);
            i64::try_from(value).map_or(FieldValue::Float(value as f64), FieldValue::Integer)
        }
        DataType::Float32 => {
            FieldValue::Float(array.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => FieldValue::Float(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => FieldValue::Text(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => FieldValue::Text(array.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => FieldValue::Text(array.as_string_view().value(row).to_string()),
        DataType::Binary => FieldValue::Binary(array.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => FieldValue::Binary(array.as_binary::<i64>().value(row).to_vec()),
        DataType::Date32 => datetime_or_display(
            array,
            row,
            array.as_primitive::<Date32Type>().value_as_datetime(row),
        )?,
        DataType::Date64 => datetime_or_display(
            array,
            row,
            array.as_primitive::<Date64Type>().value_as_datetime(row),
        )?,
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => array
                    .as_primitive::<TimestampSecondType>()
                    .value_as_datetime(row),
                TimeUnit::Millisecond => array
                    .as_primitive::<TimestampMillisecondType>()
                    .value_as_datetime(row),
                TimeUnit::Microsecond => array
                    .as_primitive::<TimestampMicrosecondType>()
                    .value_as_datetime(row),
                TimeUnit::Nanosecond => array
                    .as_primitive::<TimestampNanosecondType>()
                    .value_as_datetime(row),
            };
            datetime_or_display(array, row, datetime)?
        }
        _ => FieldValue::Text(array_value_to_string(array, row)?),
    };
    Ok(value)
}

fn datetime_or_display(
    array: &dyn Array,
    row: usize,
    datetime: Option<chrono::NaiveDateTime>,
) -> Result<FieldValue> {
    match datetime {
        Some(datetime) => Ok(FieldValue::DateTime(datetime.and_utc())),
        None => Ok(FieldValue::Text(array_value_to_string(array, row)?)),
    }
}
