//! Dynamically typed columnar table with a row index.

use std::collections::HashSet;

use crate::document::field_value::FieldValue;
use crate::error::{DocframeError, Result};
use crate::table::row_index::RowIndex;
use crate::table::{Backend, Row, Table, dedup_columns};

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<FieldValue>,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: Vec<FieldValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Kind shared by all non-null values: `"null"` when every value is null,
    /// `"mixed"` when kinds differ.
    pub fn dtype(&self) -> &'static str {
        let mut kinds = self
            .values
            .iter()
            .filter(|value| !value.is_null())
            .map(FieldValue::kind);
        match kinds.next() {
            None => "null",
            Some(first) if kinds.all(|kind| kind == first) => first,
            Some(_) => "mixed",
        }
    }
}

/// A table of dynamically typed columns.
///
/// Columns keep their insertion order. The row index defaults to row
/// positions and can be replaced by column values with [`RecordTable::set_index`].
///
/// # Examples
///
/// ```
/// use docframe::document::FieldValue;
/// use docframe::table::{RecordTable, Table};
///
/// let table = RecordTable::new()
///     .with_column("content", vec!["content1", "content2"])
///     .unwrap()
///     .with_column("year", vec![2023, 2024])
///     .unwrap();
///
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.column_names(), vec!["content", "year"]);
/// assert_eq!(table.column("year").unwrap().values()[1], FieldValue::Integer(2024));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    columns: Vec<Column>,
    index: RowIndex,
}

impl RecordTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<FieldValue>)>) -> Result<Self> {
        columns
            .into_iter()
            .try_fold(RecordTable::new(), |table, (name, values)| {
                table.with_column(name, values)
            })
    }

    /// Build a table from column names and row-major values.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<FieldValue>>) -> Result<Self> {
        let num_rows = rows.len();
        let mut columns: Vec<Vec<FieldValue>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for (position, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(DocframeError::invalid_argument(format!(
                    "row {position} has {} values, expected {}",
                    row.len(),
                    names.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        let mut table = RecordTable::from_columns(names.into_iter().zip(columns).collect())?;
        if table.columns.is_empty() {
            table.index = RowIndex::Positional(num_rows);
        }
        Ok(table)
    }

    /// Append a column.
    ///
    /// The first column of an empty table sets the row count; later columns
    /// must match it.
    pub fn with_column<S, V>(mut self, name: S, values: Vec<V>) -> Result<Self>
    where
        S: Into<String>,
        V: Into<FieldValue>,
    {
        let name = name.into();
        let values: Vec<FieldValue> = values.into_iter().map(Into::into).collect();

        if self.columns.iter().any(|column| column.name == name) {
            return Err(DocframeError::invalid_argument(format!(
                "duplicate column name: {name}"
            )));
        }

        if self.columns.is_empty() && self.index == RowIndex::Positional(0) {
            self.index = RowIndex::Positional(values.len());
        } else if values.len() != self.num_rows() {
            return Err(DocframeError::invalid_argument(format!(
                "column {name} has {} values, expected {}",
                values.len(),
                self.num_rows()
            )));
        }

        self.columns.push(Column::new(name, values));
        Ok(self)
    }

    /// Replace the row index.
    pub fn with_index(mut self, index: RowIndex) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.num_rows() {
            return Err(DocframeError::invalid_argument(format!(
                "index has {} labels, expected {}",
                index.len(),
                self.num_rows()
            )));
        }
        self.index = index;
        Ok(self)
    }

    /// Move `columns` out of the table and into the row index.
    ///
    /// One column gives a labelled index, several give a composite index.
    pub fn set_index(mut self, columns: &[String]) -> Result<Self> {
        let columns = dedup_columns(columns);
        if columns.is_empty() {
            return Ok(self);
        }

        let mut levels = Vec::with_capacity(columns.len());
        for name in &columns {
            let position = self
                .columns
                .iter()
                .position(|column| &column.name == name)
                .ok_or_else(|| DocframeError::column_not_found(name.clone()))?;
            levels.push(self.columns.remove(position));
        }

        self.index = if levels.len() == 1 {
            let level = levels.remove(0);
            RowIndex::Labels {
                name: Some(level.name),
                labels: level.values,
            }
        } else {
            let num_rows = levels[0].len();
            let labels = (0..num_rows)
                .map(|row| levels.iter().map(|level| level.values[row].clone()).collect())
                .collect();
            RowIndex::Composite {
                names: levels.into_iter().map(|level| level.name).collect(),
                labels,
            }
        };
        Ok(self)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> RecordTable {
        RecordTable {
            columns: self
                .columns
                .iter()
                .map(|column| {
                    let values = column.values.iter().take(n).cloned().collect();
                    Column::new(column.name.clone(), values)
                })
                .collect(),
            index: self.index.head(n),
        }
    }

    /// Concatenate tables vertically, in order.
    ///
    /// Tables must share the same column names in the same order; value kinds
    /// are not compared. Tables without any column and row are skipped.
    pub fn concat(tables: Vec<RecordTable>) -> Result<RecordTable> {
        let mut tables: Vec<RecordTable> = tables
            .into_iter()
            .filter(|table| !(table.columns.is_empty() && table.index.is_empty()))
            .collect();

        if tables.len() <= 1 {
            return Ok(tables.pop().unwrap_or_default());
        }

        let expected = tables[0].column_names();
        for (position, table) in tables.iter().enumerate().skip(1) {
            let names = table.column_names();
            if names != expected {
                return Err(DocframeError::schema_mismatch(format!(
                    "table {position} has columns [{}], expected [{}]",
                    names.join(", "),
                    expected.join(", ")
                )));
            }
        }

        let indexes: Vec<RowIndex> = tables.iter().map(|table| table.index.clone()).collect();
        let index = RowIndex::concat(&indexes)?;

        let mut columns: Vec<Column> = expected
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(index.len())))
            .collect();
        for table in tables {
            for (target, source) in columns.iter_mut().zip(table.columns) {
                target.values.extend(source.values);
            }
        }

        Ok(RecordTable { columns, index })
    }
}

impl Table for RecordTable {
    fn backend(&self) -> Backend {
        Backend::Records
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    fn num_rows(&self) -> usize {
        self.index.len()
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    fn row_index(&self) -> RowIndex {
        self.index.clone()
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Result<Row>> + '_> {
        Box::new((0..self.num_rows()).map(move |position| {
            let mut row = Row::with_capacity(self.columns.len());
            for column in &self.columns {
                row.push(column.name.clone(), column.values[position].clone());
            }
            Ok(row)
        }))
    }

    fn select(&self, columns: &[String]) -> Result<Self> {
        let mut selected = Vec::with_capacity(columns.len());
        let mut seen = HashSet::new();
        for name in columns {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let column = self
                .column(name)
                .ok_or_else(|| DocframeError::column_not_found(name.clone()))?;
            selected.push(column.clone());
        }
        Ok(RecordTable {
            columns: selected,
            index: self.index.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordTable {
        RecordTable::new()
            .with_column("content", vec!["content1", "content2"])
            .unwrap()
            .with_column("meta1", vec!["meta1_1", "meta1_2"])
            .unwrap()
            .with_column("meta2", vec!["meta2_1", "meta2_2"])
            .unwrap()
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let result = sample().with_column("short", vec![1]);
        assert!(matches!(result, Err(DocframeError::InvalidArgument(_))));
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let result = sample().with_column("meta1", vec![1, 2]);
        assert!(matches!(result, Err(DocframeError::InvalidArgument(_))));
    }

    #[test]
    fn test_from_rows() {
        let table = RecordTable::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![FieldValue::Integer(1), FieldValue::from("x")],
                vec![FieldValue::Integer(2), FieldValue::from("y")],
            ],
        )
        .unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("a").unwrap().dtype(), "integer");
        assert_eq!(table.column("b").unwrap().values()[1], FieldValue::from("y"));
    }

    #[test]
    fn test_select_orders_and_validates() {
        let table = sample();
        let selected = table
            .select(&["meta2".to_string(), "content".to_string()])
            .unwrap();
        assert_eq!(selected.column_names(), vec!["meta2", "content"]);

        let err = table.select(&["missing".to_string()]).unwrap_err();
        assert!(matches!(err, DocframeError::ColumnNotFound(ref c) if c == "missing"));
    }

    #[test]
    fn test_rows_preserve_order() {
        let rows: Vec<Row> = sample().rows().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("content"), Some(&FieldValue::from("content1")));
        assert_eq!(rows[1].get("meta2"), Some(&FieldValue::from("meta2_2")));
    }

    #[test]
    fn test_set_index_single_and_composite() {
        let single = sample().set_index(&["meta1".to_string()]).unwrap();
        assert!(!single.has_column("meta1"));
        assert_eq!(single.row_index().to_ids().unwrap(), vec!["meta1_1", "meta1_2"]);

        let composite = sample()
            .set_index(&["meta1".to_string(), "meta2".to_string()])
            .unwrap();
        assert!(composite.row_index().is_composite());
        assert_eq!(composite.column_names(), vec!["content"]);
    }

    #[test]
    fn test_concat() {
        let table = RecordTable::concat(vec![sample(), sample()]).unwrap();
        assert_eq!(table.num_rows(), 4);
        assert_eq!(
            table.column("content").unwrap().values(),
            &[
                FieldValue::from("content1"),
                FieldValue::from("content2"),
                FieldValue::from("content1"),
                FieldValue::from("content2"),
            ]
        );
        assert_eq!(table.row_index().to_ids().unwrap(), vec!["0", "1", "0", "1"]);
    }

    #[test]
    fn test_concat_schema_mismatch() {
        let other = sample().select(&["content".to_string()]).unwrap();
        let err = RecordTable::concat(vec![sample(), other]).unwrap_err();
        assert!(matches!(err, DocframeError::SchemaMismatch(_)));
    }

    #[test]
    fn test_dtype() {
        let column = Column::new(
            "c",
            vec![FieldValue::Integer(1), FieldValue::Null, FieldValue::from("x")],
        );
        assert_eq!(column.dtype(), "mixed");
        assert_eq!(Column::new("n", vec![FieldValue::Null]).dtype(), "null");
    }
}
