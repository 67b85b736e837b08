//! Table abstraction shared by the table engines.
//!
//! The projector never touches engine-specific types. It only sees the
//! [`Table`] trait: column names, row count, row iteration as name→value
//! mappings and the row index. Each engine provides one implementation:
//!
//! - [`record_table::RecordTable`] - dynamically typed columns with an
//!   optional labelled (or composite) row index, read with `csv`/`serde_json`
//! - [`arrow_table::ArrowTable`] - Apache Arrow record batches, read with the
//!   `arrow` and `parquet` crates
//!
//! [`DataFrame`] wraps either engine's table and performs vertical
//! concatenation.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::document::field_value::FieldValue;
use crate::error::{DocframeError, Result};

pub mod arrow_table;
pub mod record_table;
pub mod row_index;

pub use arrow_table::ArrowTable;
pub use record_table::{Column, RecordTable};
pub use row_index::RowIndex;

/// Available table engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Row-index aware, dynamically typed tables.
    Records,
    /// Apache Arrow record batches.
    Arrow,
}

impl Backend {
    /// Every available backend.
    pub const ALL: [Backend; 2] = [Backend::Records, Backend::Arrow];

    /// The identifier used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Records => "records",
            Backend::Arrow => "arrow",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DocframeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "records" => Ok(Backend::Records),
            "arrow" => Ok(Backend::Arrow),
            _ => Err(DocframeError::unsupported_backend(s)),
        }
    }
}

/// One table row as an ordered name→value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, FieldValue)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a cell.
    pub fn push<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.entries.push((name.into(), value));
    }

    /// Get a cell by column name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Remove a cell by column name and return its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let position = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(position).1)
    }

    /// Column names in row order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate over the cells in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The capability interface every table engine implements.
pub trait Table: fmt::Debug {
    /// The engine this table belongs to.
    fn backend(&self) -> Backend;

    /// Column names in table order.
    fn column_names(&self) -> Vec<String>;

    /// Number of rows.
    fn num_rows(&self) -> usize;

    /// Number of columns.
    fn num_columns(&self) -> usize {
        self.column_names().len()
    }

    /// Check if the table has a column.
    fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|column| column == name)
    }

    /// The row index of the table.
    fn row_index(&self) -> RowIndex;

    /// Iterate over the rows in order.
    fn rows(&self) -> Box<dyn Iterator<Item = Result<Row>> + '_>;

    /// Restrict the table to `columns`, in the given order.
    ///
    /// Repeated names are kept once. Fails with `ColumnNotFound` when a name
    /// is not a column of the table.
    fn select(&self, columns: &[String]) -> Result<Self>
    where
        Self: Sized;
}

/// A table from any engine.
#[derive(Debug, Clone)]
pub enum DataFrame {
    Records(RecordTable),
    Arrow(ArrowTable),
}

impl DataFrame {
    /// An empty table of the given engine.
    pub fn empty(backend: Backend) -> Self {
        match backend {
            Backend::Records => DataFrame::Records(RecordTable::new()),
            Backend::Arrow => DataFrame::Arrow(ArrowTable::new()),
        }
    }

    /// Concatenate tables vertically, in order.
    ///
    /// All tables must come from `backend` and agree on their structure.
    pub fn concat(backend: Backend, frames: Vec<DataFrame>) -> Result<DataFrame> {
        match backend {
            Backend::Records => {
                let tables = frames
                    .into_iter()
                    .map(|frame| match frame {
                        DataFrame::Records(table) => Ok(table),
                        DataFrame::Arrow(_) => Err(mixed_backends()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(DataFrame::Records(RecordTable::concat(tables)?))
            }
            Backend::Arrow => {
                let tables = frames
                    .into_iter()
                    .map(|frame| match frame {
                        DataFrame::Arrow(table) => Ok(table),
                        DataFrame::Records(_) => Err(mixed_backends()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(DataFrame::Arrow(ArrowTable::concat(tables)?))
            }
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> DataFrame {
        match self {
            DataFrame::Records(table) => DataFrame::Records(table.head(n)),
            DataFrame::Arrow(table) => DataFrame::Arrow(table.head(n)),
        }
    }

    pub fn as_records(&self) -> Option<&RecordTable> {
        match self {
            DataFrame::Records(table) => Some(table),
            DataFrame::Arrow(_) => None,
        }
    }

    pub fn as_arrow(&self) -> Option<&ArrowTable> {
        match self {
            DataFrame::Arrow(table) => Some(table),
            DataFrame::Records(_) => None,
        }
    }

    pub fn into_records(self) -> Option<RecordTable> {
        match self {
            DataFrame::Records(table) => Some(table),
            DataFrame::Arrow(_) => None,
        }
    }

    pub fn into_arrow(self) -> Option<ArrowTable> {
        match self {
            DataFrame::Arrow(table) => Some(table),
            DataFrame::Records(_) => None,
        }
    }
}

fn mixed_backends() -> DocframeError {
    DocframeError::schema_mismatch("cannot concatenate tables from different backends")
}

impl From<RecordTable> for DataFrame {
    fn from(table: RecordTable) -> Self {
        DataFrame::Records(table)
    }
}

impl From<ArrowTable> for DataFrame {
    fn from(table: ArrowTable) -> Self {
        DataFrame::Arrow(table)
    }
}

impl Table for DataFrame {
    fn backend(&self) -> Backend {
        match self {
            DataFrame::Records(table) => table.backend(),
            DataFrame::Arrow(table) => table.backend(),
        }
    }

    fn column_names(&self) -> Vec<String> {
        match self {
            DataFrame::Records(table) => table.column_names(),
            DataFrame::Arrow(table) => table.column_names(),
        }
    }

    fn num_rows(&self) -> usize {
        match self {
            DataFrame::Records(table) => table.num_rows(),
            DataFrame::Arrow(table) => table.num_rows(),
        }
    }

    fn row_index(&self) -> RowIndex {
        match self {
            DataFrame::Records(table) => table.row_index(),
            DataFrame::Arrow(table) => table.row_index(),
        }
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Result<Row>> + '_> {
        match self {
            DataFrame::Records(table) => table.rows(),
            DataFrame::Arrow(table) => table.rows(),
        }
    }

    fn select(&self, columns: &[String]) -> Result<Self> {
        match self {
            DataFrame::Records(table) => Ok(DataFrame::Records(table.select(columns)?)),
            DataFrame::Arrow(table) => Ok(DataFrame::Arrow(table.select(columns)?)),
        }
    }
}

/// Keep the first occurrence of every name, preserving order.
pub(crate) fn dedup_columns(columns: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    columns
        .iter()
        .filter(|column| seen.insert(column.as_str()))
        .cloned()
        .collect()
}
