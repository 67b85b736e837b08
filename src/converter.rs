//! Row projection: table rows to documents.
//!
//! Every row becomes exactly one [`Document`], in table order. The content
//! column supplies the document content, the optional index column supplies
//! the id, and the listed meta columns supply the metadata. Caller-supplied
//! extra metadata is merged last and wins on key conflicts.
//!
//! # Examples
//!
//! ```
//! use docframe::converter::frame_to_documents;
//! use docframe::document::FieldValue;
//! use docframe::table::RecordTable;
//!
//! let table = RecordTable::new()
//!     .with_column("content", vec!["content1", "content2"])
//!     .unwrap()
//!     .with_column("meta1", vec!["meta1_1", "meta1_2"])
//!     .unwrap()
//!     .with_column("meta2", vec!["meta2_1", "meta2_2"])
//!     .unwrap();
//!
//! let documents =
//!     frame_to_documents(&table, "content", &["meta2".to_string()], Some("meta1"), None).unwrap();
//!
//! assert_eq!(documents.len(), 2);
//! assert_eq!(documents[0].id, "meta1_1");
//! assert_eq!(documents[0].content, "content1");
//! assert_eq!(documents[0].get_meta("meta2"), Some(&FieldValue::from("meta2_1")));
//! assert!(!documents[0].has_meta("meta1"));
//! ```

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{Document, FieldValue, Metadata};
use crate::error::{DocframeError, Result};
use crate::table::Table;

/// Metadata supplied by the caller on top of the row-derived metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraMetadata {
    /// One mapping per row, aligned with the table rows.
    PerRow(Vec<Metadata>),
    /// One mapping applied to every row.
    Uniform(Metadata),
}

impl ExtraMetadata {
    /// Check that per-row metadata lines up with `num_rows` rows.
    pub fn validate(&self, num_rows: usize) -> Result<()> {
        match self {
            ExtraMetadata::PerRow(entries) if entries.len() != num_rows => Err(
                DocframeError::metadata_length_mismatch(num_rows, entries.len()),
            ),
            _ => Ok(()),
        }
    }

    /// The metadata for row `position`.
    pub fn for_row(&self, position: usize) -> Option<&Metadata> {
        match self {
            ExtraMetadata::PerRow(entries) => entries.get(position),
            ExtraMetadata::Uniform(meta) => Some(meta),
        }
    }
}

impl From<Metadata> for ExtraMetadata {
    fn from(meta: Metadata) -> Self {
        ExtraMetadata::Uniform(meta)
    }
}

impl From<Vec<Metadata>> for ExtraMetadata {
    fn from(entries: Vec<Metadata>) -> Self {
        ExtraMetadata::PerRow(entries)
    }
}

/// Where document ids come from.
#[derive(Debug, Clone)]
pub(crate) enum IdSource<'a> {
    /// Generated by [`Document`].
    Generated,
    /// Read from a column, which is consumed.
    Column(&'a str),
    /// Given up front, one per row.
    Labels(Vec<String>),
}

/// Convert every row of `table` into a [`Document`].
///
/// Fails with `ColumnNotFound` when the content, index or a meta column is
/// missing, and with `MetadataLengthMismatch` when per-row extra metadata has
/// a different length than the table. Both checks run before any row is read.
pub fn frame_to_documents(
    table: &dyn Table,
    content_column: &str,
    meta_columns: &[String],
    index_column: Option<&str>,
    extra_metadata: Option<&ExtraMetadata>,
) -> Result<Vec<Document>> {
    let ids = match index_column {
        Some(column) => IdSource::Column(column),
        None => IdSource::Generated,
    };
    project(table, content_column, meta_columns, ids, extra_metadata)
}

pub(crate) fn project(
    table: &dyn Table,
    content_column: &str,
    meta_columns: &[String],
    ids: IdSource<'_>,
    extra_metadata: Option<&ExtraMetadata>,
) -> Result<Vec<Document>> {
    let mut required = vec![content_column];
    if let IdSource::Column(column) = ids {
        required.push(column);
    }
    required.extend(meta_columns.iter().map(String::as_str));
    if let Some(missing) = required.into_iter().find(|column| !table.has_column(column)) {
        return Err(DocframeError::column_not_found(missing));
    }

    let num_rows = table.num_rows();
    if let Some(extra) = extra_metadata {
        extra.validate(num_rows)?;
    }
    if let IdSource::Labels(labels) = &ids {
        if labels.len() != num_rows {
            return Err(DocframeError::invalid_argument(format!(
                "got {} ids for a table with {num_rows} rows",
                labels.len()
            )));
        }
    }

    let meta_columns: HashSet<&str> = meta_columns.iter().map(String::as_str).collect();
    let mut documents = Vec::with_capacity(num_rows);

    for (position, row) in table.rows().enumerate() {
        let mut row = row?;

        let id = match &ids {
            IdSource::Generated => None,
            IdSource::Column(column) => row.get(column).map(ToString::to_string),
            IdSource::Labels(labels) => labels.get(position).cloned(),
        };
        if let IdSource::Column(column) = &ids {
            if *column != content_column {
                row.remove(column);
            }
        }

        let content = match row.remove(content_column) {
            Some(FieldValue::Null) | None => String::new(),
            Some(FieldValue::Text(text)) => text,
            Some(value) => value.to_string(),
        };

        let mut meta: Metadata = row
            .into_iter()
            .filter(|(name, _)| meta_columns.contains(name.as_str()))
            .collect();
        if let Some(extra) = extra_metadata.and_then(|extra| extra.for_row(position)) {
            meta.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        documents.push(Document::from_parts(id, content, meta));
    }

    debug!("Converted {} row(s) to documents", documents.len());
    Ok(documents)
}
