//! Row index of a table.
//!
//! Record tables carry per-row labels the way a data frame index does: by
//! default the row position, otherwise the values of one column (labels) or of
//! several columns (a composite index). Arrow tables are always positional.

use crate::document::field_value::FieldValue;
use crate::error::{DocframeError, Result};

/// Per-row labels of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIndex {
    /// Row positions `0..n`.
    Positional(usize),
    /// One label per row.
    Labels {
        name: Option<String>,
        labels: Vec<FieldValue>,
    },
    /// A tuple of labels per row.
    Composite {
        names: Vec<String>,
        labels: Vec<Vec<FieldValue>>,
    },
}

impl Default for RowIndex {
    fn default() -> Self {
        RowIndex::Positional(0)
    }
}

impl RowIndex {
    /// Number of rows covered by the index.
    pub fn len(&self) -> usize {
        match self {
            RowIndex::Positional(n) => *n,
            RowIndex::Labels { labels, .. } => labels.len(),
            RowIndex::Composite { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the index has more than one level.
    pub fn is_composite(&self) -> bool {
        matches!(self, RowIndex::Composite { .. })
    }

    /// Number of index levels.
    pub fn nlevels(&self) -> usize {
        match self {
            RowIndex::Composite { names, .. } => names.len(),
            _ => 1,
        }
    }

    /// Single-level labels, one per row.
    ///
    /// Fails with `IncompatibleIndex` on a composite index.
    pub fn labels(&self) -> Result<Vec<FieldValue>> {
        match self {
            RowIndex::Positional(n) => Ok((0..*n as i64).map(FieldValue::Integer).collect()),
            RowIndex::Labels { labels, .. } => Ok(labels.clone()),
            RowIndex::Composite { names, .. } => Err(DocframeError::incompatible_index(format!(
                "a composite index ({}) cannot be used as document ids",
                names.join(", ")
            ))),
        }
    }

    /// Labels as document ids.
    pub fn to_ids(&self) -> Result<Vec<String>> {
        Ok(self.labels()?.iter().map(ToString::to_string).collect())
    }

    /// Index of the first `n` rows.
    pub fn head(&self, n: usize) -> RowIndex {
        match self {
            RowIndex::Positional(len) => RowIndex::Positional((*len).min(n)),
            RowIndex::Labels { name, labels } => RowIndex::Labels {
                name: name.clone(),
                labels: labels.iter().take(n).cloned().collect(),
            },
            RowIndex::Composite { names, labels } => RowIndex::Composite {
                names: names.clone(),
                labels: labels.iter().take(n).cloned().collect(),
            },
        }
    }

    /// Concatenate indexes of vertically stacked tables.
    ///
    /// Positional indexes keep each table's own positions, so stacking two
    /// positional indexes of two rows yields labels `0, 1, 0, 1`. Composite
    /// indexes only stack with composite indexes of the same levels.
    pub fn concat(indexes: &[RowIndex]) -> Result<RowIndex> {
        match indexes {
            [] => return Ok(RowIndex::default()),
            [single] => return Ok(single.clone()),
            _ => {}
        }

        if indexes.iter().all(RowIndex::is_composite) {
            let mut names_out: Option<&Vec<String>> = None;
            let mut labels_out = Vec::new();
            for index in indexes {
                if let RowIndex::Composite { names, labels } = index {
                    match names_out {
                        Some(expected) if expected != names => {
                            return Err(DocframeError::schema_mismatch(format!(
                                "composite index levels differ: [{}] vs [{}]",
                                expected.join(", "),
                                names.join(", ")
                            )));
                        }
                        _ => names_out = Some(names),
                    }
                    labels_out.extend(labels.iter().cloned());
                }
            }
            return Ok(RowIndex::Composite {
                names: names_out.cloned().unwrap_or_default(),
                labels: labels_out,
            });
        }

        if indexes.iter().any(RowIndex::is_composite) {
            return Err(DocframeError::schema_mismatch(
                "cannot concatenate a composite index with a single-level index",
            ));
        }

        let first_name = match &indexes[0] {
            RowIndex::Labels { name, .. } => name.clone(),
            _ => None,
        };
        let same_name = indexes.iter().all(|index| match index {
            RowIndex::Labels { name, .. } => *name == first_name,
            _ => first_name.is_none(),
        });

        let mut labels = Vec::with_capacity(indexes.iter().map(RowIndex::len).sum());
        for index in indexes {
            labels.extend(index.labels()?);
        }

        Ok(RowIndex::Labels {
            name: if same_name { first_name } else { None },
            labels,
        })
    }
}
