//! Typed access to reader parameters.

use serde_json::Value;

use crate::error::{DocframeError, Result};
use crate::reader::ReadKwargs;

/// Default number of rows per Arrow record batch.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Default number of records scanned to infer an Arrow schema.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 100;

/// A borrowed view over read parameters with typed getters.
///
/// Getters return `Ok(None)` for absent or null keys and fail with
/// `InvalidArgument` when a value has the wrong shape.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions<'a> {
    kwargs: &'a ReadKwargs,
}

impl<'a> ReadOptions<'a> {
    pub fn new(kwargs: &'a ReadKwargs) -> Self {
        ReadOptions { kwargs }
    }

    /// Fail on the first key not listed in `known`.
    pub fn check_known(&self, known: &[&str]) -> Result<()> {
        match self.kwargs.keys().find(|key| !known.contains(&key.as_str())) {
            Some(key) => Err(DocframeError::invalid_argument(format!(
                "unknown read option '{key}', expected one of: {}",
                known.join(", ")
            ))),
            None => Ok(()),
        }
    }

    /// Check that every present key has a value of the expected shape.
    pub fn check_values(&self) -> Result<()> {
        for key in self.kwargs.keys() {
            match key.as_str() {
                "delimiter" => self.delimiter(b',').map(|_| ())?,
                "batch_size" => self.batch_size().map(|_| ())?,
                "has_header" | "trim" | "infer_types" => self.get_bool(key).map(|_| ())?,
                "n_rows" | "skip_rows" | "infer_schema_length" => {
                    self.get_usize(key).map(|_| ())?
                }
                "columns" | "index_col" => self.get_strings(key).map(|_| ())?,
                "orient" => self.get_str(key).map(|_| ())?,
                _ => {}
            }
        }
        Ok(())
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.kwargs.get(key).filter(|value| !value.is_null())
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.value(key)
            .map(|value| value.as_bool().ok_or_else(|| invalid(key, "a boolean")))
            .transpose()
    }

    pub fn get_usize(&self, key: &str) -> Result<Option<usize>> {
        self.value(key)
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| invalid(key, "a non-negative integer"))
            })
            .transpose()
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&'a str>> {
        self.value(key)
            .map(|value| value.as_str().ok_or_else(|| invalid(key, "a string")))
            .transpose()
    }

    /// A list of strings; a single string is accepted as a one-element list.
    pub fn get_strings(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.value(key) else {
            return Ok(None);
        };
        match value {
            Value::String(s) => Ok(Some(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(key, "a list of strings"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            _ => Err(invalid(key, "a string or a list of strings")),
        }
    }

    /// A single-byte field delimiter, or `default`.
    pub fn delimiter(&self, default: u8) -> Result<u8> {
        match self.get_str("delimiter")? {
            None => Ok(default),
            Some(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
            Some(_) => Err(invalid("delimiter", "a single ASCII character")),
        }
    }

    pub fn n_rows(&self) -> Result<Option<usize>> {
        self.get_usize("n_rows")
    }

    pub fn columns(&self) -> Result<Option<Vec<String>>> {
        self.get_strings("columns")
    }

    /// Rows per record batch. Zero is rejected.
    pub fn batch_size(&self) -> Result<usize> {
        match self.get_usize("batch_size")? {
            None => Ok(DEFAULT_BATCH_SIZE),
            Some(0) => Err(invalid("batch_size", "a positive integer")),
            Some(n) => Ok(n),
        }
    }

    pub fn infer_schema_length(&self) -> Result<usize> {
        Ok(self
            .get_usize("infer_schema_length")?
            .unwrap_or(DEFAULT_INFER_SCHEMA_LENGTH))
    }
}

fn invalid(key: &str, expected: &str) -> DocframeError {
    DocframeError::invalid_argument(format!("read option '{key}' must be {expected}"))
}
