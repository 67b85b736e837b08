//! Error types for the docframe library.
//!
//! All errors are represented by the [`DocframeError`] enum. The first group of
//! variants describes configuration and data-shaping failures raised by the
//! readers, the projector and the pipeline stages; the rest wrap errors coming
//! from the table engines and I/O.
//!
//! # Examples
//!
//! ```
//! use docframe::error::{DocframeError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DocframeError::column_not_found("title"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for docframe operations.
#[derive(Error, Debug)]
pub enum DocframeError {
    /// Unknown table engine identifier.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// The backend exists but has no reader for the requested file format.
    #[error("Unsupported file format for {backend} backend: {format}")]
    UnsupportedFormat { backend: String, format: String },

    /// A configured column is absent from the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Tables being concatenated disagree on structure.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Per-row extra metadata does not line up with the table rows.
    #[error(
        "Metadata length mismatch: got {actual} metadata entries for a table with {expected} rows"
    )]
    MetadataLengthMismatch { expected: usize, actual: usize },

    /// The row index cannot be used as document ids.
    #[error("Incompatible index: {0}")]
    IncompatibleIndex(String),

    /// Invalid configuration or argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (opening or reading files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors raised by the Arrow engine
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Errors raised by the Parquet reader
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Errors carrying extra context
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),

}

/// Result type alias for operations that may fail with DocframeError.
pub type Result<T> = std::result::Result<T, DocframeError>;

impl DocframeError {
    /// Create a new unsupported backend error.
    pub fn unsupported_backend<S: Into<String>>(backend: S) -> Self {
        DocframeError::UnsupportedBackend(backend.into())
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format<B: Into<String>, F: Into<String>>(backend: B, format: F) -> Self {
        DocframeError::UnsupportedFormat {
            backend: backend.into(),
            format: format.into(),
        }
    }

    /// Create a new column not found error.
    pub fn column_not_found<S: Into<String>>(column: S) -> Self {
        DocframeError::ColumnNotFound(column.into())
    }

    /// Create a new schema mismatch error.
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        DocframeError::SchemaMismatch(msg.into())
    }

    /// Create a new metadata length mismatch error.
    pub fn metadata_length_mismatch(expected: usize, actual: usize) -> Self {
        DocframeError::MetadataLengthMismatch { expected, actual }
    }

    /// Create a new incompatible index error.
    pub fn incompatible_index<S: Into<String>>(msg: S) -> Self {
        DocframeError::IncompatibleIndex(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DocframeError::InvalidArgument(msg.into())
    }
}
