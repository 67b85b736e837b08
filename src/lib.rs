//! # docframe
//!
//! Converts tabular files and in-memory tables into documents for retrieval
//! pipelines.
//!
//! ## Features
//!
//! - Two table engines: dynamically typed `records` tables with a row index,
//!   and Apache Arrow record batches
//! - CSV, TSV, JSON, JSON Lines, Parquet and Arrow IPC readers
//! - Row projection into documents with content, id and metadata columns
//! - Broadcast or per-row extra metadata
//! - Serializable pipeline stages

pub mod cli;
pub mod component;
pub mod converter;
pub mod document;
pub mod error;
pub mod reader;
pub mod table;

pub mod prelude {
    pub use crate::component::{
        Component, ComponentDescriptor, DataFrameConverter, DataFrameConverterConfig,
        DataFrameFileToDocument, DataFrameFileToDocumentConfig, FileToDataFrame,
        FileToDataFrameConfig,
    };
    pub use crate::converter::{ExtraMetadata, frame_to_documents};
    pub use crate::document::{Document, FieldValue, Metadata};
    pub use crate::error::{DocframeError, Result};
    pub use crate::reader::{FileFormat, ReadKwargs, TableReader, read_table};
    pub use crate::table::{ArrowTable, Backend, DataFrame, RecordTable, RowIndex, Table};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
