//! Table readers.
//!
//! A reader is resolved from a static registry keyed by `(Backend, FileFormat)`.
//! Resolution happens when a stage is constructed, so an unsupported
//! combination fails immediately. Reading a list of files reads each file in
//! order, optionally restricts it to a column subset, and concatenates the
//! results vertically.
//!
//! # Examples
//!
//! ```no_run
//! use docframe::reader::{FileFormat, ReadKwargs, TableReader};
//! use docframe::table::{Backend, Table};
//!
//! let reader = TableReader::resolve(Backend::Arrow, FileFormat::Csv).unwrap();
//! let table = reader
//!     .read_all(&["part1.csv", "part2.csv"], &ReadKwargs::new(), None)
//!     .unwrap();
//! println!("{} rows", table.num_rows());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{DocframeError, Result};
use crate::table::{Backend, DataFrame, Table};

pub mod arrow_reader;
pub mod options;
pub mod records_reader;

pub use options::ReadOptions;

/// Extra parameters passed through to a reader.
pub type ReadKwargs = BTreeMap<String, serde_json::Value>;

/// File formats known to at least one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// A JSON document holding all rows.
    Json,
    /// Newline-delimited JSON objects.
    Jsonl,
    /// Apache Parquet.
    Parquet,
    /// Arrow IPC file format.
    Ipc,
}

impl FileFormat {
    pub const ALL: [FileFormat; 6] = [
        FileFormat::Csv,
        FileFormat::Tsv,
        FileFormat::Json,
        FileFormat::Jsonl,
        FileFormat::Parquet,
        FileFormat::Ipc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Tsv => "tsv",
            FileFormat::Json => "json",
            FileFormat::Jsonl => "jsonl",
            FileFormat::Parquet => "parquet",
            FileFormat::Ipc => "ipc",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            "jsonl" | "ndjson" => Some(FileFormat::Jsonl),
            "parquet" | "pq" => Some(FileFormat::Parquet),
            "arrow" | "ipc" | "feather" => Some(FileFormat::Ipc),
            _ => None,
        }
    }

    fn parse(s: &str) -> Option<FileFormat> {
        let s = s.trim().to_ascii_lowercase();
        FileFormat::ALL.into_iter().find(|format| format.as_str() == s)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = DocframeError;

    fn from_str(s: &str) -> Result<Self> {
        FileFormat::parse(s).ok_or_else(|| DocframeError::unsupported_format("any", s))
    }
}

/// Signature of a concrete file reader.
pub type ReaderFn = fn(&Path, &ReadOptions) -> Result<DataFrame>;

/// A registry entry.
#[derive(Debug)]
pub struct ReaderEntry {
    pub backend: Backend,
    pub format: FileFormat,
    /// Read parameters the reader understands.
    pub options: &'static [&'static str],
    read: ReaderFn,
}

static READERS: &[ReaderEntry] = &[
    ReaderEntry {
        backend: Backend::Records,
        format: FileFormat::Csv,
        options: records_reader::DELIMITED_OPTIONS,
        read: records_reader::read_csv,
    },
    ReaderEntry {
        backend: Backend::Records,
        format: FileFormat::Tsv,
        options: records_reader::DELIMITED_OPTIONS,
        read: records_reader::read_tsv,
    },
    ReaderEntry {
        backend: Backend::Records,
        format: FileFormat::Json,
        options: records_reader::JSON_OPTIONS,
        read: records_reader::read_json,
    },
    ReaderEntry {
        backend: Backend::Records,
        format: FileFormat::Jsonl,
        options: records_reader::JSONL_OPTIONS,
        read: records_reader::read_jsonl,
    },
    ReaderEntry {
        backend: Backend::Arrow,
        format: FileFormat::Csv,
        options: arrow_reader::DELIMITED_OPTIONS,
        read: arrow_reader::read_csv,
    },
    ReaderEntry {
        backend: Backend::Arrow,
        format: FileFormat::Tsv,
        options: arrow_reader::DELIMITED_OPTIONS,
        read: arrow_reader::read_tsv,
    },
    ReaderEntry {
        backend: Backend::Arrow,
        format: FileFormat::Jsonl,
        options: arrow_reader::JSON_OPTIONS,
        read: arrow_reader::read_jsonl,
    },
    ReaderEntry {
        backend: Backend::Arrow,
        format: FileFormat::Parquet,
        options: arrow_reader::PARQUET_OPTIONS,
        read: arrow_reader::read_parquet,
    },
    ReaderEntry {
        backend: Backend::Arrow,
        format: FileFormat::Ipc,
        options: arrow_reader::IPC_OPTIONS,
        read: arrow_reader::read_ipc,
    },
];

/// Formats registered for a backend, in registry order.
pub fn supported_formats(backend: Backend) -> Vec<FileFormat> {
    READERS
        .iter()
        .filter(|entry| entry.backend == backend)
        .map(|entry| entry.format)
        .collect()
}

/// A resolved reader for one backend and file format.
#[derive(Debug, Clone, Copy)]
pub struct TableReader {
    entry: &'static ReaderEntry,
}

impl TableReader {
    /// Look up the reader for `backend` and `format`.
    pub fn resolve(backend: Backend, format: FileFormat) -> Result<Self> {
        let entry = READERS
            .iter()
            .find(|entry| entry.backend == backend && entry.format == format)
            .ok_or_else(|| DocframeError::unsupported_format(backend.as_str(), format.as_str()))?;
        debug!("Resolved {format} reader for {backend} backend");
        Ok(TableReader { entry })
    }

    /// Look up a reader from configuration strings.
    ///
    /// Fails with `UnsupportedBackend` for an unknown backend and with
    /// `UnsupportedFormat` when the backend has no reader for the format.
    pub fn resolve_named(backend: &str, format: &str) -> Result<Self> {
        let backend: Backend = backend.parse()?;
        let format = FileFormat::parse(format)
            .ok_or_else(|| DocframeError::unsupported_format(backend.as_str(), format))?;
        TableReader::resolve(backend, format)
    }

    pub fn backend(&self) -> Backend {
        self.entry.backend
    }

    pub fn format(&self) -> FileFormat {
        self.entry.format
    }

    /// Check that every read parameter is understood by this reader and has
    /// a usable value.
    pub fn validate_kwargs(&self, kwargs: &ReadKwargs) -> Result<()> {
        let options = ReadOptions::new(kwargs);
        options.check_known(self.entry.options)?;
        options.check_values()
    }

    /// Read one file.
    pub fn read<P: AsRef<Path>>(&self, path: P, kwargs: &ReadKwargs) -> Result<DataFrame> {
        let path = path.as_ref();
        let options = ReadOptions::new(kwargs);
        options.check_known(self.entry.options)?;
        debug!(
            "Reading {} with {} {} reader",
            path.display(),
            self.entry.backend,
            self.entry.format
        );
        (self.entry.read)(path, &options)
    }

    /// Read one file and keep only `columns_subset`, when given and non-empty.
    pub fn read_with_select<P: AsRef<Path>>(
        &self,
        path: P,
        kwargs: &ReadKwargs,
        columns_subset: Option<&[String]>,
    ) -> Result<DataFrame> {
        let table = self.read(path, kwargs)?;
        match columns_subset {
            Some(columns) if !columns.is_empty() => table.select(columns),
            _ => Ok(table),
        }
    }

    /// Read every file in order and concatenate the tables vertically.
    pub fn read_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
        kwargs: &ReadKwargs,
        columns_subset: Option<&[String]>,
    ) -> Result<DataFrame> {
        let tables = paths
            .iter()
            .map(|path| {
                let table = self.read_with_select(path, kwargs, columns_subset)?;
                trace!(
                    "Read {} rows from {}",
                    table.num_rows(),
                    path.as_ref().display()
                );
                Ok(table)
            })
            .collect::<Result<Vec<_>>>()?;
        let table = DataFrame::concat(self.entry.backend, tables)?;
        debug!(
            "Read {} rows from {} file(s)",
            table.num_rows(),
            paths.len()
        );
        Ok(table)
    }
}

/// Read `file_paths` with the reader for `backend` and `file_format`.
pub fn read_table<P: AsRef<Path>>(
    backend: Backend,
    file_format: FileFormat,
    file_paths: &[P],
    read_kwargs: &ReadKwargs,
    columns_subset: Option<&[String]>,
) -> Result<DataFrame> {
    TableReader::resolve(backend, file_format)?.read_all(file_paths, read_kwargs, columns_subset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats() {
        assert_eq!(
            supported_formats(Backend::Records),
            vec![
                FileFormat::Csv,
                FileFormat::Tsv,
                FileFormat::Json,
                FileFormat::Jsonl
            ]
        );
        assert!(supported_formats(Backend::Arrow).contains(&FileFormat::Parquet));
    }

    #[test]
    fn test_resolve_unsupported_format() {
        let err = TableReader::resolve(Backend::Records, FileFormat::Parquet).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file format for records backend: parquet"
        );
    }

    #[test]
    fn test_resolve_named() {
        let reader = TableReader::resolve_named("arrow", "CSV").unwrap();
        assert_eq!(reader.backend(), Backend::Arrow);
        assert_eq!(reader.format(), FileFormat::Csv);

        let err = TableReader::resolve_named("foo", "csv").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported backend: foo");

        let err = TableReader::resolve_named("arrow", "foo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file format for arrow backend: foo"
        );
    }

    #[test]
    fn test_validate_kwargs() {
        let reader = TableReader::resolve(Backend::Records, FileFormat::Csv).unwrap();
        let mut kwargs = ReadKwargs::new();
        kwargs.insert("n_rows".to_string(), serde_json::json!(1));
        assert!(reader.validate_kwargs(&kwargs).is_ok());

        kwargs.insert("nrows".to_string(), serde_json::json!(1));
        assert!(matches!(
            reader.validate_kwargs(&kwargs),
            Err(DocframeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("a/b.CSV"), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_extension("data.ndjson"),
            Some(FileFormat::Jsonl)
        );
        assert_eq!(FileFormat::from_extension("data"), None);
    }

    #[test]
    fn test_read_all_without_files() {
        let reader = TableReader::resolve(Backend::Arrow, FileFormat::Csv).unwrap();
        let paths: Vec<&str> = Vec::new();
        let table = reader.read_all(&paths, &ReadKwargs::new(), None).unwrap();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.backend(), Backend::Arrow);
    }
}
