//! Files to table stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::{Component, default_backend, default_file_format};
use crate::error::Result;
use crate::reader::{FileFormat, ReadKwargs, TableReader};
use crate::table::{Backend, DataFrame};

/// Configuration of [`FileToDataFrame`].
///
/// `backend` and `file_format` are kept as given so a descriptor round-trips
/// exactly; they are resolved when the stage is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileToDataFrameConfig {
    /// Table engine identifier.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// File format identifier.
    #[serde(default = "default_file_format")]
    pub file_format: String,

    /// Parameters passed through to the reader.
    #[serde(default)]
    pub read_kwargs: ReadKwargs,

    /// Columns to keep from every file, in this order.
    #[serde(default)]
    pub columns_subset: Option<Vec<String>>,
}

impl Default for FileToDataFrameConfig {
    fn default() -> Self {
        FileToDataFrameConfig {
            backend: default_backend(),
            file_format: default_file_format(),
            read_kwargs: ReadKwargs::new(),
            columns_subset: None,
        }
    }
}

impl FileToDataFrameConfig {
    pub fn new(backend: Backend, file_format: FileFormat) -> Self {
        FileToDataFrameConfig {
            backend: backend.to_string(),
            file_format: file_format.to_string(),
            ..Default::default()
        }
    }

    pub fn with_read_kwarg<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.read_kwargs.insert(key.into(), value.into());
        self
    }

    pub fn with_columns_subset<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_subset = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Output of [`FileToDataFrame::run`].
#[derive(Debug, Clone)]
pub struct FileToDataFrameOutput {
    pub dataframe: DataFrame,
}

/// Reads files into one table.
///
/// # Examples
///
/// ```no_run
/// use docframe::component::{FileToDataFrame, FileToDataFrameConfig};
/// use docframe::reader::FileFormat;
/// use docframe::table::{Backend, Table};
///
/// let stage = FileToDataFrame::new(FileToDataFrameConfig::new(Backend::Records, FileFormat::Csv))
///     .unwrap();
/// let output = stage.run(&["part1.csv", "part2.csv"]).unwrap();
/// println!("{} rows", output.dataframe.num_rows());
/// ```
#[derive(Debug, Clone)]
pub struct FileToDataFrame {
    config: FileToDataFrameConfig,
    reader: TableReader,
}

impl FileToDataFrame {
    /// Build the stage.
    ///
    /// Fails with `UnsupportedBackend` or `UnsupportedFormat` when no reader
    /// exists for the configuration, and with `InvalidArgument` when a read
    /// parameter is unknown to that reader.
    pub fn new(config: FileToDataFrameConfig) -> Result<Self> {
        let reader = TableReader::resolve_named(&config.backend, &config.file_format)?;
        reader.validate_kwargs(&config.read_kwargs)?;
        Ok(FileToDataFrame { config, reader })
    }

    pub fn reader(&self) -> TableReader {
        self.reader
    }

    /// Read `file_paths` in order and concatenate them.
    pub fn run<P: AsRef<Path>>(&self, file_paths: &[P]) -> Result<FileToDataFrameOutput> {
        let dataframe = self.reader.read_all(
            file_paths,
            &self.config.read_kwargs,
            self.config.columns_subset.as_deref(),
        )?;
        Ok(FileToDataFrameOutput { dataframe })
    }
}

impl Component for FileToDataFrame {
    const TYPE_NAME: &'static str = "docframe.FileToDataFrame";
    const OUTPUT: &'static str = "dataframe";
    type Config = FileToDataFrameConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        FileToDataFrame::new(config)
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
