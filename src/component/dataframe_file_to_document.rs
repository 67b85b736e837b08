//! Files to documents stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::dataframe_converter::DataFrameConverterOutput;
use crate::component::{Component, default_backend, default_file_format};
use crate::converter::{ExtraMetadata, frame_to_documents};
use crate::error::{DocframeError, Result};
use crate::reader::{FileFormat, ReadKwargs, ReadOptions, TableReader};
use crate::table::{Backend, dedup_columns};

/// Configuration of [`DataFrameFileToDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrameFileToDocumentConfig {
    pub content_column: String,

    #[serde(default)]
    pub meta_columns: Vec<String>,

    #[serde(default)]
    pub index_column: Option<String>,

    #[serde(default = "default_file_format")]
    pub file_format: String,

    #[serde(default)]
    pub read_kwargs: ReadKwargs,

    #[serde(default = "default_backend")]
    pub backend: String,
}

impl DataFrameFileToDocumentConfig {
    /// A configuration reading CSV files with the `arrow` backend.
    pub fn new<S: Into<String>>(content_column: S) -> Self {
        DataFrameFileToDocumentConfig {
            content_column: content_column.into(),
            meta_columns: Vec::new(),
            index_column: None,
            file_format: default_file_format(),
            read_kwargs: ReadKwargs::new(),
            backend: default_backend(),
        }
    }

    pub fn with_meta_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_index_column<S: Into<String>>(mut self, column: S) -> Self {
        self.index_column = Some(column.into());
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend.to_string();
        self
    }

    pub fn with_file_format(mut self, file_format: FileFormat) -> Self {
        self.file_format = file_format.to_string();
        self
    }

    pub fn with_read_kwargs(mut self, read_kwargs: ReadKwargs) -> Self {
        self.read_kwargs = read_kwargs;
        self
    }

    /// Columns needed to build documents: index, content, then meta columns,
    /// each once.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.meta_columns.len() + 2);
        columns.extend(self.index_column.iter().cloned());
        columns.push(self.content_column.clone());
        columns.extend(self.meta_columns.iter().cloned());
        dedup_columns(&columns)
    }
}

/// Reads files and converts their rows into documents.
///
/// Only the columns needed for the documents are kept from each file. The
/// records `index_col` read option cannot name one of those columns, since it
/// would move the column into the row index.
///
/// # Examples
///
/// ```no_run
/// use docframe::component::{DataFrameFileToDocument, DataFrameFileToDocumentConfig};
///
/// let stage = DataFrameFileToDocument::new(
///     DataFrameFileToDocumentConfig::new("content").with_meta_columns(["meta2"]),
/// )
/// .unwrap();
/// let documents = stage.run(&["books.csv"], None).unwrap().documents;
/// for document in &documents {
///     println!("{}: {}", document.id, document.content);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DataFrameFileToDocument {
    config: DataFrameFileToDocumentConfig,
    reader: TableReader,
}

impl DataFrameFileToDocument {
    pub fn new(config: DataFrameFileToDocumentConfig) -> Result<Self> {
        if config.content_column.is_empty() {
            return Err(DocframeError::invalid_argument(
                "content_column must not be empty",
            ));
        }
        let reader = TableReader::resolve_named(&config.backend, &config.file_format)?;
        reader.validate_kwargs(&config.read_kwargs)?;

        // An `index_col` column leaves the table before projection.
        let index_col = ReadOptions::new(&config.read_kwargs).get_strings("index_col")?;
        let required = config.required_columns();
        if let Some(column) = index_col
            .iter()
            .flatten()
            .find(|column| required.contains(*column))
        {
            return Err(DocframeError::invalid_argument(format!(
                "read option 'index_col' moves column {column} into the row index; \
                 drop it or use DataFrameConverter with use_index_as_id"
            )));
        }

        Ok(DataFrameFileToDocument { config, reader })
    }

    pub fn reader(&self) -> TableReader {
        self.reader
    }

    /// Read `file_paths` in order and convert every row into a document.
    pub fn run<P: AsRef<Path>>(
        &self,
        file_paths: &[P],
        extra_metadata: Option<&ExtraMetadata>,
    ) -> Result<DataFrameConverterOutput> {
        let columns = self.config.required_columns();
        let table = self
            .reader
            .read_all(file_paths, &self.config.read_kwargs, Some(columns.as_slice()))?;

        let documents = frame_to_documents(
            &table,
            &self.config.content_column,
            &self.config.meta_columns,
            self.config.index_column.as_deref(),
            extra_metadata,
        )?;
        Ok(DataFrameConverterOutput { documents })
    }
}

impl Component for DataFrameFileToDocument {
    const TYPE_NAME: &'static str = "docframe.DataFrameFileToDocument";
    const OUTPUT: &'static str = "documents";
    type Config = DataFrameFileToDocumentConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        DataFrameFileToDocument::new(config)
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use crate::document::FieldValue;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_required_columns() {
        let config = DataFrameFileToDocumentConfig::new("content")
            .with_meta_columns(["meta2", "content", "meta2", "meta1"])
            .with_index_column("meta1");
        assert_eq!(
            config.required_columns(),
            vec!["meta1", "content", "meta2"]
        );
    }

    #[test]
    fn test_run_reads_only_required_columns() {
        let file = csv_file("content,meta1,meta2,unused\ncontent1,meta1_1,meta2_1,x\n");

        for backend in Backend::ALL {
            let stage = DataFrameFileToDocument::new(
                DataFrameFileToDocumentConfig::new("content")
                    .with_meta_columns(["meta2"])
                    .with_index_column("meta1")
                    .with_backend(backend),
            )
            .unwrap();
            let documents = stage.run(&[file.path()], None).unwrap().documents;

            assert_eq!(documents.len(), 1);
            assert_eq!(documents[0].id, "meta1_1");
            assert_eq!(documents[0].content, "content1");
            assert_eq!(documents[0].meta.len(), 1);
            assert_eq!(documents[0].get_meta("meta2"), Some(&FieldValue::from("meta2_1")));
        }
    }

    #[test]
    fn test_missing_column_in_file() {
        let file = csv_file("content,meta1\ncontent1,meta1_1\n");
        let stage = DataFrameFileToDocument::new(
            DataFrameFileToDocumentConfig::new("content").with_meta_columns(["meta2"]),
        )
        .unwrap();
        let err = stage.run(&[file.path()], None).unwrap_err();
        assert!(matches!(err, DocframeError::ColumnNotFound(ref c) if c == "meta2"));
    }

    #[test]
    fn test_construction_errors() {
        let err = DataFrameFileToDocument::new(
            DataFrameFileToDocumentConfig::new("content").with_file_format(FileFormat::Json),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported file format for arrow backend: json"
        );

        let err = DataFrameFileToDocument::from_init_parameters(json!({
            "content_column": "content",
            "backend": "pandas"
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported backend: pandas");
    }

    #[test]
    fn test_index_col_overlapping_required_columns() {
        let config = DataFrameFileToDocumentConfig::new("content")
            .with_index_column("doc_id")
            .with_backend(Backend::Records)
            .with_read_kwargs(serde_json::from_value(json!({"index_col": "doc_id"})).unwrap());
        let err = DataFrameFileToDocument::new(config).unwrap_err();
        assert!(matches!(err, DocframeError::InvalidArgument(_)));

        let file = csv_file("doc_id,content,unused
d1,first,x
");
        let config = DataFrameFileToDocumentConfig::new("content")
            .with_backend(Backend::Records)
            .with_read_kwargs(serde_json::from_value(json!({"index_col": "unused"})).unwrap());
        let documents = DataFrameFileToDocument::new(config)
            .unwrap()
            .run(&[file.path()], None)
            .unwrap()
            .documents;
        assert_eq!(documents[0].content, "first");
    }

    #[test]
    fn test_init_parameters_defaults() {
        let stage =
            DataFrameFileToDocument::from_init_parameters(json!({"content_column": "text"})).unwrap();
        assert_eq!(stage.reader().backend(), Backend::Arrow);
        assert_eq!(
            stage.init_parameters().unwrap(),
            json!({
                "content_column": "text",
                "meta_columns": [],
                "index_column": null,
                "file_format": "csv",
                "read_kwargs": {},
                "backend": "arrow"
            })
        );
    }
}
