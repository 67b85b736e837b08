//! Table to documents stage.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::converter::{ExtraMetadata, IdSource, project};
use crate::document::Document;
use crate::error::{DocframeError, Result};
use crate::table::Table;

/// Configuration of [`DataFrameConverter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrameConverterConfig {
    /// Column holding the document content.
    pub content_column: String,

    /// Columns copied into the document metadata.
    #[serde(default)]
    pub meta_columns: Vec<String>,

    /// Column holding the document id.
    #[serde(default)]
    pub index_column: Option<String>,

    /// Use the row index labels as document ids.
    #[serde(default)]
    pub use_index_as_id: bool,
}

impl DataFrameConverterConfig {
    pub fn new<S: Into<String>>(content_column: S) -> Self {
        DataFrameConverterConfig {
            content_column: content_column.into(),
            meta_columns: Vec::new(),
            index_column: None,
            use_index_as_id: false,
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

    pub fn with_use_index_as_id(mut self, use_index_as_id: bool) -> Self {
        self.use_index_as_id = use_index_as_id;
        self
    }
}

/// Output of [`DataFrameConverter::run`].
#[derive(Debug, Clone, Serialize)]
pub struct DataFrameConverterOutput {
    pub documents: Vec<Document>,
}

/// Converts an in-memory table into documents.
///
/// Column existence is only known once a table is given, so it is checked by
/// [`DataFrameConverter::run`].
#[derive(Debug, Clone)]
pub struct DataFrameConverter {
    config: DataFrameConverterConfig,
}

impl DataFrameConverter {
    /// Build the stage.
    ///
    /// `index_column` and `use_index_as_id` are mutually exclusive.
    pub fn new(config: DataFrameConverterConfig) -> Result<Self> {
        if config.content_column.is_empty() {
            return Err(DocframeError::invalid_argument(
                "content_column must not be empty",
            ));
        }
        if config.use_index_as_id && config.index_column.is_some() {
            return Err(DocframeError::invalid_argument(
                "index_column and use_index_as_id cannot be combined",
            ));
        }
        Ok(DataFrameConverter { config })
    }

    /// Convert every row of `table`, in order.
    ///
    /// With `use_index_as_id`, a composite row index fails with
    /// `IncompatibleIndex` before any document is built.
    pub fn run(
        &self,
        table: &dyn Table,
        extra_metadata: Option<&ExtraMetadata>,
    ) -> Result<DataFrameConverterOutput> {
        let ids = if self.config.use_index_as_id {
            IdSource::Labels(table.row_index().to_ids()?)
        } else {
            match &self.config.index_column {
                Some(column) => IdSource::Column(column.as_str()),
                None => IdSource::Generated,
            }
        };

        let documents = project(
            table,
            &self.config.content_column,
            &self.config.meta_columns,
            ids,
            extra_metadata,
        )?;
        Ok(DataFrameConverterOutput { documents })
    }
}

impl Component for DataFrameConverter {
    const TYPE_NAME: &'static str = "docframe.DataFrameConverter";
    const OUTPUT: &'static str = "documents";
    type Config = DataFrameConverterConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        DataFrameConverter::new(config)
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
