//! Pipeline stages.
//!
//! A stage is a fixed configuration plus a `run` entry point. Configuration is
//! validated when the stage is built and never changes afterwards, so a stage
//! can be shared between threads and run any number of times.
//!
//! Every stage can be described as a [`ComponentDescriptor`], a type name plus
//! its `init_parameters` as plain JSON, and rebuilt from one:
//!
//! ```
//! use docframe::component::{Component, DataFrameConverter, DataFrameConverterConfig};
//!
//! let converter = DataFrameConverter::new(
//!     DataFrameConverterConfig::new("content").with_meta_columns(["meta2"]),
//! )
//! .unwrap();
//!
//! let descriptor = converter.to_descriptor().unwrap();
//! assert_eq!(descriptor.type_name, "docframe.DataFrameConverter");
//!
//! let restored = DataFrameConverter::from_descriptor(&descriptor).unwrap();
//! assert_eq!(restored.config(), converter.config());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocframeError, Result};

pub mod dataframe_converter;
pub mod dataframe_file_to_document;
pub mod file_to_dataframe;

pub use dataframe_converter::{DataFrameConverter, DataFrameConverterConfig, DataFrameConverterOutput};
pub use dataframe_file_to_document::{DataFrameFileToDocument, DataFrameFileToDocumentConfig};
pub use file_to_dataframe::{FileToDataFrame, FileToDataFrameConfig, FileToDataFrameOutput};

/// A serialized stage: its type name and construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub type_name: String,
    pub init_parameters: Value,
}

/// A pipeline stage with a serializable configuration.
pub trait Component: Sized {
    /// Name identifying the stage type in a descriptor.
    const TYPE_NAME: &'static str;

    /// Name of the output produced by `run`.
    const OUTPUT: &'static str;

    /// The construction parameters.
    type Config: Serialize + DeserializeOwned;

    /// Build the stage, validating `config`.
    fn from_config(config: Self::Config) -> Result<Self>;

    fn config(&self) -> &Self::Config;

    /// The construction parameters as plain JSON.
    fn init_parameters(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.config())?)
    }

    /// Rebuild the stage from `init_parameters`, re-running validation.
    fn from_init_parameters(value: Value) -> Result<Self> {
        Self::from_config(serde_json::from_value(value)?)
    }

    fn to_descriptor(&self) -> Result<ComponentDescriptor> {
        Ok(ComponentDescriptor {
            type_name: Self::TYPE_NAME.to_string(),
            init_parameters: self.init_parameters()?,
        })
    }

    /// Rebuild the stage from a descriptor of the same type.
    fn from_descriptor(descriptor: &ComponentDescriptor) -> Result<Self> {
        if descriptor.type_name != Self::TYPE_NAME {
            return Err(DocframeError::invalid_argument(format!(
                "descriptor of type {} cannot build {}",
                descriptor.type_name,
                Self::TYPE_NAME
            )));
        }
        Self::from_init_parameters(descriptor.init_parameters.clone())
    }
}

fn default_backend() -> String {
    crate::table::Backend::Arrow.as_str().to_string()
}

fn default_file_format() -> String {
    crate::reader::FileFormat::Csv.as_str().to_string()
}
