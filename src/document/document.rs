//! Document structure produced by the converters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::field_value::FieldValue;

/// Metadata attached to a document, keyed by field name.
pub type Metadata = HashMap<String, FieldValue>;

/// A document represents a single record to be indexed.
///
/// Documents are built fresh for every table row and own all of their data.
/// When no id is supplied a random one is generated.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Document {
    /// Document identifier
    pub id: String,
    /// Text content
    pub content: String,
    /// Metadata fields
    pub meta: Metadata,
}

impl Document {
    /// Create a new document with a generated id and no metadata.
    pub fn new<S: Into<String>>(content: S) -> Self {
        Document {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            meta: Metadata::new(),
        }
    }

    /// Create a document from its parts, generating an id when none is given.
    pub fn from_parts(id: Option<String>, content: String, meta: Metadata) -> Self {
        Document {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            content,
            meta,
        }
    }

    /// Get a metadata field from the document.
    pub fn get_meta(&self, name: &str) -> Option<&FieldValue> {
        self.meta.get(name)
    }

    /// Check if the document has a metadata field.
    pub fn has_meta(&self, name: &str) -> bool {
        self.meta.contains_key(name)
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    id: Option<String>,
    content: String,
    meta: Metadata,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document id.
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the document content.
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Add a metadata field.
    pub fn meta<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        Document::from_parts(self.id, self.content, self.meta)
    }
}
