//! Documents produced from table rows.
//!
//! - [`document::Document`] - id, content and metadata of one converted row
//! - [`field_value::FieldValue`] - scalar cell values shared by every table engine
//!
//! # Examples
//!
//! ```
//! use docframe::document::{Document, FieldValue};
//!
//! let doc = Document::builder()
//!     .id("doc-1")
//!     .content("Rust Programming Guide")
//!     .meta("year", 2024)
//!     .build();
//!
//! assert_eq!(doc.get_meta("year"), Some(&FieldValue::Integer(2024)));
//! ```

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

pub use document::{Document, DocumentBuilder, Metadata};
pub use field_value::FieldValue;
