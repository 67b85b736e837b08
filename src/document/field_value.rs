//! Scalar cell values.
//!
//! [`FieldValue`] is the single value type both table engines hand to the
//! projector, and the value type of document metadata.
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Integer** - 64-bit signed integers
//! - **Float** - 64-bit floating-point numbers
//! - **Boolean** - true/false values
//! - **Binary** - Raw byte data
//! - **DateTime** - UTC timestamps
//! - **List** - Ordered values
//! - **Map** - Nested string-keyed values
//! - **Null** - Missing values
//!
//! # Examples
//!
//! ```
//! use docframe::document::field_value::FieldValue;
//!
//! let text_value = FieldValue::from("hello");
//! assert_eq!(text_value.as_text(), Some("hello"));
//!
//! let int_value = FieldValue::Integer(42);
//! assert_eq!(int_value.to_string(), "42");
//!
//! assert_eq!(FieldValue::infer("true"), FieldValue::Boolean(true));
//! assert_eq!(FieldValue::infer("19.99"), FieldValue::Float(19.99));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single value taken from a table cell or supplied as metadata.
///
/// Serialization is untagged so metadata maps read like plain JSON objects.
/// Deserialization goes through [`FieldValue::from_json`]: DateTime values
/// come back as `Text` and binary data as a `List` of integers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
    /// DateTime value
    DateTime(chrono::DateTime<chrono::Utc>),
    /// Binary data
    Binary(Vec<u8>),
    /// List of values
    List(Vec<FieldValue>),
    /// Nested mapping
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Infer the value type from a raw string cell.
    ///
    /// An empty cell is `Null`. Booleans, integers and floats are tried in that
    /// order before falling back to text.
    pub fn infer(value: &str) -> FieldValue {
        if value.is_empty() {
            return FieldValue::Null;
        }

        // Try boolean
        if value.eq_ignore_ascii_case("true") {
            return FieldValue::Boolean(true);
        }
        if value.eq_ignore_ascii_case("false") {
            return FieldValue::Boolean(false);
        }

        // Try integer
        if let Ok(int_val) = value.parse::<i64>() {
            return FieldValue::Integer(int_val);
        }

        // Try float
        if let Ok(float_val) = value.parse::<f64>() {
            return FieldValue::Float(float_val);
        }

        FieldValue::Text(value.to_string())
    }

    /// Convert a JSON value into a field value.
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Text(n.to_string())
                }
            }
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from_json).collect()),
            Value::Object(object) => FieldValue::Map(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Name of the value kind, used in schema comparisons and messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Binary(_) => "binary",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FieldValue::Binary(data) => {
                for byte in data {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            FieldValue::List(_) | FieldValue::Map(_) => {
                f.write_str(&serde_json::to_string(self).map_err(|_| fmt::Error)?)
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|value| FieldValue::from_json(&value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for FieldValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(FieldValue::infer(""), FieldValue::Null);
        assert_eq!(FieldValue::infer("TRUE"), FieldValue::Boolean(true));
        assert_eq!(FieldValue::infer("false"), FieldValue::Boolean(false));
        assert_eq!(FieldValue::infer("2024"), FieldValue::Integer(2024));
        assert_eq!(FieldValue::infer("-3.5"), FieldValue::Float(-3.5));
        assert_eq!(
            FieldValue::infer("meta1_1"),
            FieldValue::Text("meta1_1".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Integer(0).to_string(), "0");
        assert_eq!(FieldValue::Float(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
        assert_eq!(FieldValue::Null.to_string(), "null");
        assert_eq!(FieldValue::Binary(vec![0x0a, 0xff]).to_string(), "0aff");
    }

    #[test]
    fn test_from_json() {
        let value = serde_json::json!({"a": 1, "tags": ["x", null]});
        assert_eq!(
            FieldValue::from_json(&value),
            FieldValue::Map(BTreeMap::from([
                ("a".to_string(), FieldValue::Integer(1)),
                (
                    "tags".to_string(),
                    FieldValue::List(vec![FieldValue::from("x"), FieldValue::Null])
                ),
            ]))
        );
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(2.25)),
            FieldValue::Float(2.25)
        );
        assert_eq!(FieldValue::from_json(&serde_json::Value::Null), FieldValue::Null);
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&vec![
            FieldValue::Null,
            FieldValue::Integer(7),
            FieldValue::from("x"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,7,"x"]"#);

        let back: Vec<FieldValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back,
            vec![FieldValue::Null, FieldValue::Integer(7), FieldValue::from("x")]
        );
    }

    #[test]
    fn test_nested_values() {
        let value: FieldValue = serde_json::from_str(r#"{"pages": [1, 2]}"#).unwrap();
        let expected = FieldValue::Map(BTreeMap::from([(
            "pages".to_string(),
            FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)]),
        )]));
        assert_eq!(value, expected);
        assert_eq!(value.kind(), "map");
        assert_eq!(value.to_string(), r#"{"pages":[1,2]}"#);
        assert_eq!(serde_json::to_value(&value).unwrap(), serde_json::json!({"pages": [1, 2]}));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::from("a"));
    }
}
