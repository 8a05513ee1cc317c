//! Ingestion boundary for extraction-engine output.
//!
//! The extraction engine emits one JSON array of records per input document.
//! This module decodes that array into [`RawCitationRecord`]s, tolerating
//! records of unexpected shape.
//!
//! # Example
//!
//! ```
//! use pdfsources::raw::{RawField, SourceDocument};
//!
//! let input = r#"[{"title": ["Example Title"], "container-title": ["Journal"]}]"#;
//!
//! let document = SourceDocument::from_json("anystyle-example.json", input).unwrap();
//! assert_eq!(document.records.len(), 1);
//! assert_eq!(document.records[0].get_first(RawField::ContainerTitle), Some("Journal"));
//! ```

mod fields;
mod structure;

pub use fields::RawField;
pub use structure::{RawCitationRecord, RawName};

use crate::Result;
use serde_json::Value;

/// The records extracted from one input document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    /// Input identifier, typically the JSON file path
    pub name: String,
    /// Records in extraction order
    pub records: Vec<RawCitationRecord>,
}

impl SourceDocument {
    /// Creates a document from already-decoded records.
    pub fn new(name: impl Into<String>, records: Vec<RawCitationRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Decodes extraction-engine JSON for one document.
    ///
    /// A top-level array yields one record per element; a single top-level
    /// object is taken as a one-record document. Blank input is an empty document.
    ///
    /// # Errors
    ///
    /// Returns `CitationError::Json` if the input is not valid JSON.
    pub fn from_json(name: impl Into<String>, input: &str) -> Result<Self> {
        let name = name.into();
        if input.trim().is_empty() {
            return Ok(Self::new(name, Vec::new()));
        }

        let records = match serde_json::from_str::<Value>(input)? {
            Value::Array(items) => items.into_iter().map(RawCitationRecord::from).collect(),
            object @ Value::Object(_) => vec![RawCitationRecord::from(object)],
            other => {
                tracing::warn!(document = %name, kind = json_kind(&other), "expected a list of records");
                Vec::new()
            }
        };

        Ok(Self::new(name, records))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
