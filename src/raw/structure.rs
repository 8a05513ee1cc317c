//! Raw record data structures.
//!
//! # Design Decision
//!
//! Upstream JSON is heterogeneous: a field can be a string, a list of strings,
//! a number, a CSL `date-parts` object, or something unexpected entirely. All of
//! that is resolved once, here, into a closed structure:
//!
//! - Known fields are stored as `Vec<String>` keyed by [`RawField`]
//! - Name lists become [`RawName`]s, either structured or literal
//! - Anything else is remembered as an ignored key and otherwise dropped
//!
//! Accessors return `None` for absent fields; nothing downstream looks at JSON.

use crate::raw::fields::RawField;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A name as it came from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawName {
    /// A name split into parts by the extraction engine
    Structured {
        family: Option<String>,
        given: Option<String>,
        particle: Option<String>,
    },
    /// A name given as a single string, e.g. "Smith, John"
    Literal(String),
}

impl RawName {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RawName::Literal(s.clone())),
            Value::Object(map) => {
                if let Some(literal) = map.get("literal").and_then(Value::as_str) {
                    return Some(RawName::Literal(literal.to_string()));
                }
                let part = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|k| map.get(*k).and_then(Value::as_str))
                        .map(str::to_string)
                };
                let name = RawName::Structured {
                    family: part(&["family"]),
                    given: part(&["given"]),
                    particle: part(&["particle", "non-dropping-particle", "dropping-particle"]),
                };
                Some(name)
            }
            _ => None,
        }
    }
}

/// A citation record as decoded from the extraction engine's JSON.
///
/// Deserializing never fails on the record itself: a value that is not a JSON
/// object yields an empty record, and fields of unexpected shape are absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawCitationRecord {
    /// Field values, in upstream order.
    pub(crate) data: HashMap<RawField, Vec<String>>,
    /// Authors of the cited work.
    pub(crate) authors: Vec<RawName>,
    /// Editors of the cited work.
    pub(crate) editors: Vec<RawName>,
    /// Upstream keys with no canonical counterpart.
    pub(crate) ignored_keys: Vec<String>,
}

impl RawCitationRecord {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to a field.
    pub fn add_data(&mut self, field: RawField, value: impl Into<String>) {
        self.data.entry(field).or_default().push(value.into());
    }

    /// Add an author.
    pub fn add_author(&mut self, name: RawName) {
        self.authors.push(name);
    }

    /// Add an editor.
    pub fn add_editor(&mut self, name: RawName) {
        self.editors.push(name);
    }

    /// First value of a field, if present.
    pub fn get_first(&self, field: RawField) -> Option<&str> {
        self.data
            .get(&field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a field; empty when absent.
    pub fn get_all(&self, field: RawField) -> &[String] {
        self.data.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn authors(&self) -> &[RawName] {
        &self.authors
    }

    pub fn editors(&self) -> &[RawName] {
        &self.editors
    }

    /// Upstream keys that were dropped while decoding.
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored_keys
    }

    /// Whether the record carries any field or name at all.
    pub fn has_content(&self) -> bool {
        !self.data.is_empty() || !self.authors.is_empty() || !self.editors.is_empty()
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let mut raw = Self::new();

        for (key, value) in map {
            let lowered = key.trim().to_ascii_lowercase();
            if lowered == "author" || lowered == "editor" {
                let names: Vec<RawName> = match value {
                    Value::Array(items) => items.iter().filter_map(RawName::from_value).collect(),
                    other => RawName::from_value(other).into_iter().collect(),
                };
                if lowered == "author" {
                    raw.authors.extend(names);
                } else {
                    raw.editors.extend(names);
                }
                continue;
            }

            match RawField::from_key(key) {
                Some(field) => {
                    let mut values = Vec::new();
                    flatten_strings(value, &mut values);
                    values.retain(|v| !v.trim().is_empty());
                    if !values.is_empty() {
                        raw.data.entry(field).or_default().extend(values);
                    }
                }
                None => raw.ignored_keys.push(key.clone()),
            }
        }

        raw
    }
}

impl From<Value> for RawCitationRecord {
    fn from(value: Value) -> Self {
        match &value {
            Value::Object(map) => Self::from_object(map),
            _ => Self::default(),
        }
    }
}

/// Collects every string-like leaf of a field value.
///
/// Numbers become their decimal form; CSL date objects contribute their
/// `date-parts`, `raw` or `literal` members; booleans and nulls are dropped.
fn flatten_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|item| flatten_strings(item, out)),
        Value::Object(map) => {
            if let Some(parts) = map.get("date-parts") {
                let mut pieces = Vec::new();
                if let Some(first) = parts.as_array().and_then(|p| p.first()) {
                    flatten_strings(first, &mut pieces);
                } else {
                    flatten_strings(parts, &mut pieces);
                }
                if !pieces.is_empty() {
                    out.push(pieces.join("-"));
                }
            } else if let Some(s) = map
                .get("raw")
                .or_else(|| map.get("literal"))
                .and_then(Value::as_str)
            {
                out.push(s.to_string());
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}
