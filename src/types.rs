//! Shared types used across all pipeline stages.
//!
//! Content records arrive from the host as arbitrarily nested data. Rather
//! than carrying an open dynamic value around, every record is modelled as a
//! closed recursive variant: a [`FieldValue`] is a scalar, a list, or a map.
//! The resolver, the assembler, and the front-matter serializer all
//! pattern-match on this one shape.
//!
//! Maps keep insertion order ([`IndexMap`]) so that serializing a record
//! reproduces the key order it was loaded with. Generated documents are
//! cached and re-consumed downstream, so byte-stable output matters more
//! than sorted keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaf value inside a content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A node in a content record: scalar leaf, list, or keyed map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Scalar(Scalar::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        FieldValue::Scalar(Scalar::String(s.into()))
    }

    /// The map behind this value, if it is one.
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::string(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items.into_iter().map(FieldValue::string).collect())
    }
}

/// A unit of content managed by the host's content graph.
///
/// The core only ever reads a node. `node_type` selects which
/// [`TypeConfig`](crate::config::TypeConfig) applies; `parent` is the id of
/// the node this one was derived from, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            parent: None,
            fields: IndexMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// An ordered sequence of keys, parsed from a dotted string.
///
/// `"content.body"` becomes `["content", "body"]`; a string without dots is
/// a path of length one. Segments are kept verbatim, so `"a..b"` looks up
/// the empty key between the two dots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(dotted: &str) -> Self {
        FieldPath(dotted.split('.').map(String::from).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
