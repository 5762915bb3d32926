//! OEM document wrapper and fixed-path extractors

use iss_common::StateVectorRecord;
use serde_json::{Map, Value};
use tracing::warn;

use super::normalize::normalize;
use super::xml::{XmlError, parse_xml};

const HEADER_PATH: &str = "/ndm/oem/header";
const COMMENT_PATH: &str = "/ndm/oem/body/segment/data/COMMENT";
const METADATA_PATH: &str = "/ndm/oem/body/segment/metadata";
const STATE_VECTOR_PATH: &str = "/ndm/oem/body/segment/data/stateVector";

/// A parsed Orbit Ephemeris Message.
///
/// Extractors never fail: a missing or mistyped path is logged and yields an
/// empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct OemDocument {
    root: Value,
}

impl OemDocument {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn from_xml(xml: &str) -> Result<Self, XmlError> {
        parse_xml(xml).map(Self::from_value)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let value = self.root.pointer(path);
        if value.is_none() {
            warn!("Missing key path {} in OEM document", path);
        }
        value
    }

    fn mapping(&self, path: &str) -> Map<String, Value> {
        match self.lookup(path) {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                warn!("Expected a mapping at {}, found {}", path, kind(other));
                Map::new()
            }
            None => Map::new(),
        }
    }

    /// `ndm.oem.header`
    pub fn header(&self) -> Map<String, Value> {
        self.mapping(HEADER_PATH)
    }

    /// `ndm.oem.body.segment.metadata`
    pub fn metadata(&self) -> Map<String, Value> {
        self.mapping(METADATA_PATH)
    }

    /// `ndm.oem.body.segment.data.COMMENT`; a lone comment becomes a
    /// one-element list
    pub fn comments(&self) -> Vec<String> {
        match self.lookup(COMMENT_PATH) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::String(comment) => Some(comment.clone()),
                    other => {
                        warn!(
                            "Dropping comment #{} at {}: expected a string, found {}",
                            index,
                            COMMENT_PATH,
                            kind(other)
                        );
                        None
                    }
                })
                .collect(),
            Some(Value::String(comment)) => vec![comment.clone()],
            Some(other) => {
                warn!("Expected comment list at {}, found {}", COMMENT_PATH, kind(other));
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// `ndm.oem.body.segment.data.stateVector`, untouched
    pub fn raw_state_vectors(&self) -> Vec<Value> {
        match self.lookup(STATE_VECTOR_PATH) {
            Some(Value::Array(items)) => items.clone(),
            Some(single @ Value::Object(_)) => vec![single.clone()],
            Some(other) => {
                warn!("Expected state vectors at {}, found {}", STATE_VECTOR_PATH, kind(other));
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Normalized state vectors in feed order
    pub fn records(&self) -> Vec<StateVectorRecord> {
        normalize(&self.raw_state_vectors())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
