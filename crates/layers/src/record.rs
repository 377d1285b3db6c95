use std::collections::BTreeMap;

use foundation::ids::FeatureId;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// Scalar attribute value as returned by a feature store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(n) => write!(f, "{n}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Int(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Int(i64::from(n))
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

/// One feature fetched from a store.
///
/// Attributes are fixed at load time. Geometry may be absent until it is
/// fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "id")]
    pub identity: FeatureId,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl FeatureRecord {
    pub fn new(identity: impl Into<FeatureId>) -> Self {
        Self {
            identity: identity.into(),
            attributes: BTreeMap::new(),
            geometry: None,
        }
    }

    pub fn with_attribute(
        mut self,
        field: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    /// Attribute rendered as text; missing and null fields render empty.
    pub fn attribute_text(&self, field: &str) -> String {
        self.attribute(field).map(ToString::to_string).unwrap_or_default()
    }

    pub fn without_geometry(mut self) -> Self {
        self.geometry = None;
        self
    }
}
