//! Deployment message models

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::ReporterError;

/// Node identity. Integer and string uids never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeUid {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeUid::Int(uid) => write!(f, "{}", uid),
            NodeUid::Str(uid) => write!(f, "'{}'", uid),
        }
    }
}

impl From<i64> for NodeUid {
    fn from(uid: i64) -> Self {
        NodeUid::Int(uid)
    }
}

impl From<&str> for NodeUid {
    fn from(uid: &str) -> Self {
        NodeUid::Str(uid.to_string())
    }
}

impl From<String> for NodeUid {
    fn from(uid: String) -> Self {
        NodeUid::Str(uid)
    }
}

/// One node's state as carried by a deployment message.
///
/// Fields are kept in their wire form; the reporter validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identity (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<NodeUid>,

    /// Lifecycle status name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Completion percentage. Integers wider than `i64` saturate on decode.
    #[serde(
        default,
        deserialize_with = "saturating_progress",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<i64>,

    /// Opaque attributes such as `message`
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

fn saturating_progress<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match (number.as_i64(), number.as_u64()) {
        (Some(progress), _) => Ok(Some(progress)),
        (None, Some(_)) => Ok(Some(i64::MAX)),
        (None, None) => Err(de::Error::custom(format!(
            "progress must be an integer, got {}",
            number
        ))),
    }
}

impl NodeRecord {
    pub fn new(uid: impl Into<NodeUid>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A deployment snapshot, in either direction.
///
/// Every top-level key other than `nodes` lands in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentMessage {
    /// Node-level observations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeRecord>>,

    /// Top-level attributes (`status`, `error_type`, ...)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DeploymentMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.get_or_insert_with(Vec::new).push(node);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Node records, empty when the message has none
    pub fn nodes(&self) -> &[NodeRecord] {
        self.nodes.as_deref().unwrap_or_default()
    }

    /// Overall deployment status
    pub fn status(&self) -> Option<&str> {
        self.attributes.get("status").and_then(Value::as_str)
    }

    /// Deployment error type, set alongside `status == "error"`
    pub fn error_type(&self) -> Option<&str> {
        self.attributes.get("error_type").and_then(Value::as_str)
    }

    /// True when the message carries neither nodes nor attributes
    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty() && self.attributes.is_empty()
    }

    /// Decode from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, ReporterError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode from JSON text
    pub fn from_json(json: &str) -> Result<Self, ReporterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as a JSON value
    pub fn to_value(&self) -> Result<Value, ReporterError> {
        Ok(serde_json::to_value(self)?)
    }
}
