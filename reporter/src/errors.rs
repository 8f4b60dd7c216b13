//! Error types for the deployment reporter

use std::fmt;

use thiserror::Error;

use crate::models::message::NodeUid;

/// Where a rejected key was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocation {
    /// Top level of the deployment message
    Message,

    /// A node record, by position in `nodes`
    Node(usize),
}

impl fmt::Display for KeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLocation::Message => write!(f, "message"),
            KeyLocation::Node(index) => write!(f, "node #{}", index),
        }
    }
}

/// A snapshot failed boundary validation. Nothing was stored or forwarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Node #{index} has no uid")]
    MissingIdentifier { index: usize },

    #[error("Node {uid} reports progress without a status")]
    IncompleteProgress { uid: NodeUid },

    #[error("Node {uid} reports unsupported status '{status}'")]
    UnrecognizedStatus { uid: NodeUid, status: String },

    #[error("Key '{key}' is not allowed in {location}")]
    MalformedKey { location: KeyLocation, key: String },
}

/// Main error type for the deployment reporter
#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReporterError {
    /// The validation failure behind this error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ReporterError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ReporterError {
    fn from(err: anyhow::Error) -> Self {
        ReporterError::Internal(err.to_string())
    }
}
