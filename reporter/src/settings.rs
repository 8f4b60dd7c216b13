//! Reporter settings

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ReporterError;
use crate::logs::LogLevel;

/// Reporter settings, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterSettings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Opaque keys a node record may carry besides `uid`, `status` and `progress`
    #[serde(default = "default_node_attributes")]
    pub node_attributes: BTreeSet<String>,

    /// Keys a message may carry besides `nodes`
    #[serde(default = "default_message_attributes")]
    pub message_attributes: BTreeSet<String>,

    /// Reporter worker configuration
    #[serde(default)]
    pub worker: WorkerSettings,
}

fn default_node_attributes() -> BTreeSet<String> {
    ["message", "error_type", "role", "name"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_message_attributes() -> BTreeSet<String> {
    ["status", "error_type", "progress", "message"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            node_attributes: default_node_attributes(),
            message_attributes: default_message_attributes(),
            worker: WorkerSettings::default(),
        }
    }
}

impl ReporterSettings {
    /// Read settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ReporterError::ConfigError(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse settings from JSON text
    pub fn from_json(contents: &str) -> Result<Self, ReporterError> {
        let settings: Self = serde_json::from_str(contents)?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<(), ReporterError> {
        const STRUCTURAL: [&str; 3] = ["uid", "status", "progress"];
        if let Some(key) = self
            .node_attributes
            .iter()
            .find(|key| STRUCTURAL.contains(&key.as_str()))
        {
            return Err(ReporterError::ConfigError(format!(
                "'{}' cannot be declared as an opaque node attribute",
                key
            )));
        }
        if self.message_attributes.contains("nodes") {
            return Err(ReporterError::ConfigError(
                "'nodes' cannot be declared as a message attribute".to_string(),
            ));
        }
        if self.worker.queue_capacity == 0 {
            return Err(ReporterError::ConfigError(
                "worker.queue_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reporter worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Pending reports buffered before senders wait
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}
