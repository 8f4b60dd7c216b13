//! Boundary validation of incoming snapshots

use std::collections::BTreeSet;

use tracing::error;

use crate::errors::{KeyLocation, ValidationError};
use crate::models::message::{DeploymentMessage, NodeRecord};
use crate::models::status::NodeStatus;
use crate::proxy::state::Observation;
use crate::settings::ReporterSettings;

/// Allow-lists for the opaque keys a snapshot may carry
#[derive(Debug, Clone)]
pub struct Schema {
    node_attributes: BTreeSet<String>,
    message_attributes: BTreeSet<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::from_settings(&ReporterSettings::default())
    }
}

impl Schema {
    pub fn from_settings(settings: &ReporterSettings) -> Self {
        Self {
            node_attributes: settings.node_attributes.clone(),
            message_attributes: settings.message_attributes.clone(),
        }
    }

    /// Validate the whole message, returning one clamped observation per node
    /// in message order. The first violation rejects the message.
    pub fn validate(&self, message: &DeploymentMessage) -> Result<Vec<Observation>, ValidationError> {
        let result = self.check_message(message);
        if let Err(ref e) = result {
            error!("Validation of report failed: {}", e);
        }
        result
    }

    fn check_message(&self, message: &DeploymentMessage) -> Result<Vec<Observation>, ValidationError> {
        if let Some(key) = message
            .attributes
            .keys()
            .find(|key| !self.message_attributes.contains(key.as_str()))
        {
            return Err(ValidationError::MalformedKey {
                location: KeyLocation::Message,
                key: key.clone(),
            });
        }

        message
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| self.check_node(index, node))
            .collect()
    }

    fn check_node(&self, index: usize, node: &NodeRecord) -> Result<Observation, ValidationError> {
        let uid = node
            .uid
            .clone()
            .ok_or(ValidationError::MissingIdentifier { index })?;

        if let Some(key) = node
            .attributes
            .keys()
            .find(|key| !self.node_attributes.contains(key.as_str()))
        {
            return Err(ValidationError::MalformedKey {
                location: KeyLocation::Node(index),
                key: key.clone(),
            });
        }

        let status = match node.status.as_deref() {
            Some(name) => Some(name.parse::<NodeStatus>().map_err(|_| {
                ValidationError::UnrecognizedStatus {
                    uid: uid.clone(),
                    status: name.to_string(),
                }
            })?),
            None if node.progress.is_some() => {
                return Err(ValidationError::IncompleteProgress { uid });
            }
            None => None,
        };

        Ok(Observation::new(uid, status, node.progress, node.attributes.clone()))
    }
}
