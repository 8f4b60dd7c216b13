//! Reconciling proxy reporter

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::ValidationError;
use crate::models::message::{DeploymentMessage, NodeUid};
use crate::proxy::state::{NodeState, Suppression, Verdict};
use crate::proxy::validate::Schema;
use crate::settings::ReporterSettings;
use crate::upstream::Upstream;

/// Sits in front of an upstream reporter and forwards only forward progress.
///
/// One instance tracks one deployment. It is not synchronised; see
/// [`crate::workers::reporter`] for shared use.
#[derive(Debug)]
pub struct ProxyReporter<U> {
    upstream: U,
    schema: Schema,
    nodes: HashMap<NodeUid, NodeState>,
    attributes: Map<String, Value>,
}

impl<U> ProxyReporter<U>
where
    U: Upstream,
    U::Error: From<ValidationError>,
{
    pub fn new(upstream: U) -> Self {
        Self::with_schema(upstream, Schema::default())
    }

    pub fn with_settings(upstream: U, settings: &ReporterSettings) -> Self {
        Self::with_schema(upstream, Schema::from_settings(settings))
    }

    pub fn with_schema(upstream: U, schema: Schema) -> Self {
        Self {
            upstream,
            schema,
            nodes: HashMap::new(),
            attributes: Map::new(),
        }
    }

    /// Reconcile a snapshot and forward what is new.
    ///
    /// The upstream is called at most once. State is committed only after it
    /// accepts the delta, so a rejected snapshot or a failed delivery leaves
    /// the reporter as it was.
    pub fn report(&mut self, message: &DeploymentMessage) -> Result<(), U::Error> {
        let observations = self.schema.validate(message)?;

        let mut staged: HashMap<NodeUid, NodeState> = HashMap::new();
        let mut delta_nodes = Vec::new();

        for observation in observations {
            let previous = staged
                .get(&observation.uid)
                .or_else(|| self.nodes.get(&observation.uid));

            let next = match previous {
                None => NodeState::from(&observation),
                Some(previous) => match previous.judge(&observation) {
                    Verdict::Forward(next) => next,
                    Verdict::Suppress(reason) => {
                        log_suppression(&observation.uid, reason);
                        continue;
                    }
                },
            };

            delta_nodes.push(observation.to_record());
            staged.insert(observation.uid, next);
        }

        let changed_attributes: Map<String, Value> = message
            .attributes
            .iter()
            .filter(|(key, value)| self.attributes.get(key.as_str()) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let delta = DeploymentMessage {
            nodes: (!delta_nodes.is_empty()).then_some(delta_nodes),
            attributes: changed_attributes,
        };

        if delta.is_empty() {
            debug!("Report carries no new information, not forwarding");
            return Ok(());
        }

        self.upstream.report(&delta)?;

        debug!(
            "Forwarded {} node(s) and {} attribute(s)",
            delta.nodes().len(),
            delta.attributes.len()
        );
        self.nodes.extend(staged);
        self.attributes.extend(delta.attributes);
        Ok(())
    }
}

impl<U> ProxyReporter<U> {
    /// Last delivered state of a node
    pub fn node(&self, uid: &NodeUid) -> Option<&NodeState> {
        self.nodes.get(uid)
    }

    /// All nodes delivered so far
    pub fn nodes(&self) -> &HashMap<NodeUid, NodeState> {
        &self.nodes
    }

    /// Last delivered value of a top-level attribute
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn upstream_mut(&mut self) -> &mut U {
        &mut self.upstream
    }

    pub fn into_inner(self) -> U {
        self.upstream
    }
}

fn log_suppression(uid: &NodeUid, reason: Suppression) {
    match reason {
        Suppression::Unchanged => debug!("Node {} unchanged, skipping", uid),
        Suppression::StatusRegression { from, to } => warn!(
            "Attempt to assign lower status detected: status was {}, attempted {}. Skipping node {}",
            from, to, uid
        ),
        Suppression::ProgressRegression { from, to } => info!(
            "Node {} progress went down from {} to {}, skipping",
            uid, from, to
        ),
    }
}
