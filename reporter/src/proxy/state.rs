//! Per-node merge rules

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::message::{NodeRecord, NodeUid};
use crate::models::status::NodeStatus;

pub const MAX_PROGRESS: u8 = 100;

/// A validated, clamped node record from an incoming snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub uid: NodeUid,
    pub status: Option<NodeStatus>,
    pub progress: Option<u8>,
    pub attributes: Map<String, Value>,
}

impl Observation {
    /// Clamps progress into `[0, 100]` and locks a ready node at 100.
    pub fn new(
        uid: NodeUid,
        status: Option<NodeStatus>,
        progress: Option<i64>,
        attributes: Map<String, Value>,
    ) -> Self {
        let mut progress = progress.map(|value| clamp_progress(&uid, value));

        if status == Some(NodeStatus::Ready) && progress != Some(MAX_PROGRESS) {
            if progress.is_some() {
                warn!(
                    "Node {} is ready with progress {:?}, setting it to {}",
                    uid, progress, MAX_PROGRESS
                );
            }
            progress = Some(MAX_PROGRESS);
        }

        Self {
            uid,
            status,
            progress,
            attributes,
        }
    }

    /// The full record as forwarded upstream
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            uid: Some(self.uid.clone()),
            status: self.status.map(|status| status.as_str().to_string()),
            progress: self.progress.map(i64::from),
            attributes: self.attributes.clone(),
        }
    }
}

fn clamp_progress(uid: &NodeUid, value: i64) -> u8 {
    if value > i64::from(MAX_PROGRESS) {
        warn!(
            "Node {} reported progress {} > {}, adjusting it to {}",
            uid, value, MAX_PROGRESS, MAX_PROGRESS
        );
        MAX_PROGRESS
    } else if value < 0 {
        warn!("Node {} reported negative progress {}, adjusting it to 0", uid, value);
        0
    } else {
        value as u8
    }
}

/// Why an observation was not forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Nothing differs from what was last delivered
    Unchanged,

    /// Status rank would go down
    StatusRegression { from: NodeStatus, to: NodeStatus },

    /// Same status, lower progress
    ProgressRegression { from: u8, to: u8 },
}

/// Outcome of comparing an observation with the delivered state
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Forward(NodeState),
    Suppress(Suppression),
}

/// Last delivered state of one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    pub status: Option<NodeStatus>,
    pub progress: Option<u8>,
    pub attributes: Map<String, Value>,
}

impl From<&Observation> for NodeState {
    fn from(observation: &Observation) -> Self {
        Self {
            status: observation.status,
            progress: observation.progress,
            attributes: observation.attributes.clone(),
        }
    }
}

impl NodeState {
    /// Compare an observation of the same node with this state.
    ///
    /// On `Forward` the carried state replaces this one once delivered.
    pub fn judge(&self, observation: &Observation) -> Verdict {
        if let (Some(from), Some(to)) = (self.status, observation.status) {
            if from.is_regression_to(to) {
                return Verdict::Suppress(Suppression::StatusRegression { from, to });
            }
        }

        let status_changed = observation.status.is_some() && observation.status != self.status;

        let progress_advanced = match (self.progress, observation.progress) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(from), Some(to)) => {
                if !status_changed && to < from {
                    return Verdict::Suppress(Suppression::ProgressRegression { from, to });
                }
                to > from
            }
        };

        let attributes_changed = observation.attributes != self.attributes;

        if !(status_changed || progress_advanced || attributes_changed) {
            return Verdict::Suppress(Suppression::Unchanged);
        }

        // Progress belongs to a status; a new status without progress drops the old value.
        let progress = match observation.progress {
            Some(progress) => Some(progress),
            None if status_changed => None,
            None => self.progress,
        };

        Verdict::Forward(NodeState {
            status: observation.status.or(self.status),
            progress,
            attributes: observation.attributes.clone(),
        })
    }
}
