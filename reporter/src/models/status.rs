//! Node lifecycle statuses and their rank

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Recognised node status.
///
/// Variants are declared in rank order, so the derived `Ord` agrees with
/// [`NodeStatus::rank`]. A transition to a strictly lower rank is a regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Node discovered, nothing done yet
    Discover,

    /// Provisioning requested
    Provision,

    /// Operating system install in progress
    Provisioning,

    /// Operating system installed
    Provisioned,

    /// Deployment in progress
    Deploying,

    /// Deployed successfully, progress locked to 100
    Ready,

    /// Failed; reachable from every other status
    Error,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 7] = [
        NodeStatus::Discover,
        NodeStatus::Provision,
        NodeStatus::Provisioning,
        NodeStatus::Provisioned,
        NodeStatus::Deploying,
        NodeStatus::Ready,
        NodeStatus::Error,
    ];

    pub const fn rank(self) -> u8 {
        match self {
            NodeStatus::Discover => 10,
            NodeStatus::Provision => 20,
            NodeStatus::Provisioning => 30,
            NodeStatus::Provisioned => 40,
            NodeStatus::Deploying => 50,
            NodeStatus::Ready => 60,
            NodeStatus::Error => 70,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Discover => "discover",
            NodeStatus::Provision => "provision",
            NodeStatus::Provisioning => "provisioning",
            NodeStatus::Provisioned => "provisioned",
            NodeStatus::Deploying => "deploying",
            NodeStatus::Ready => "ready",
            NodeStatus::Error => "error",
        }
    }

    /// True if moving from `self` to `next` would go back in the lifecycle
    pub fn is_regression_to(self, next: NodeStatus) -> bool {
        next.rank() < self.rank()
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid node status: {}", s))
    }
}
