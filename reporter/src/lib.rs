//! Deployment Reporter Library
//!
//! Reconciles status snapshots sent by deployment workers and forwards to an
//! upstream consumer only what represents forward progress.

pub mod errors;
pub mod logs;
pub mod models;
pub mod proxy;
pub mod settings;
pub mod upstream;
pub mod workers;

pub use errors::{ReporterError, ValidationError};
pub use models::message::{DeploymentMessage, NodeRecord, NodeUid};
pub use models::status::NodeStatus;
pub use proxy::ProxyReporter;
pub use upstream::Upstream;
