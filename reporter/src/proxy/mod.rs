//! Status reconciliation

pub mod reporter;
pub mod state;
pub mod validate;

pub use reporter::ProxyReporter;
