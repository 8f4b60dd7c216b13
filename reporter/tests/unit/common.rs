//! Shared fixtures

use deploy_reporter::{DeploymentMessage, ReporterError, Upstream};

/// Upstream double that records every delta and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingUpstream {
    pub reports: Vec<DeploymentMessage>,
    pub fail_next: bool,
}

impl Upstream for RecordingUpstream {
    type Error = ReporterError;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        if std::mem::take(&mut self.fail_next) {
            return Err(ReporterError::Upstream("queue unavailable".to_string()));
        }
        self.reports.push(message.clone());
        Ok(())
    }
}

pub fn msg(value: serde_json::Value) -> DeploymentMessage {
    DeploymentMessage::from_value(value).unwrap()
}
