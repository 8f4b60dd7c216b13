//! Upstream consumers of reconciled deltas

use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::ReporterError;
use crate::models::message::DeploymentMessage;

/// Receives the deltas a reporter decided to forward.
///
/// Errors are handed back to the caller of `ProxyReporter::report` as they are.
pub trait Upstream {
    type Error;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error>;
}

impl<U: Upstream + ?Sized> Upstream for Box<U> {
    type Error = U::Error;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        (**self).report(message)
    }
}

/// Emits every delta as a tracing event
#[derive(Debug, Clone, Default)]
pub struct LogUpstream {
    reported: u64,
}

impl LogUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deltas logged so far
    pub fn reported(&self) -> u64 {
        self.reported
    }
}

impl Upstream for LogUpstream {
    type Error = ReporterError;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(message)?;
        self.reported += 1;
        info!(seq = self.reported, nodes = message.nodes().len(), "Deployment report: {}", payload);
        Ok(())
    }
}

/// Hands deltas to a consumer task over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelUpstream {
    sender: mpsc::UnboundedSender<DeploymentMessage>,
}

impl ChannelUpstream {
    pub fn new(sender: mpsc::UnboundedSender<DeploymentMessage>) -> Self {
        Self { sender }
    }

    /// Create an upstream together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DeploymentMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl Upstream for ChannelUpstream {
    type Error = ReporterError;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        self.sender
            .send(message.clone())
            .map_err(|_| ReporterError::Upstream("report channel closed".to_string()))?;
        debug!("Queued deployment report on channel");
        Ok(())
    }
}

/// Writes one JSON document per line
#[derive(Debug)]
pub struct JsonLinesUpstream<W> {
    writer: W,
}

impl<W: Write> JsonLinesUpstream<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Upstream for JsonLinesUpstream<W> {
    type Error = ReporterError;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Adapts a closure, e.g. a queue publisher, into an upstream
pub struct FnUpstream<F> {
    func: F,
}

impl<F> FnUpstream<F>
where
    F: FnMut(&DeploymentMessage) -> anyhow::Result<()>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Upstream for FnUpstream<F>
where
    F: FnMut(&DeploymentMessage) -> anyhow::Result<()>,
{
    type Error = ReporterError;

    fn report(&mut self, message: &DeploymentMessage) -> Result<(), Self::Error> {
        (self.func)(message).map_err(ReporterError::from)
    }
}
