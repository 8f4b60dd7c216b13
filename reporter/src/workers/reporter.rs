//! Reporter worker: serialises reports from many producers onto one reporter

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::ReporterError;
use crate::models::message::DeploymentMessage;
use crate::proxy::ProxyReporter;
use crate::settings::WorkerSettings;
use crate::upstream::Upstream;

/// Reporter worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Pending reports buffered before senders wait
    pub queue_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self::from(&WorkerSettings::default())
    }
}

impl From<&WorkerSettings> for Options {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            queue_capacity: settings.queue_capacity,
        }
    }
}

struct Request {
    message: DeploymentMessage,
    reply: oneshot::Sender<Result<(), ReporterError>>,
}

/// Cloneable handle for submitting snapshots to the worker
#[derive(Debug, Clone)]
pub struct ReporterHandle {
    sender: mpsc::Sender<Request>,
}

impl ReporterHandle {
    /// Submit a snapshot and wait until it has been reconciled (and forwarded
    /// if anything was new). Reports are processed in submission order.
    pub async fn report(&self, message: DeploymentMessage) -> Result<(), ReporterError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Request { message, reply })
            .await
            .map_err(|_| ReporterError::ShutdownError("reporter worker is not running".to_string()))?;

        response.await.map_err(|_| {
            ReporterError::ShutdownError("reporter worker stopped before handling the report".to_string())
        })?
    }

    /// True once the worker has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request").field("message", &self.message).finish()
    }
}

/// Move `reporter` into a task and return a handle to it.
///
/// The task runs until `shutdown_signal` resolves or every handle is dropped,
/// then yields the reporter back through the join handle.
pub fn spawn<U>(
    reporter: ProxyReporter<U>,
    options: &Options,
    shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> (ReporterHandle, JoinHandle<ProxyReporter<U>>)
where
    U: Upstream<Error = ReporterError> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(options.queue_capacity.max(1));
    let handle = tokio::spawn(run(reporter, receiver, shutdown_signal));
    (ReporterHandle { sender }, handle)
}

async fn run<U>(
    mut reporter: ProxyReporter<U>,
    mut requests: mpsc::Receiver<Request>,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> ProxyReporter<U>
where
    U: Upstream<Error = ReporterError>,
{
    info!("Reporter worker starting...");

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Reporter worker shutting down...");
                break;
            }
            request = requests.recv() => {
                let Some(Request { message, reply }) = request else {
                    info!("All reporter handles dropped, reporter worker stopping");
                    break;
                };

                let result = reporter.report(&message);
                if let Err(e) = &result {
                    error!("Report rejected: {}", e);
                }
                if reply.send(result).is_err() {
                    debug!("Reporter caller went away before the reply");
                }
            }
        }
    }

    requests.close();
    reporter
}
