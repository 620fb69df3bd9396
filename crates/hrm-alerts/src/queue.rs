//! Queue-driven forwarding
//!
//! A queue hands out alerts in batches. Each alert is forwarded and then
//! deleted, whatever the outcome. Shutdown is only observed while waiting
//! for a batch or backing off: once a batch is received, every alert in it
//! is sent and deleted before the loop exits, so nothing is e-mailed twice.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::event::SnsRecord;
use crate::forwarder::{AlertForwarder, RecordOutcome};

/// Pause after a failed receive before polling again
pub const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// A polled alert and the handle needed to delete it
#[derive(Debug, Clone)]
pub struct ReceivedAlert {
    pub record: SnsRecord,
    pub receipt_handle: String,
}

#[async_trait]
pub trait AlertQueue: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Receive the next batch; may wait for messages to arrive
    async fn poll(&self) -> Result<Vec<ReceivedAlert>>;

    /// Remove a handled message from the queue
    async fn delete(&self, receipt_handle: &str) -> Result<()>;
}

/// Poll and forward until `shutdown` resolves.
pub async fn forward_until<Q, S>(queue: &Q, forwarder: &AlertForwarder, shutdown: S)
where
    Q: AlertQueue + ?Sized,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(queue = %queue.name(), "Alert queue forwarding started");

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = queue.poll() => polled,
        };

        let alerts = match polled {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(queue = %queue.name(), error = %e, "Failed to receive alerts");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                }
                continue;
            }
        };

        forward_batch(queue, forwarder, alerts).await;
    }

    info!(queue = %queue.name(), "Alert queue forwarding stopped");
}

async fn forward_batch<Q>(queue: &Q, forwarder: &AlertForwarder, alerts: Vec<ReceivedAlert>)
where
    Q: AlertQueue + ?Sized,
{
    for alert in alerts {
        let outcome = forwarder.handle_record(&alert.record).await;
        if let RecordOutcome::Failed(reason) = &outcome {
            debug!(reason = %reason, "Deleting alert whose e-mail failed");
        }
        if let Err(e) = queue.delete(&alert.receipt_handle).await {
            warn!(queue = %queue.name(), error = %e, "Failed to delete handled message");
        }
    }
}
