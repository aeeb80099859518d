//! Periodic analytics aggregation
//!
//! Pulls a fresh copy of the session's event log on a fixed interval and
//! recomputes the metrics snapshot from scratch. The polling loop is bound
//! to the lifetime of the session view: it is spawned once and cancelled
//! exactly once at teardown, including on error paths.

use crate::error::TelemetryError;
use crate::metrics::{self, MetricsSnapshot};
use crate::store::TelemetryStore;
use crate::types::SessionId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default refresh interval, matching a near-real-time metrics display
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Recomputes metrics snapshots for the active session.
pub struct AnalyticsAggregator {
    store: Arc<dyn TelemetryStore>,
    session_rx: watch::Receiver<Option<SessionId>>,
}

impl AnalyticsAggregator {
    pub fn new(
        store: Arc<dyn TelemetryStore>,
        session_rx: watch::Receiver<Option<SessionId>>,
    ) -> Self {
        Self { store, session_rx }
    }

    /// Fetch the full event log and compute a brand-new snapshot.
    ///
    /// Returns the all-zero snapshot when no session is active yet. Store
    /// failures surface to the caller; the polling loop swallows them.
    pub async fn compute_snapshot(&self) -> Result<MetricsSnapshot, TelemetryError> {
        let session_id = match *self.session_rx.borrow() {
            Some(id) => id,
            None => return Ok(MetricsSnapshot::default()),
        };
        let events = self.store.query_events(session_id).await?;
        Ok(metrics::compute(&events))
    }

    /// Start the fixed-interval recompute loop.
    ///
    /// The first refresh happens immediately. Each cycle publishes the new
    /// snapshot on the returned watch channel; a failed cycle logs and
    /// leaves the last published snapshot in place. The loop stops, and
    /// schedules nothing further, once `cancel` is triggered.
    pub fn spawn(
        self,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> (watch::Receiver<MetricsSnapshot>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(MetricsSnapshot::default());
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("analytics polling cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.compute_snapshot().await {
                            Ok(snapshot) => {
                                tx.send_replace(snapshot);
                            }
                            Err(err) => {
                                warn!(error = %err, "analytics refresh failed, keeping last snapshot");
                            }
                        }
                    }
                }
            }
        });
        (rx, handle)
    }
}
