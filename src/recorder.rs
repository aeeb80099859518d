//! Event recording
//!
//! Fire-and-forget appends of action events to the store. A gesture on the
//! editing surface must never wait on persistence, so `record` stamps the
//! event synchronously and hands it to a single writer task over a channel.
//! The writer preserves causal order; its failures are logged, never raised.

use crate::store::TelemetryStore;
use crate::surface::SurfaceEvent;
use crate::types::{ActionDetails, ActionEvent, ElementType, Position, SessionId};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Records normalized action events against the active session.
pub struct EventRecorder {
    session_rx: watch::Receiver<Option<SessionId>>,
    origin: DateTime<Utc>,
    elapsed_floor_ms: AtomicU64,
    tx: mpsc::UnboundedSender<ActionEvent>,
    writer: JoinHandle<()>,
}

impl EventRecorder {
    /// Create a recorder bound to the session channel published by the
    /// session manager. Spawns the writer task; requires a tokio runtime.
    pub fn new(
        store: Arc<dyn TelemetryStore>,
        session_rx: watch::Receiver<Option<SessionId>>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ActionEvent>();
        let writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(err) = store.append_event(&event).await {
                    // Telemetry loss must never interrupt editing.
                    warn!(
                        session_id = %event.session_id,
                        action = event.action_type.as_str(),
                        error = %err,
                        "dropping event after store failure"
                    );
                }
            }
        });
        Self {
            session_rx,
            origin: Utc::now(),
            elapsed_floor_ms: AtomicU64::new(0),
            tx,
            writer,
        }
    }

    /// Record one action event. Non-blocking; returns immediately.
    ///
    /// Silently drops the event (logged at debug) when no session has been
    /// published yet. Stamps the absolute timestamp and a monotonically
    /// non-decreasing `time_since_start_ms` at call time, so downstream
    /// ordering is deterministic regardless of the store.
    pub fn record(
        &self,
        element_id: Option<String>,
        element_type: Option<ElementType>,
        position: Option<Position>,
        details: ActionDetails,
    ) {
        let session_id = match *self.session_rx.borrow() {
            Some(id) => id,
            None => {
                debug!(
                    action = details.action_type().as_str(),
                    "no active session, dropping event"
                );
                return;
            }
        };

        let timestamp = Utc::now();
        let wall_elapsed = (timestamp - self.origin).num_milliseconds().max(0) as u64;
        // Clock steps backwards must not reorder the log.
        let floor = self
            .elapsed_floor_ms
            .fetch_max(wall_elapsed, Ordering::AcqRel);
        let time_since_start_ms = wall_elapsed.max(floor);

        let event = ActionEvent {
            session_id,
            action_type: details.action_type(),
            element_id,
            element_type,
            position,
            details,
            time_since_start_ms,
            timestamp,
        };

        if self.tx.send(event).is_err() {
            warn!("event writer stopped, dropping event");
        }
    }

    /// Normalize a raw editing-surface notification and record it.
    pub fn observe(&self, event: SurfaceEvent) {
        let (element_id, element_type, position, details) = event.into_parts();
        self.record(element_id, element_type, position, details);
    }

    /// Whether a session id has been published to this recorder yet.
    pub fn has_session(&self) -> bool {
        self.session_rx.borrow().is_some()
    }

    /// Close the channel and wait for the writer to drain pending appends.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.writer.await {
            warn!(error = %err, "event writer did not shut down cleanly");
        }
    }
}
