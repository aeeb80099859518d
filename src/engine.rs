//! Engine orchestration
//!
//! Wires the session manager, recorder, aggregator, and extractors together
//! for a host application: one engine per editing instance. Hosts that need
//! finer control can assemble the components directly.

use crate::aggregator::AnalyticsAggregator;
use crate::error::TelemetryError;
use crate::metrics::MetricsSnapshot;
use crate::pattern::{self, LinearPattern};
use crate::recorder::EventRecorder;
use crate::session::SessionManager;
use crate::store::{self, TelemetryStore};
use crate::timeline::{self, TimelineGraph};
use crate::types::{ActionEvent, SessionId, SnapshotTrigger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Telemetry engine for one editing instance.
pub struct TelemetryEngine {
    store: Arc<dyn TelemetryStore>,
    session: SessionManager,
    recorder: EventRecorder,
}

impl TelemetryEngine {
    /// Create an engine for the given learner and problem. Recording stays
    /// a silent no-op until [`start_session`](Self::start_session) succeeds.
    pub fn new(store: Arc<dyn TelemetryStore>, owner: &str, subject: &str) -> Self {
        let session = SessionManager::new(store.clone(), owner, subject);
        let recorder = EventRecorder::new(store.clone(), session.subscribe());
        Self {
            store,
            session,
            recorder,
        }
    }

    /// Create the session (idempotent) and unblock recording.
    pub async fn start_session(&mut self) -> Result<SessionId, TelemetryError> {
        self.session.ensure_session().await
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.session_id()
    }

    /// The recorder fed by the editing surface
    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// Start periodic analytics for this session's view.
    ///
    /// Cancel the token exactly once when the view is torn down; the loop
    /// schedules nothing after that.
    pub fn spawn_analytics(
        &self,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> (watch::Receiver<MetricsSnapshot>, JoinHandle<()>) {
        AnalyticsAggregator::new(self.store.clone(), self.session.subscribe())
            .spawn(poll_interval, cancel)
    }

    /// One-shot metrics over the current log
    pub async fn compute_snapshot(&self) -> Result<MetricsSnapshot, TelemetryError> {
        AnalyticsAggregator::new(self.store.clone(), self.session.subscribe())
            .compute_snapshot()
            .await
    }

    /// The session's full ordered event log
    pub async fn events(&self) -> Result<Vec<ActionEvent>, TelemetryError> {
        let session_id = self
            .session
            .session_id()
            .ok_or(TelemetryError::SessionNotInitialized)?;
        self.store.query_events(session_id).await
    }

    /// Extract and persist the linear pattern for the session so far.
    ///
    /// Explicit save: fails loudly, including [`TelemetryError::EmptySequence`]
    /// when nothing has been recorded yet.
    pub async fn save_linear_pattern(&self) -> Result<LinearPattern, TelemetryError> {
        let session_id = self
            .session
            .session_id()
            .ok_or(TelemetryError::SessionNotInitialized)?;
        let events = self.store.query_events(session_id).await?;
        let sequence = pattern::extract(&events);
        pattern::persist(self.store.as_ref(), session_id, &sequence).await?;
        Ok(LinearPattern {
            session_id,
            sequence,
        })
    }

    /// Rebuild the audit timeline graph from the persisted log
    pub async fn timeline(&self) -> Result<TimelineGraph, TelemetryError> {
        Ok(timeline::build(&self.events().await?))
    }

    /// Save a diagram snapshot on explicit request
    pub async fn save_snapshot(
        &self,
        snapshot_data: serde_json::Value,
        trigger_event: SnapshotTrigger,
    ) -> Result<(), TelemetryError> {
        let session_id = self
            .session
            .session_id()
            .ok_or(TelemetryError::SessionNotInitialized)?;
        store::save_snapshot(self.store.as_ref(), session_id, snapshot_data, trigger_event).await
    }

    /// Drain pending event writes and release the recorder.
    pub async fn shutdown(self) {
        self.recorder.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::surface::{ElementGeometry, SurfaceEvent};
    use crate::types::ActionType;
    use pretty_assertions::assert_eq;

    fn added(id: &str, style: &str, value: &str) -> SurfaceEvent {
        SurfaceEvent::ElementAdded {
            id: id.to_string(),
            style: style.to_string(),
            value: Some(value.to_string()),
            geometry: Some(ElementGeometry {
                x: 50.0,
                y: 50.0,
                width: 120.0,
                height: 60.0,
            }),
        }
    }

    #[tokio::test]
    async fn test_full_session_flow() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = TelemetryEngine::new(store.clone(), "student_123", "sample_problem_1");

        let session_id = engine.start_session().await.unwrap();
        assert_eq!(engine.start_session().await.unwrap(), session_id);
        assert_eq!(store.session_count(), 1);

        let recorder = engine.recorder();
        recorder.observe(added("cell-1", "shape=ellipse;start", "Start"));
        recorder.observe(added("cell-2", "shape=rect;process", "Read input"));
        recorder.observe(SurfaceEvent::LabelChanged {
            id: "cell-2".to_string(),
            style: "shape=rect;process".to_string(),
            is_vertex: true,
            old_value: Some("Read input".to_string()),
            new_value: Some("Read n".to_string()),
        });
        recorder.observe(SurfaceEvent::ConnectionMade {
            id: "edge-1".to_string(),
            source: Some("cell-1".to_string()),
            target: Some("cell-2".to_string()),
            value: None,
        });

        // Writer task runs on the same scheduler; yield until it drains.
        let mut events = engine.events().await.unwrap();
        for _ in 0..100 {
            if events.len() == 4 {
                break;
            }
            tokio::task::yield_now().await;
            events = engine.events().await.unwrap();
        }
        assert_eq!(events.len(), 4);

        let snapshot = engine.compute_snapshot().await.unwrap();
        assert_eq!(snapshot.total_actions, 4);
        assert_eq!(snapshot.action_breakdown[&ActionType::AddNode], 2);
        assert_eq!(snapshot.revision_count, 1);
        assert_eq!(snapshot.action_types_used, 3);

        let saved = engine.save_linear_pattern().await.unwrap();
        assert_eq!(saved.session_id, session_id);
        assert_eq!(saved.sequence.len(), 4);
        assert_eq!(saved.sequence[0].label, "Start");
        assert_eq!(saved.sequence[2].label, "Read n");
        assert_eq!(store.patterns_for(session_id).len(), 1);

        let graph = engine.timeline().await.unwrap();
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 3);

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_save_pattern_with_no_events_fails() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = TelemetryEngine::new(store, "student_123", "sample_problem_1");
        engine.start_session().await.unwrap();

        let result = engine.save_linear_pattern().await;
        assert!(matches!(result, Err(TelemetryError::EmptySequence)));
    }

    #[tokio::test]
    async fn test_operations_before_session_report_uninitialized() {
        let store = Arc::new(MemoryStore::new());
        let engine = TelemetryEngine::new(store, "student_123", "sample_problem_1");

        assert!(matches!(
            engine.events().await,
            Err(TelemetryError::SessionNotInitialized)
        ));
        assert!(matches!(
            engine.save_linear_pattern().await,
            Err(TelemetryError::SessionNotInitialized)
        ));
        // Metrics stay soft: all-zero instead of an error.
        let snapshot = engine.compute_snapshot().await.unwrap();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }
}
