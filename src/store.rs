//! Abstract persistence interface
//!
//! The engine never talks to a concrete backend. It consumes an append-only
//! store with ordered range reads, supplied by the host application. The
//! bundled [`MemoryStore`] backs tests and hosts that run without a backend.

use crate::error::TelemetryError;
use crate::pattern::LinearPatternEntry;
use crate::types::{ActionEvent, DiagramSnapshot, Session, SessionId, SnapshotTrigger};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Persistence contract the core consumes.
///
/// Implementations decide where rows live (SQL, document store, files). The
/// core only requires that `query_events` returns events ascending by
/// timestamp with insertion order preserved on ties.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Create a session row and return the assigned session.
    async fn insert_session(&self, owner: &str, subject: &str)
        -> Result<Session, TelemetryError>;

    /// Append one event to a session's log. Append-only; events are never
    /// updated or removed.
    async fn append_event(&self, event: &ActionEvent) -> Result<(), TelemetryError>;

    /// Full-range read of a session's event log, ascending by timestamp,
    /// stable on ties.
    async fn query_events(&self, session_id: SessionId)
        -> Result<Vec<ActionEvent>, TelemetryError>;

    /// Persist a linear pattern as a terminal artifact.
    async fn insert_linear_pattern(
        &self,
        session_id: SessionId,
        sequence: &[LinearPatternEntry],
    ) -> Result<(), TelemetryError>;

    /// Persist an on-demand diagram snapshot.
    async fn insert_snapshot(&self, snapshot: &DiagramSnapshot) -> Result<(), TelemetryError>;
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<SessionId, Session>,
    events: HashMap<SessionId, Vec<ActionEvent>>,
    patterns: HashMap<SessionId, Vec<Vec<LinearPatternEntry>>>,
    snapshots: Vec<DiagramSnapshot>,
}

/// In-process store used by tests and backend-less hosts.
///
/// Locks are never held across await points; every operation is a short
/// synchronous critical section.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session rows, for idempotency checks in tests
    pub fn session_count(&self) -> usize {
        self.state.lock().expect("memory store poisoned").sessions.len()
    }

    /// Saved linear patterns for a session
    pub fn patterns_for(&self, session_id: SessionId) -> Vec<Vec<LinearPatternEntry>> {
        self.state
            .lock()
            .expect("memory store poisoned")
            .patterns
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Saved diagram snapshots for a session
    pub fn snapshots_for(&self, session_id: SessionId) -> Vec<DiagramSnapshot> {
        self.state
            .lock()
            .expect("memory store poisoned")
            .snapshots
            .iter()
            .filter(|s| s.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    async fn insert_session(
        &self,
        owner: &str,
        subject: &str,
    ) -> Result<Session, TelemetryError> {
        let session = Session {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            subject: subject.to_string(),
            created_at: Utc::now(),
        };
        let mut state = self.state.lock().expect("memory store poisoned");
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn append_event(&self, event: &ActionEvent) -> Result<(), TelemetryError> {
        let mut state = self.state.lock().expect("memory store poisoned");
        if !state.sessions.contains_key(&event.session_id) {
            return Err(TelemetryError::StoreUnavailable(format!(
                "unknown session {}",
                event.session_id
            )));
        }
        state
            .events
            .entry(event.session_id)
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn query_events(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ActionEvent>, TelemetryError> {
        let state = self.state.lock().expect("memory store poisoned");
        let mut events = state.events.get(&session_id).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn insert_linear_pattern(
        &self,
        session_id: SessionId,
        sequence: &[LinearPatternEntry],
    ) -> Result<(), TelemetryError> {
        let mut state = self.state.lock().expect("memory store poisoned");
        state
            .patterns
            .entry(session_id)
            .or_default()
            .push(sequence.to_vec());
        Ok(())
    }

    async fn insert_snapshot(&self, snapshot: &DiagramSnapshot) -> Result<(), TelemetryError> {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// Capture the current diagram state as a snapshot row.
///
/// Explicit, user-triggered save. Store failures surface to the caller.
pub async fn save_snapshot(
    store: &dyn TelemetryStore,
    session_id: SessionId,
    snapshot_data: serde_json::Value,
    trigger_event: SnapshotTrigger,
) -> Result<(), TelemetryError> {
    let snapshot = DiagramSnapshot {
        session_id,
        snapshot_data,
        trigger_event,
        captured_at: Utc::now(),
    };
    store.insert_snapshot(&snapshot).await
}
