//! Session lifecycle management
//!
//! One session per editing instance. The manager owns the lifecycle state
//! explicitly (no globals) and publishes the assigned identifier over a
//! watch channel so downstream components can wait for it before recording.

use crate::error::TelemetryError;
use crate::store::TelemetryStore;
use crate::types::SessionId;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Lifecycle state of an editing instance's session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been requested yet
    Uninitialized,
    /// A create is in flight
    Pending,
    /// The session row exists and its id has been published
    Active(SessionId),
    /// The last create attempt failed; the next call retries
    Failed,
}

/// Owns session creation for one editing instance.
///
/// `ensure_session` is idempotent: once a session exists, repeated calls
/// return the same identifier and never insert a second row.
pub struct SessionManager {
    store: Arc<dyn TelemetryStore>,
    owner: String,
    subject: String,
    state: SessionState,
    initialized: bool,
    session_id: Option<SessionId>,
    notifier: watch::Sender<Option<SessionId>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TelemetryStore>, owner: &str, subject: &str) -> Self {
        let (notifier, _) = watch::channel(None);
        Self {
            store,
            owner: owner.to_string(),
            subject: subject.to_string(),
            state: SessionState::Uninitialized,
            initialized: false,
            session_id: None,
            notifier,
        }
    }

    /// Create the session if one does not exist yet, and return its id.
    ///
    /// The initialized flag and the cached id must both agree before
    /// creation is skipped; the flag is set before any suspension, so a
    /// second call arriving mid-create observes `Pending` rather than
    /// racing the insert. Store failure surfaces to the caller and leaves
    /// the manager eligible for retry.
    pub async fn ensure_session(&mut self) -> Result<SessionId, TelemetryError> {
        if self.initialized {
            if let Some(id) = self.session_id {
                return Ok(id);
            }
        }

        self.state = SessionState::Pending;
        match self.store.insert_session(&self.owner, &self.subject).await {
            Ok(session) => {
                self.session_id = Some(session.id);
                self.initialized = true;
                self.state = SessionState::Active(session.id);
                self.notifier.send_replace(Some(session.id));
                info!(session_id = %session.id, owner = %self.owner, "session started");
                Ok(session.id)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                warn!(error = %err, "session create failed");
                Err(err)
            }
        }
    }

    /// Subscribe to session-id publication. Holds `None` until a session
    /// has been created.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionId>> {
        self.notifier.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }
}
