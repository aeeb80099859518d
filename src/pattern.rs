//! Linear pattern extraction
//!
//! Reduces an ordered event log to a compact sequence of
//! (action, classification, label, time) tuples for downstream sequence and
//! temporal-logic analysis. Persistence is an explicit, user-triggered save
//! and fails loudly, unlike ambient event recording.

use crate::error::TelemetryError;
use crate::store::TelemetryStore;
use crate::types::{ActionEvent, ActionType, ElementType, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the linearized session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPatternEntry {
    pub action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

/// A persisted linear pattern artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPattern {
    pub session_id: SessionId,
    pub sequence: Vec<LinearPatternEntry>,
}

/// Map each event to its sequence entry, preserving order.
///
/// The label falls back from the element's value to the freshly edited
/// label to the empty string.
pub fn extract(events: &[ActionEvent]) -> Vec<LinearPatternEntry> {
    events
        .iter()
        .map(|event| LinearPatternEntry {
            action_type: event.action_type,
            element_type: event.element_type,
            label: event.details.label().to_string(),
            timestamp: event.timestamp,
        })
        .collect()
}

/// Persist a linear pattern on explicit request.
///
/// Rejects an empty sequence with [`TelemetryError::EmptySequence`] before
/// any store call; store failures surface to the caller.
pub async fn persist(
    store: &dyn TelemetryStore,
    session_id: SessionId,
    sequence: &[LinearPatternEntry],
) -> Result<(), TelemetryError> {
    if sequence.is_empty() {
        return Err(TelemetryError::EmptySequence);
    }
    store.insert_linear_pattern(session_id, sequence).await
}
