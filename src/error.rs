//! Error types for thinktrace

use thiserror::Error;

/// Errors that can occur in the telemetry core
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A persistence call failed. Surfaced to the caller for user-triggered
    /// operations (session start, pattern save); background paths log it
    /// and continue.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Linear pattern persistence was attempted with zero events. Rejected
    /// before any store call is made.
    #[error("cannot persist an empty linear pattern")]
    EmptySequence,

    /// An operation required an active session but none has been created.
    #[error("session not initialized")]
    SessionNotInitialized,

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
