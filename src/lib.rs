//! Thinktrace - interaction-telemetry and analytics-aggregation engine
//!
//! Thinktrace records every manipulation of a diagram on a canvas as a
//! timestamped action event and continuously aggregates the event log into
//! behavioral metrics (time-on-task, revision rate, planning latency,
//! efficiency) and an ordered linear pattern suitable for downstream
//! sequence analysis.
//!
//! ## Components
//!
//! - **Session Manager**: one session per editing instance, idempotent creation
//! - **Event Recorder**: fire-and-forget normalization and append of surface events
//! - **Analytics Aggregator**: periodic wholesale recompute of the metrics snapshot
//! - **Linear Pattern Extractor**: event log → ordered (action, type, label, time) sequence
//! - **Timeline Graph Builder**: event log → sequential directed audit graph
//!
//! The diagram editor and the persistence backend are external collaborators:
//! the editor feeds [`SurfaceEvent`]s in, and any backend implementing
//! [`TelemetryStore`] holds the rows.

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod pattern;
pub mod recorder;
pub mod session;
pub mod store;
pub mod surface;
pub mod timeline;
pub mod types;

pub use aggregator::{AnalyticsAggregator, DEFAULT_POLL_INTERVAL};
pub use engine::TelemetryEngine;
pub use error::TelemetryError;
pub use metrics::MetricsSnapshot;
pub use pattern::{LinearPattern, LinearPatternEntry};
pub use recorder::EventRecorder;
pub use session::{SessionManager, SessionState};
pub use store::{MemoryStore, TelemetryStore};
pub use surface::{ElementGeometry, SurfaceEvent};
pub use timeline::{TimelineEdge, TimelineGraph, TimelineNode};
pub use types::{
    ActionDetails, ActionEvent, ActionType, DiagramSnapshot, ElementType, Position, Session,
    SessionId, SnapshotTrigger,
};

/// Engine version embedded by hosts in exported artifacts
pub const THINKTRACE_VERSION: &str = env!("CARGO_PKG_VERSION");
