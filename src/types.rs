//! Core types for the thinktrace telemetry engine
//!
//! This module defines the data structures that flow through the engine:
//! sessions, action events, and the closed classifications applied to both
//! at event-creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session identifier
pub type SessionId = Uuid;

/// The kind of user interaction an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddNode,
    DeleteNode,
    MoveNode,
    EditLabel,
    ConnectNodes,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AddNode => "add_node",
            ActionType::DeleteNode => "delete_node",
            ActionType::MoveNode => "move_node",
            ActionType::EditLabel => "edit_label",
            ActionType::ConnectNodes => "connect_nodes",
        }
    }
}

/// Diagram element classification (vendor-agnostic)
///
/// Derived exactly once, when the event is created, from the editing
/// surface's style descriptor. Never recomputed retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Terminal,
    Decision,
    Process,
    InputOutput,
    Document,
    Connector,
    TextLabel,
    Connection,
}

impl ElementType {
    /// Classify a diagram element from its style descriptor.
    ///
    /// Edges and other non-vertex elements are always `Connection`. Vertices
    /// fall back to `Process` when no known marker appears in the style.
    pub fn classify(style: &str, is_vertex: bool) -> Self {
        if !is_vertex {
            return ElementType::Connection;
        }
        if style.contains("start") || style.contains("end") {
            ElementType::Terminal
        } else if style.contains("decision") {
            ElementType::Decision
        } else if style.contains("process") {
            ElementType::Process
        } else if style.contains("input") || style.contains("output") {
            ElementType::InputOutput
        } else if style.contains("document") {
            ElementType::Document
        } else if style.contains("connector") {
            ElementType::Connector
        } else if style.contains("text") {
            ElementType::TextLabel
        } else {
            ElementType::Process
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Terminal => "terminal",
            ElementType::Decision => "decision",
            ElementType::Process => "process",
            ElementType::InputOutput => "input_output",
            ElementType::Document => "document",
            ElementType::Connector => "connector",
            ElementType::TextLabel => "text_label",
            ElementType::Connection => "connection",
        }
    }
}

/// Canvas position of an affected element, with the move delta when the
/// event is a drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dy: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            dx: None,
            dy: None,
        }
    }

    pub fn with_delta(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self {
            x,
            y,
            dx: Some(dx),
            dy: Some(dy),
        }
    }
}

/// Per-action detail payload
///
/// One variant per action type, so the shape of the details is checked at
/// compile time. Free-form label-ish values stay optional strings, matching
/// what editing surfaces actually report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetails {
    AddNode {
        #[serde(skip_serializing_if = "Option::is_none")]
        cell_value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
    DeleteNode {
        #[serde(skip_serializing_if = "Option::is_none")]
        cell_value: Option<String>,
    },
    MoveNode {
        #[serde(skip_serializing_if = "Option::is_none")]
        cell_value: Option<String>,
        /// Euclidean drag distance in canvas units
        move_distance: f64,
    },
    EditLabel {
        #[serde(skip_serializing_if = "Option::is_none")]
        old_label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_label: Option<String>,
    },
    ConnectNodes {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cell_value: Option<String>,
    },
}

impl ActionDetails {
    /// The action type this detail payload belongs to
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionDetails::AddNode { .. } => ActionType::AddNode,
            ActionDetails::DeleteNode { .. } => ActionType::DeleteNode,
            ActionDetails::MoveNode { .. } => ActionType::MoveNode,
            ActionDetails::EditLabel { .. } => ActionType::EditLabel,
            ActionDetails::ConnectNodes { .. } => ActionType::ConnectNodes,
        }
    }

    /// Display label for this event: the element's value if present, else
    /// the freshly edited label, else empty.
    pub fn label(&self) -> &str {
        let value = match self {
            ActionDetails::AddNode { cell_value, .. }
            | ActionDetails::DeleteNode { cell_value }
            | ActionDetails::MoveNode { cell_value, .. }
            | ActionDetails::ConnectNodes { cell_value, .. } => cell_value,
            ActionDetails::EditLabel { new_label, .. } => new_label,
        };
        value.as_deref().unwrap_or("")
    }

    /// The element's value, when the surface reported one
    pub fn cell_value(&self) -> Option<&str> {
        match self {
            ActionDetails::AddNode { cell_value, .. }
            | ActionDetails::DeleteNode { cell_value }
            | ActionDetails::MoveNode { cell_value, .. }
            | ActionDetails::ConnectNodes { cell_value, .. } => cell_value.as_deref(),
            ActionDetails::EditLabel { .. } => None,
        }
    }
}

/// One normalized, immutable record of a single user interaction
///
/// Events are append-only and ordered by `timestamp`, ties broken by
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub session_id: SessionId,
    pub action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub details: ActionDetails,
    /// Milliseconds since the session origin, stamped at call time
    pub time_since_start_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// One continuous editing instance
///
/// Created exactly once per editing instance, immutable thereafter. Deletion
/// is an external-store concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub owner: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// What prompted a diagram snapshot save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotTrigger {
    ManualSave,
    SessionEnd,
}

/// An on-demand capture of the diagram's serialized state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub session_id: SessionId,
    pub snapshot_data: serde_json::Value,
    pub trigger_event: SnapshotTrigger,
    pub captured_at: DateTime<Utc>,
}
