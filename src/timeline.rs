//! Timeline graph reconstruction
//!
//! Rebuilds a session as a sequential directed graph for audit and
//! visualization: one node per event, one edge per consecutive pair. The
//! graph carries no state of its own and is fully reconstructible from any
//! ordered event list.

use crate::types::ActionEvent;
use serde::{Deserialize, Serialize};

/// One event rendered as a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineNode {
    /// Position of the event in the log
    pub index: usize,
    pub label: String,
}

/// Directed edge between consecutive events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEdge {
    pub from: usize,
    pub to: usize,
}

/// A renderable sequential graph of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineGraph {
    pub nodes: Vec<TimelineNode>,
    pub edges: Vec<TimelineEdge>,
}

/// Build the timeline graph for an ordered event list.
///
/// N events yield N nodes and N-1 edges in temporal order; an empty list
/// yields an empty graph. Building twice from the same input produces
/// structurally identical output.
pub fn build(events: &[ActionEvent]) -> TimelineGraph {
    let nodes = events
        .iter()
        .enumerate()
        .map(|(index, event)| TimelineNode {
            index,
            label: node_label(event),
        })
        .collect();

    let edges = (1..events.len())
        .map(|to| TimelineEdge { from: to - 1, to })
        .collect();

    TimelineGraph { nodes, edges }
}

/// `action_type (element_type): cell_value`, dropping the parts that are
/// absent
fn node_label(event: &ActionEvent) -> String {
    let mut label = event.action_type.as_str().to_string();
    if let Some(element_type) = event.element_type {
        label.push_str(&format!(" ({})", element_type.as_str()));
    }
    if let Some(value) = event.details.cell_value() {
        if !value.is_empty() {
            label.push_str(&format!(": {value}"));
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionDetails, ActionType, ElementType, SessionId};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn events(session_id: SessionId, count: usize) -> Vec<ActionEvent> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        (0..count)
            .map(|i| ActionEvent {
                session_id,
                action_type: ActionType::AddNode,
                element_id: Some(format!("cell-{i}")),
                element_type: Some(ElementType::Process),
                position: None,
                details: ActionDetails::AddNode {
                    cell_value: Some(format!("Step {i}")),
                    width: None,
                    height: None,
                },
                time_since_start_ms: (i * 1000) as u64,
                timestamp: base + Duration::seconds(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        assert_eq!(build(&[]), TimelineGraph::default());
    }

    #[test]
    fn test_n_events_yield_n_nodes_and_n_minus_one_edges() {
        for n in [1usize, 2, 5, 12] {
            let graph = build(&events(Uuid::new_v4(), n));
            assert_eq!(graph.nodes.len(), n);
            assert_eq!(graph.edges.len(), n - 1);
            for (i, edge) in graph.edges.iter().enumerate() {
                assert_eq!((edge.from, edge.to), (i, i + 1));
            }
        }
    }

    #[test]
    fn test_node_labels_include_type_and_value() {
        let graph = build(&events(Uuid::new_v4(), 1));
        assert_eq!(graph.nodes[0].label, "add_node (process): Step 0");
    }

    #[test]
    fn test_label_omits_missing_parts() {
        let event = ActionEvent {
            session_id: Uuid::new_v4(),
            action_type: ActionType::EditLabel,
            element_id: None,
            element_type: None,
            position: None,
            details: ActionDetails::EditLabel {
                old_label: None,
                new_label: Some("Yes".to_string()),
            },
            time_since_start_ms: 0,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        };
        // edit_label details have no cell_value, so the label stays bare.
        assert_eq!(build(&[event]).nodes[0].label, "edit_label");
    }

    #[test]
    fn test_build_is_idempotent() {
        let input = events(Uuid::new_v4(), 4);
        assert_eq!(build(&input), build(&input));
    }
}
