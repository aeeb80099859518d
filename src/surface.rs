//! Editing-surface notification stream
//!
//! The diagram editor is a black box; the core only sees the raw interaction
//! facts it emits. Each notification carries enough metadata (identifier,
//! style descriptor, geometry, value) to populate one action event. Element
//! classification happens here, exactly once per notification.

use crate::types::{ActionDetails, ActionType, ElementType, Position};

/// Geometry of the affected element as the surface reported it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A raw interaction fact emitted by the editing surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A vertex was placed on the canvas
    ElementAdded {
        id: String,
        style: String,
        value: Option<String>,
        geometry: Option<ElementGeometry>,
    },
    /// Any cell (vertex or edge) was removed
    ElementRemoved {
        id: String,
        style: String,
        is_vertex: bool,
        value: Option<String>,
    },
    /// A vertex was dragged to a new position
    ElementMoved {
        id: String,
        style: String,
        value: Option<String>,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
    },
    /// A cell's label was edited in place
    LabelChanged {
        id: String,
        style: String,
        is_vertex: bool,
        old_value: Option<String>,
        new_value: Option<String>,
    },
    /// An edge was drawn between two vertices
    ConnectionMade {
        id: String,
        source: Option<String>,
        target: Option<String>,
        value: Option<String>,
    },
}

impl SurfaceEvent {
    pub fn action_type(&self) -> ActionType {
        match self {
            SurfaceEvent::ElementAdded { .. } => ActionType::AddNode,
            SurfaceEvent::ElementRemoved { .. } => ActionType::DeleteNode,
            SurfaceEvent::ElementMoved { .. } => ActionType::MoveNode,
            SurfaceEvent::LabelChanged { .. } => ActionType::EditLabel,
            SurfaceEvent::ConnectionMade { .. } => ActionType::ConnectNodes,
        }
    }

    /// Normalize the notification into the pieces of an action event:
    /// element id, derived classification, position, and detail payload.
    pub fn into_parts(
        self,
    ) -> (
        Option<String>,
        Option<ElementType>,
        Option<Position>,
        ActionDetails,
    ) {
        match self {
            SurfaceEvent::ElementAdded {
                id,
                style,
                value,
                geometry,
            } => (
                Some(id),
                Some(ElementType::classify(&style, true)),
                geometry.map(|g| Position::new(g.x, g.y)),
                ActionDetails::AddNode {
                    cell_value: value,
                    width: geometry.map(|g| g.width),
                    height: geometry.map(|g| g.height),
                },
            ),
            SurfaceEvent::ElementRemoved {
                id,
                style,
                is_vertex,
                value,
            } => (
                Some(id),
                Some(ElementType::classify(&style, is_vertex)),
                None,
                ActionDetails::DeleteNode { cell_value: value },
            ),
            SurfaceEvent::ElementMoved {
                id,
                style,
                value,
                x,
                y,
                dx,
                dy,
            } => (
                Some(id),
                Some(ElementType::classify(&style, true)),
                Some(Position::with_delta(x, y, dx, dy)),
                ActionDetails::MoveNode {
                    cell_value: value,
                    move_distance: (dx * dx + dy * dy).sqrt(),
                },
            ),
            SurfaceEvent::LabelChanged {
                id,
                style,
                is_vertex,
                old_value,
                new_value,
            } => (
                Some(id),
                Some(ElementType::classify(&style, is_vertex)),
                None,
                ActionDetails::EditLabel {
                    old_label: old_value,
                    new_label: new_value,
                },
            ),
            SurfaceEvent::ConnectionMade {
                id,
                source,
                target,
                value,
            } => (
                Some(id),
                Some(ElementType::Connection),
                None,
                ActionDetails::ConnectNodes {
                    source,
                    target,
                    cell_value: value,
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_vertex_is_classified_and_positioned() {
        let event = SurfaceEvent::ElementAdded {
            id: "cell-1".to_string(),
            style: "shape=rhombus;decision".to_string(),
            value: Some("Decision?".to_string()),
            geometry: Some(ElementGeometry {
                x: 50.0,
                y: 50.0,
                width: 120.0,
                height: 80.0,
            }),
        };
        assert_eq!(event.action_type(), ActionType::AddNode);

        let (id, element_type, position, details) = event.into_parts();
        assert_eq!(id.as_deref(), Some("cell-1"));
        assert_eq!(element_type, Some(ElementType::Decision));
        assert_eq!(position.unwrap().x, 50.0);
        assert_eq!(
            details,
            ActionDetails::AddNode {
                cell_value: Some("Decision?".to_string()),
                width: Some(120.0),
                height: Some(80.0),
            }
        );
    }

    #[test]
    fn test_move_computes_euclidean_distance() {
        let event = SurfaceEvent::ElementMoved {
            id: "cell-2".to_string(),
            style: "shape=rect;process".to_string(),
            value: None,
            x: 100.0,
            y: 200.0,
            dx: 3.0,
            dy: 4.0,
        };
        let (_, _, position, details) = event.into_parts();
        assert_eq!(position.unwrap().dx, Some(3.0));
        match details {
            ActionDetails::MoveNode { move_distance, .. } => {
                assert!((move_distance - 5.0).abs() < f64::EPSILON);
            }
            other => panic!("expected move details, got {other:?}"),
        }
    }

    #[test]
    fn test_removed_edge_is_a_connection() {
        let event = SurfaceEvent::ElementRemoved {
            id: "edge-1".to_string(),
            style: "edgeStyle=orthogonal".to_string(),
            is_vertex: false,
            value: None,
        };
        let (_, element_type, _, _) = event.into_parts();
        assert_eq!(element_type, Some(ElementType::Connection));
    }

    #[test]
    fn test_connection_carries_endpoints() {
        let event = SurfaceEvent::ConnectionMade {
            id: "edge-2".to_string(),
            source: Some("cell-1".to_string()),
            target: Some("cell-2".to_string()),
            value: None,
        };
        let (_, element_type, position, details) = event.into_parts();
        assert_eq!(element_type, Some(ElementType::Connection));
        assert_eq!(position, None);
        assert_eq!(
            details,
            ActionDetails::ConnectNodes {
                source: Some("cell-1".to_string()),
                target: Some("cell-2".to_string()),
                cell_value: None,
            }
        );
    }
}
