//! Metric computation over an ordered event log
//!
//! A metrics snapshot is a pure function of the event list at computation
//! time. Each aggregation cycle recomputes it wholesale; nothing is patched
//! incrementally, so there is no carry-over state to get wrong.

use crate::types::{ActionEvent, ActionType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Derived, point-in-time summary of a session's event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Seconds from the first to the last event
    pub total_time_sec: i64,
    pub total_actions: u32,
    /// Corrective events: label edits plus deletions
    pub revision_count: u32,
    pub action_breakdown: HashMap<ActionType, u32>,
    /// Seconds between the first and second event
    pub planning_time_sec: i64,
    /// Net-additions percentage, negative when deletions exceed additions
    pub efficiency: i64,
    /// Percentage of events that are corrective
    pub revision_rate: i64,
    pub avg_time_between_actions_sec: i64,
    /// Distinct action types observed
    pub action_types_used: u32,
}

/// Compute a snapshot from an event list ascending by timestamp.
///
/// An empty list yields the all-zero snapshot with an empty breakdown.
pub fn compute(events: &[ActionEvent]) -> MetricsSnapshot {
    if events.is_empty() {
        return MetricsSnapshot::default();
    }

    let total_actions = events.len() as u32;

    let mut action_breakdown: HashMap<ActionType, u32> = HashMap::new();
    for event in events {
        *action_breakdown.entry(event.action_type).or_insert(0) += 1;
    }

    let count = |t: ActionType| action_breakdown.get(&t).copied().unwrap_or(0);
    let revision_count = count(ActionType::EditLabel) + count(ActionType::DeleteNode);

    let first = events[0].timestamp;
    let last = events[events.len() - 1].timestamp;
    let total_time_sec = round_ms_to_sec((last - first).num_milliseconds());

    let action_types_used = events
        .iter()
        .map(|e| e.action_type)
        .collect::<HashSet<_>>()
        .len() as u32;

    MetricsSnapshot {
        total_time_sec,
        total_actions,
        revision_count,
        planning_time_sec: planning_time_sec(events),
        efficiency: efficiency(count(ActionType::AddNode), count(ActionType::DeleteNode)),
        revision_rate: round_percent(revision_count, total_actions),
        avg_time_between_actions_sec: avg_time_between_actions_sec(events),
        action_types_used,
        action_breakdown,
    }
}

/// Seconds between the first and *second* event.
///
/// Models time spent thinking before the first real move. The one-off
/// definition (second event, not first) is deliberate and must not be
/// "fixed" to the gap before the first event.
fn planning_time_sec(events: &[ActionEvent]) -> i64 {
    if events.len() < 2 {
        return 0;
    }
    round_ms_to_sec((events[1].timestamp - events[0].timestamp).num_milliseconds())
}

/// Net-additions percentage: `100 * (adds - deletes) / adds`, 0 when no
/// nodes were added. Negative when deletions exceed additions.
fn efficiency(adds: u32, deletes: u32) -> i64 {
    if adds == 0 {
        return 0;
    }
    let net = f64::from(adds) - f64::from(deletes);
    (net / f64::from(adds) * 100.0).round() as i64
}

/// Mean of consecutive timestamp deltas, rounded to whole seconds.
fn avg_time_between_actions_sec(events: &[ActionEvent]) -> i64 {
    if events.len() < 2 {
        return 0;
    }
    let total_ms: i64 = events
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_milliseconds())
        .sum();
    let mean_ms = total_ms as f64 / (events.len() - 1) as f64;
    (mean_ms / 1000.0).round() as i64
}

/// Round-half-away-from-zero on a milliseconds value, in seconds
fn round_ms_to_sec(ms: i64) -> i64 {
    (ms as f64 / 1000.0).round() as i64
}

fn round_percent(numerator: u32, denominator: u32) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (f64::from(numerator) / f64::from(denominator) * 100.0).round() as i64
}
