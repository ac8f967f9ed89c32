//! Contention grouping: the sorted interval-merge sweep.
//!
//! Needs are sorted by (capability, start time) and swept once: a need
//! joins the running group when it requests the same capability and its
//! start falls within the group's `[start, end]` envelope (inclusive);
//! the envelope end stretches to the latest end seen. Anything else
//! opens a new group.
//!
//! Groups are plain value objects so the arbitration order stays
//! deterministic and testable in isolation -- no store involvement.

use chrono::{DateTime, Utc};
use tacsim_types::{CapabilityType, SpaceNeed};

/// A set of needs whose capability and time windows overlap.
///
/// Size-1 groups are uncontended; larger groups require priority
/// arbitration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentionGroup {
    /// The capability every member requests.
    pub capability: CapabilityType,
    /// Envelope start (earliest member start).
    pub window_start: DateTime<Utc>,
    /// Envelope end (latest member end).
    pub window_end: DateTime<Utc>,
    /// Members in sweep order.
    pub needs: Vec<SpaceNeed>,
}

/// Sweep a day's needs into contention groups.
///
/// Input order does not matter; the sweep sorts by
/// (capability, start time, need ID) first, so grouping is fully
/// deterministic.
pub fn group_needs(needs: &[SpaceNeed]) -> Vec<ContentionGroup> {
    let mut sorted: Vec<&SpaceNeed> = needs.iter().collect();
    sorted.sort_by_key(|n| (n.capability, n.start_time, n.id));

    let mut groups: Vec<ContentionGroup> = Vec::new();
    for need in sorted {
        match groups.last_mut() {
            Some(group)
                if group.capability == need.capability
                    && need.start_time <= group.window_end =>
            {
                group.window_end = group.window_end.max(need.end_time);
                group.needs.push(need.clone());
            }
            _ => groups.push(ContentionGroup {
                capability: need.capability,
                window_start: need.start_time,
                window_end: need.end_time,
                needs: vec![need.clone()],
            }),
        }
    }

    groups
}
