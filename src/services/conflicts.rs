//! Conflict detection: chronologically close events flagged for review.
//!
//! Advisory only; groups are reported to the operator and never remove
//! anything from the pipeline.

use crate::models::event::Event;

/// Two consecutive events this close (in seconds) belong to the same
/// conflict group.
pub const CONFLICT_WINDOW_SECS: i64 = 240;

/// Group temporally adjacent events in a list already sorted ascending by
/// instant. A group extends while each consecutive gap is within
/// [`CONFLICT_WINDOW_SECS`]; singletons are dropped. Groups are contiguous
/// runs of the input, so they are returned as subslices.
pub fn conflict_groups(events: &[Event]) -> Vec<&[Event]> {
    let mut groups = Vec::new();
    if events.is_empty() {
        return groups;
    }
    let mut start = 0;
    for i in 1..events.len() {
        let gap = (events[i].instant - events[i - 1].instant).num_seconds();
        if gap > CONFLICT_WINDOW_SECS {
            if i - start >= 2 {
                groups.push(&events[start..i]);
            }
            start = i;
        }
    }
    if events.len() - start >= 2 {
        groups.push(&events[start..]);
    }
    groups
}
