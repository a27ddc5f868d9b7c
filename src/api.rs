//! Public API surface for the script generator.
//!
//! This file consolidates the record identifier types and re-exports the
//! DTO types used across the pipeline.

use serde::{Deserialize, Serialize};

pub use crate::models::event::Event;
pub use crate::models::report::{ParseIssue, ParseOutcome, ParsedLine};
pub use crate::models::time::ClockTime;
pub use crate::services::conflicts::conflict_groups;
pub use crate::services::telescope::Telescope;
pub use crate::store::{EventStore, StoredEvent};

/// Stable per-record identifier assigned by the event store.
///
/// Identifiers survive accept/reject transitions, so the review step can
/// address a record regardless of which list it currently sits in.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId(pub u32);

impl EventId {
    pub fn new(value: u32) -> Self {
        EventId(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventId {
    fn from(v: u32) -> Self {
        EventId(v)
    }
}

impl From<EventId> for u32 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::EventId;

    #[test]
    fn test_event_id_new() {
        let id = EventId::new(7);
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn test_event_id_display() {
        assert_eq!(EventId::new(42).to_string(), "42");
    }

    #[test]
    fn test_event_id_roundtrip_u32() {
        let id: EventId = 5u32.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 5);
    }

    #[test]
    fn test_event_id_ordering() {
        assert!(EventId::new(1) < EventId::new(2));
    }
}
