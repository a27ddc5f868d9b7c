//! Reviewable event store.
//!
//! Every record gets a stable identifier and an explicit inclusion flag.
//! The telescope filter sets the initial flags; the operator review step
//! flips them. Moving a record between the accepted and rejected lists is
//! a pure state transition, never a destructive removal, so any decision
//! can be reversed before emission.

use std::collections::HashSet;

use serde::Serialize;

use crate::api::EventId;
use crate::models::event::Event;
use crate::services::telescope::Telescope;

/// One stored record: the event plus its review state.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    pub id: EventId,
    pub accepted: bool,
    pub event: Event,
}

/// The event list under review, sorted ascending by instant.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    entries: Vec<StoredEvent>,
}

impl EventStore {
    /// Build a store from parsed events. Entries are time-sorted (stable,
    /// so ties keep file order), ids assigned in that order, and initial
    /// acceptance taken from the telescope profile.
    pub fn from_events(mut events: Vec<Event>, telescope: Telescope) -> Self {
        events.sort_by_key(|ev| ev.instant);
        let entries = events
            .into_iter()
            .enumerate()
            .map(|(i, event)| StoredEvent {
                id: EventId::new(i as u32),
                accepted: telescope.accepts(&event),
                event,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StoredEvent] {
        &self.entries
    }

    /// Flip one record's inclusion flag. Returns false when the id is
    /// unknown.
    pub fn set_accepted(&mut self, id: EventId, accepted: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.accepted = accepted;
                true
            }
            None => false,
        }
    }

    /// Re-run a telescope profile's rules over every record, replacing the
    /// current flags.
    pub fn reapply_filter(&mut self, telescope: Telescope) {
        for entry in &mut self.entries {
            entry.accepted = telescope.accepts(&entry.event);
        }
    }

    /// Reject every record whose asteroid id is in the exclusion set.
    /// Returns the number of records that changed state.
    pub fn reject_asteroids(&mut self, ids: &HashSet<String>) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            if entry.accepted && ids.contains(&entry.event.asteroid_id) {
                entry.accepted = false;
                changed += 1;
            }
        }
        changed
    }

    /// The accepted events in time order, ready for emission.
    pub fn accepted_events(&self) -> Vec<Event> {
        self.entries
            .iter()
            .filter(|e| e.accepted)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Currently rejected records, for review listings.
    pub fn rejected(&self) -> Vec<&StoredEvent> {
        self.entries.iter().filter(|e| !e.accepted).collect()
    }
}

/// Parse the operator's exclusion reply: a comma or space separated list
/// of asteroid ids, where `"0"` or an empty reply excludes nothing.
pub fn parse_exclusion_list(input: &str) -> HashSet<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return HashSet::new();
    }
    trimmed
        .replace(' ', ",")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::parse_event_line;

    fn event(hour: u32, minute: f64, asteroid: &str, mag: f64, dur: f64) -> Event {
        let row = format!(
            "2025 Jan 17  {} {}  0.8  30  {}s  11  {}  0.7  UCAC4 410-052654  57  {} Haul   42 156  1.2  18%   3 12 45.6  -3 24 17.9",
            hour, minute, dur, mag, asteroid
        );
        let parsed = parse_event_line(&row).unwrap().unwrap();
        Event::from_parsed(&parsed).unwrap()
    }

    fn sample_store() -> EventStore {
        let events = vec![
            event(4, 30.0, "(77)", 12.4, 2.3),
            event(2, 10.0, "(55)", 12.4, 2.3),
            // c11 rejects this one: mag 15.2, dur 0.5
            event(3, 20.0, "(66)", 15.2, 0.5),
        ];
        EventStore::from_events(events, Telescope::C11)
    }

    #[test]
    fn test_entries_are_time_sorted_with_stable_ids() {
        let store = sample_store();
        let hours: Vec<u32> = store.entries().iter().map(|e| e.event.hour).collect();
        assert_eq!(hours, vec![2, 3, 4]);
        let ids: Vec<u32> = store.entries().iter().map(|e| e.id.value()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_initial_acceptance_comes_from_telescope() {
        let store = sample_store();
        let accepted: Vec<bool> = store.entries().iter().map(|e| e.accepted).collect();
        assert_eq!(accepted, vec![true, false, true]);
        assert_eq!(store.accepted_events().len(), 2);
        assert_eq!(store.rejected().len(), 1);
    }

    #[test]
    fn test_transitions_are_reversible() {
        let mut store = sample_store();
        let id = store.entries()[1].id;
        assert!(store.set_accepted(id, true));
        assert_eq!(store.accepted_events().len(), 3);
        assert!(store.set_accepted(id, false));
        assert_eq!(store.accepted_events().len(), 2);
        // nothing was ever removed
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let mut store = sample_store();
        assert!(!store.set_accepted(EventId::new(99), true));
    }

    #[test]
    fn test_reject_asteroids_marks_without_removing() {
        let mut store = sample_store();
        let ids: HashSet<String> = ["(55)".to_string()].into_iter().collect();
        assert_eq!(store.reject_asteroids(&ids), 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.accepted_events().len(), 1);
        // repeating is a no-op
        assert_eq!(store.reject_asteroids(&ids), 0);
    }

    #[test]
    fn test_reapply_filter_restores_profile_flags() {
        let mut store = sample_store();
        let id = store.entries()[0].id;
        store.set_accepted(id, false);
        store.reapply_filter(Telescope::C14);
        // c14 accepts all three sample events
        assert_eq!(store.accepted_events().len(), 3);
    }

    #[test]
    fn test_accepted_events_in_time_order() {
        let store = sample_store();
        let events = store.accepted_events();
        assert!(events.windows(2).all(|w| w[0].instant <= w[1].instant));
    }

    #[test]
    fn test_parse_exclusion_list_sentinels() {
        assert!(parse_exclusion_list("0").is_empty());
        assert!(parse_exclusion_list("").is_empty());
        assert!(parse_exclusion_list("  ").is_empty());
    }

    #[test]
    fn test_parse_exclusion_list_separators() {
        let commas = parse_exclusion_list("(55), (66)");
        assert_eq!(commas.len(), 2);
        assert!(commas.contains("(55)") && commas.contains("(66)"));
        let spaces = parse_exclusion_list("(55) (66)");
        assert_eq!(spaces, commas);
    }
}
