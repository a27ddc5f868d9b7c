//! Observing-night membership.
//!
//! Night `D` spans from the evening of calendar day `D-1` through the
//! early morning of day `D` in UTC, pivoting at 16:00 UTC. No timezone
//! conversion is performed; the pivot is a fixed hour.

use crate::models::event::Event;

/// Hour at which one observing night hands over to the next.
const NIGHT_PIVOT_HOUR: u32 = 16;

/// Whether an event belongs to the observing night of day-of-month `day`.
/// Events at exactly the pivot hour fall on neither side.
pub fn in_night_window(event: &Event, day: u32) -> bool {
    (event.day == day && event.hour < NIGHT_PIVOT_HOUR)
        || (i64::from(event.day) == i64::from(day) - 1 && event.hour > NIGHT_PIVOT_HOUR)
}

/// Keep only the events of the requested observing night.
pub fn filter_night(events: Vec<Event>, day: u32) -> Vec<Event> {
    events
        .into_iter()
        .filter(|ev| in_night_window(ev, day))
        .collect()
}
