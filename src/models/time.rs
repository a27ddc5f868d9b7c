//! Wall-clock arithmetic for derived observing times.
//!
//! The derived times (slew start, mid-point check, live-capture start) are
//! built by adding or subtracting fixed offsets from the predicted event
//! time and normalizing with standard 60-unit carry/borrow. Borrowing below
//! hour 0 wraps to hour 23 of the same night; no calendar-day change is
//! modeled (same-night convention, see DESIGN.md).

use serde::Serialize;

/// A wall-clock time of day, always normalized to hour∈[0,23],
/// minute∈[0,59], second∈[0,59].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl ClockTime {
    /// Build a clock time from possibly out-of-range components, carrying
    /// seconds into minutes, minutes into hours, and wrapping hours into
    /// [0,24).
    pub fn normalized(hour: i32, minute: i32, second: i32) -> Self {
        let (mut h, mut m, mut s) = (hour, minute, second);
        while s >= 60 {
            s -= 60;
            m += 1;
        }
        while s < 0 {
            s += 60;
            m -= 1;
        }
        while m >= 60 {
            m -= 60;
            h += 1;
        }
        while m < 0 {
            m += 60;
            h -= 1;
        }
        h = h.rem_euclid(24);
        Self {
            hour: h,
            minute: m,
            second: s,
        }
    }

    /// The time as a fractional hour, used for inter-event spacing
    /// comparisons (seconds are not included, matching the emitter's
    /// spacing rule).
    pub fn fractional_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Month number (1-12) for a three-letter English month abbreviation, as
/// used by the report's date column.
pub fn month_number(name: &str) -> Option<u32> {
    match name {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_components_unchanged() {
        let t = ClockTime::normalized(3, 12, 18);
        assert_eq!((t.hour, t.minute, t.second), (3, 12, 18));
    }

    #[test]
    fn test_second_carry_into_minute() {
        // minute-1 / second+30 offset on an event at mm:45
        let t = ClockTime::normalized(3, 11, 75);
        assert_eq!((t.hour, t.minute, t.second), (3, 12, 15));
    }

    #[test]
    fn test_minute_borrow_into_hour() {
        let t = ClockTime::normalized(3, -5, 10);
        assert_eq!((t.hour, t.minute, t.second), (2, 55, 10));
    }

    #[test]
    fn test_hour_borrow_wraps_to_same_night_evening() {
        // event at 00:03, slew start is minute-8
        let t = ClockTime::normalized(0, -5, 0);
        assert_eq!((t.hour, t.minute, t.second), (23, 55, 0));
    }

    #[test]
    fn test_hour_overflow_wraps_down() {
        let t = ClockTime::normalized(23, 59, 90);
        assert_eq!((t.hour, t.minute, t.second), (0, 0, 30));
    }

    #[test]
    fn test_all_components_in_range_for_arbitrary_inputs() {
        for minute in -10..70 {
            for second in -5..125 {
                let t = ClockTime::normalized(5, minute, second);
                assert!((0..24).contains(&t.hour), "hour out of range: {:?}", t);
                assert!((0..60).contains(&t.minute), "minute out of range: {:?}", t);
                assert!((0..60).contains(&t.second), "second out of range: {:?}", t);
            }
        }
    }

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(ClockTime::normalized(3, 4, 5).to_string(), "03:04:05");
    }

    #[test]
    fn test_fractional_hour() {
        let t = ClockTime::normalized(23, 57, 12);
        assert!((t.fractional_hour() - 23.95).abs() < 1e-12);
    }

    #[test]
    fn test_month_number_known_and_unknown() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number("Dec"), Some(12));
        assert_eq!(month_number("Foo"), None);
        // case matters: the report always uses title case
        assert_eq!(month_number("jan"), None);
    }
}
