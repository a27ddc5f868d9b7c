//! Event records and the derived-field calculator.
//!
//! An [`Event`] is built once from a parsed report line, gets its derived
//! observing-window times and exposure parameters computed here, and is
//! immutable afterwards. The calculator is pure: no I/O, fully
//! deterministic.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::report::ParsedLine;
use super::time::{month_number, ClockTime};

/// Exposure step table keyed by star magnitude. Thresholds ascend and the
/// last threshold the magnitude exceeds wins, so the table is a step
/// function evaluated in order.
const EXPOSURE_STEPS: [(f64, f64); 17] = [
    (9.0, 0.015),
    (9.5, 0.020),
    (10.0, 0.025),
    (11.4, 0.030),
    (11.9, 0.040),
    (12.4, 0.050),
    (12.9, 0.075),
    (13.2, 0.100),
    (13.5, 0.150),
    (14.0, 0.200),
    (14.2, 0.225),
    (14.4, 0.275),
    (14.6, 0.300),
    (14.8, 0.325),
    (15.0, 0.375),
    (15.2, 0.425),
    (15.4, 0.500),
];

/// Exposure below the first threshold (very bright stars).
const EXPOSURE_FLOOR: f64 = 0.0067;

/// Camera exposure time in seconds for a star of the given magnitude,
/// before clamping against the event duration.
pub fn exposure_for_mag(mag: f64) -> f64 {
    let mut inttime = EXPOSURE_FLOOR;
    for (threshold, exposure) in EXPOSURE_STEPS {
        if mag > threshold {
            inttime = exposure;
        }
    }
    inttime
}

/// One predicted occultation event with its derived observing fields.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// First token of the target string, used by the operator to name
    /// events when excluding them.
    pub asteroid_id: String,
    pub year: i32,
    pub month: String,
    pub day: u32,
    /// "YYYY Mon DD" as shown in review listings.
    pub date_str: String,
    pub hour: u32,
    /// Fractional minute as it appears in the report's UT column.
    pub minute: f64,
    pub min_int: u32,
    pub sec: u32,
    /// Predicted mid-event instant as "HH:MM:SS".
    pub time: String,
    /// Combined instant used for ordering and gap arithmetic.
    pub instant: NaiveDateTime,
    /// Event duration in seconds.
    pub dur: f64,
    pub dur_token: String,
    pub mag: f64,
    pub mag_token: String,
    pub mag_drop: f64,
    /// "hh mm ss ±dd mm ss" slew target.
    pub radec: String,
    /// Altitude/azimuth, each right-aligned to width 3.
    pub altaz: String,
    pub target: String,
    pub occulted_star: String,
    /// Probability as a raw percentage on the 0-100 scale.
    pub prob: f64,
    /// Exposure ceiling: a quarter of the event duration.
    pub maxint: f64,
    /// Chosen exposure length, never above `maxint`.
    pub inttime: f64,
    /// Frame count for a 60 s capture at `inttime`.
    pub nsamp: i64,
    /// Slew start: minute-8, seconds unchanged.
    pub sttime: ClockTime,
    /// Mid-point check: minute-2, second+30.
    pub mttime: ClockTime,
    /// Live-capture start: minute-1, second+30.
    pub lstime: ClockTime,
    /// Slew start as a fractional hour, for inter-event spacing.
    pub stime: f64,
    pub lshour: i32,
    pub lsmin: i32,
}

impl Event {
    /// Build an event from a parsed report line, computing all derived
    /// fields.
    ///
    /// Fails when the date or time columns do not form a valid calendar
    /// instant; such failures stay inside the parser's per-line issue
    /// handling.
    pub fn from_parsed(parsed: &ParsedLine) -> Result<Self> {
        let min_int = parsed.minute as u32;
        let sec = ((parsed.minute - min_int as f64) * 60.0) as u32;

        let month_num = month_number(&parsed.month)
            .with_context(|| format!("unknown month abbreviation '{}'", parsed.month))?;
        let instant = NaiveDate::from_ymd_opt(parsed.year, month_num, parsed.day)
            .with_context(|| {
                format!(
                    "invalid date {} {} {}",
                    parsed.year, parsed.month, parsed.day
                )
            })?
            .and_hms_opt(parsed.hour, min_int, sec)
            .with_context(|| format!("invalid time {}:{}", parsed.hour, parsed.minute))?;

        let (hour, minute, second) = (parsed.hour as i32, min_int as i32, sec as i32);
        let lstime = ClockTime::normalized(hour, minute - 1, second + 30);
        let mttime = ClockTime::normalized(hour, minute - 2, second + 30);
        let sttime = ClockTime::normalized(hour, minute - 8, second);
        let stime = sttime.fractional_hour();

        let maxint = parsed.dur / 4.0;
        let mut inttime = exposure_for_mag(parsed.mag);
        if inttime > maxint {
            inttime = maxint;
        }
        let nsamp = if inttime > 0.0 {
            (60.0 / inttime) as i64
        } else {
            0
        };

        let target = parsed.asteroid.clone();
        let asteroid_id = target
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Event {
            asteroid_id,
            year: parsed.year,
            month: parsed.month.clone(),
            day: parsed.day,
            date_str: format!("{} {} {:02}", parsed.year, parsed.month, parsed.day),
            hour: parsed.hour,
            minute: parsed.minute,
            min_int,
            sec,
            time: format!("{:02}:{:02}:{:02}", parsed.hour, min_int, sec),
            instant,
            dur: parsed.dur,
            dur_token: parsed.dur_token.clone(),
            mag: parsed.mag,
            mag_token: parsed.mag_token.clone(),
            mag_drop: parsed.mag_drop,
            radec: format!("{} {}", parsed.ra, parsed.dec),
            altaz: format!(
                "{:>3} {:>3}",
                parsed.alt.unwrap_or(0),
                parsed.az.unwrap_or(0)
            ),
            target,
            occulted_star: parsed.star.clone(),
            prob: parsed.prob,
            maxint,
            inttime,
            nsamp,
            sttime,
            mttime,
            lstime,
            stime,
            lshour: lstime.hour,
            lsmin: lstime.minute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line() -> ParsedLine {
        ParsedLine {
            year: 2025,
            month: "Jan".to_string(),
            day: 17,
            hour: 3,
            minute: 12.3,
            dur_token: "2.3s".to_string(),
            dur: 2.3,
            mag_token: "12.4".to_string(),
            mag: 12.4,
            mag_drop: 0.7,
            star: "UCAC4 410-052654".to_string(),
            asteroid: "(1862) Apollo".to_string(),
            alt: Some(42),
            az: Some(156),
            prob: 18.0,
            ra: "3 12 45.6".to_string(),
            dec: "-3 24 17.9".to_string(),
        }
    }

    #[test]
    fn test_exposure_floor_below_first_threshold() {
        assert_eq!(exposure_for_mag(8.0), 0.0067);
        // thresholds are strict: exactly 9.0 stays on the floor
        assert_eq!(exposure_for_mag(9.0), 0.0067);
    }

    #[test]
    fn test_exposure_step_values() {
        assert_eq!(exposure_for_mag(9.1), 0.015);
        // exactly on a threshold stays on the previous step
        assert_eq!(exposure_for_mag(12.4), 0.040);
        assert_eq!(exposure_for_mag(12.5), 0.050);
        assert_eq!(exposure_for_mag(13.0), 0.075);
        assert_eq!(exposure_for_mag(15.3), 0.425);
        assert_eq!(exposure_for_mag(16.0), 0.500);
    }

    #[test]
    fn test_derived_windows() {
        let ev = Event::from_parsed(&sample_line()).unwrap();
        assert_eq!(ev.min_int, 12);
        assert_eq!(ev.sec, 18);
        assert_eq!(ev.time, "03:12:18");
        assert_eq!(ev.lstime.to_string(), "03:11:48");
        assert_eq!(ev.mttime.to_string(), "03:10:48");
        assert_eq!(ev.sttime.to_string(), "03:04:18");
        assert!((ev.stime - (3.0 + 4.0 / 60.0)).abs() < 1e-12);
        assert_eq!(ev.lshour, 3);
        assert_eq!(ev.lsmin, 11);
    }

    #[test]
    fn test_midnight_windows_wrap_to_evening() {
        let mut line = sample_line();
        line.hour = 0;
        line.minute = 3.0;
        let ev = Event::from_parsed(&line).unwrap();
        assert_eq!(ev.sttime.to_string(), "23:55:00");
        assert!((ev.stime - (23.0 + 55.0 / 60.0)).abs() < 1e-12);
        assert_eq!(ev.lstime.to_string(), "00:02:30");
        assert_eq!(ev.mttime.to_string(), "00:01:30");
    }

    #[test]
    fn test_exposure_clamped_by_duration() {
        let mut line = sample_line();
        line.mag = 12.0; // table value 0.040
        line.dur = 0.1;
        let ev = Event::from_parsed(&line).unwrap();
        assert!((ev.maxint - 0.025).abs() < 1e-12);
        assert!((ev.inttime - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_inttime_invariant_and_nsamp() {
        for (mag, dur) in [(8.0, 1.0), (11.5, 2.3), (14.3, 0.6), (15.6, 8.0)] {
            let mut line = sample_line();
            line.mag = mag;
            line.dur = dur;
            let ev = Event::from_parsed(&line).unwrap();
            assert!(
                ev.inttime > 0.0 && ev.inttime <= ev.maxint,
                "inttime {} outside (0, {}] for mag {} dur {}",
                ev.inttime,
                ev.maxint,
                mag,
                dur
            );
            assert_eq!(ev.nsamp, (60.0 / ev.inttime) as i64);
        }
    }

    #[test]
    fn test_zero_duration_gives_zero_samples() {
        let mut line = sample_line();
        line.dur = 0.0;
        let ev = Event::from_parsed(&line).unwrap();
        assert_eq!(ev.maxint, 0.0);
        assert_eq!(ev.inttime, 0.0);
        assert_eq!(ev.nsamp, 0);
    }

    #[test]
    fn test_exact_exposure_divides_minute() {
        let mut line = sample_line();
        line.mag = 13.0; // 0.075s
        line.dur = 10.0;
        let ev = Event::from_parsed(&line).unwrap();
        assert_eq!(ev.nsamp, 800);
    }

    #[test]
    fn test_asteroid_id_is_first_target_token() {
        let ev = Event::from_parsed(&sample_line()).unwrap();
        assert_eq!(ev.asteroid_id, "(1862)");
        assert_eq!(ev.target, "(1862) Apollo");
    }

    #[test]
    fn test_altaz_columns_right_aligned() {
        let ev = Event::from_parsed(&sample_line()).unwrap();
        assert_eq!(ev.altaz, " 42 156");
    }

    #[test]
    fn test_unknown_month_is_an_error() {
        let mut line = sample_line();
        line.month = "Foo".to_string();
        assert!(Event::from_parsed(&line).is_err());
    }

    #[test]
    fn test_determinism() {
        let a = Event::from_parsed(&sample_line()).unwrap();
        let b = Event::from_parsed(&sample_line()).unwrap();
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }
}
