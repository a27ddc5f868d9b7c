//! Telescope acceptance profiles.
//!
//! Each profile carries an ordered table of reject rules; an event is
//! rejected when any rule matches (magnitude at or above the rule's
//! threshold AND duration below it). Both the batch filter and the review
//! store consult these tables, so the thresholds live in exactly one
//! place. Adding a telescope means adding a variant and its table, nothing
//! else.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ScriptGenError;
use crate::models::event::Event;

/// One reject rule: events with `mag >= mag_min` and `dur < dur_max` are
/// below the telescope's detectability threshold.
#[derive(Debug, Clone, Copy)]
pub struct RejectRule {
    pub mag_min: f64,
    pub dur_max: f64,
}

/// Known telescope profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Telescope {
    C11,
    C14,
    Hubble24,
}

impl Telescope {
    pub const ALL: [Telescope; 3] = [Telescope::C11, Telescope::C14, Telescope::Hubble24];

    pub fn name(&self) -> &'static str {
        match self {
            Telescope::C11 => "c11",
            Telescope::C14 => "c14",
            Telescope::Hubble24 => "hubble24",
        }
    }

    /// The profile's reject-rule table, evaluated as a logical OR.
    pub fn reject_rules(&self) -> &'static [RejectRule] {
        match self {
            Telescope::C11 => &[
                RejectRule {
                    mag_min: 15.0,
                    dur_max: 1.0,
                },
                RejectRule {
                    mag_min: 14.5,
                    dur_max: 0.3,
                },
            ],
            Telescope::C14 => &[RejectRule {
                mag_min: 15.5,
                dur_max: 1.0,
            }],
            Telescope::Hubble24 => &[RejectRule {
                mag_min: 16.0,
                dur_max: 1.0,
            }],
        }
    }

    /// Whether this telescope can usefully attempt the given event.
    pub fn accepts(&self, event: &Event) -> bool {
        !self
            .reject_rules()
            .iter()
            .any(|rule| event.mag >= rule.mag_min && event.dur < rule.dur_max)
    }
}

impl std::fmt::Display for Telescope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Telescope {
    type Err = ScriptGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c11" => Ok(Telescope::C11),
            "c14" => Ok(Telescope::C14),
            "hubble24" => Ok(Telescope::Hubble24),
            other => Err(ScriptGenError::UnknownTelescope(other.to_string())),
        }
    }
}
