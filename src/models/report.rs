//! Report parsing: one structured record per event row.
//!
//! Report columns are only loosely fixed, so extraction is
//! positional-with-heuristics over whitespace-delimited tokens rather than
//! byte-offset slicing. A line is an event row iff it starts with a 4-digit
//! year, a 3-letter month and a 1-2 digit day; everything else is skipped
//! silently. Rows that match the shape but fail structurally (short tail,
//! bad numbers, impossible dates) become bounded per-line issues and never
//! abort the batch.

use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::event::Event;

/// Star-catalog prefixes that anchor the occulted-star designation.
const STAR_PREFIXES: [&str; 8] = [
    "UCAC4", "UCAC5", "TYC", "Gaia", "2MASS", "HIP", "GSC", "PPMXL",
];

/// Per-line failures recorded beyond this count are tallied but not kept.
pub const MAX_RECORDED_ISSUES: usize = 10;

static EVENT_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{4}\s+[A-Za-z]{3}\s+\d{1,2}\b").expect("valid regex"));
static PROB_TOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+%$").expect("valid regex"));
static INT_TOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid regex"));
static FLOAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]*\.?[0-9]+)").expect("valid regex"));
static DATE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})(\d{2})(\d{2})").expect("valid regex"));

/// Longest leading numeric prefix of a token, ignoring trailing unit
/// markers ("2.3s" → 2.3). Tokens with no numeric prefix yield NaN.
pub fn float_prefix(s: &str) -> f64 {
    FLOAT_PREFIX
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(f64::NAN)
}

/// Raw structured record extracted from one event row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLine {
    pub year: i32,
    pub month: String,
    pub day: u32,
    pub hour: u32,
    /// Fractional minute as printed in the UT column.
    pub minute: f64,
    pub dur_token: String,
    pub dur: f64,
    pub mag_token: String,
    pub mag: f64,
    pub mag_drop: f64,
    /// Occulted-star designation, empty when no anchor was found.
    pub star: String,
    /// Asteroid designation span, empty when it could not be located.
    pub asteroid: String,
    pub alt: Option<i32>,
    pub az: Option<i32>,
    /// Raw percentage (0-100 scale), NaN when no probability token exists.
    pub prob: f64,
    pub ra: String,
    pub dec: String,
}

/// One recoverable per-line parse failure.
#[derive(Debug, Clone, Serialize)]
pub struct ParseIssue {
    /// 1-based line number in the report.
    pub line: usize,
    pub reason: String,
    pub text: String,
}

/// Result of parsing a whole report.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// Successfully extracted events, in file order.
    pub events: Vec<Event>,
    /// Recorded per-line failures, capped at [`MAX_RECORDED_ISSUES`].
    pub issues: Vec<ParseIssue>,
    /// Total count of failed lines, including unrecorded ones.
    pub failed_lines: usize,
    /// SHA-256 of the raw report bytes, hex encoded.
    pub checksum: String,
}

/// Split off the trailing RA/Dec tail.
///
/// A single trailing pure-digit token (a catalog id) is stripped first.
/// If the fourth-from-last remaining token is a lone sign, the Dec degree
/// field is split across two tokens and the tail is seven tokens long;
/// otherwise it is the plain six-token form.
fn split_radec_tail<'a, 'b>(tokens: &'a [&'b str]) -> Result<(&'a [&'b str], String, String)> {
    let mut t = tokens;
    if let Some(last) = t.last() {
        if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
            t = &t[..t.len() - 1];
        }
    }
    let n = t.len();
    if n >= 7 && (t[n - 4] == "-" || t[n - 4] == "+") {
        let ra = format!("{} {} {}", t[n - 7], t[n - 6], t[n - 5]);
        let dec = format!("{}{} {} {}", t[n - 4], t[n - 3], t[n - 2], t[n - 1]);
        Ok((&t[..n - 7], ra, dec))
    } else if n >= 6 {
        let ra = format!("{} {} {}", t[n - 6], t[n - 5], t[n - 4]);
        let dec = format!("{} {} {}", t[n - 3], t[n - 2], t[n - 1]);
        Ok((&t[..n - 6], ra, dec))
    } else {
        bail!("too few tokens for an RA/Dec tail ({})", n);
    }
}

/// Locate the altitude/azimuth pair: scanning right to left, two
/// consecutive integer tokens with alt in [-90,90] and az in [0,360],
/// immediately followed by a token that parses as a float (the angular
/// separation column). The trailing float is what distinguishes a real
/// alt/az pair from incidental small integers elsewhere in the row.
fn find_altaz_index(tokens: &[&str]) -> Option<usize> {
    if tokens.len() < 3 {
        return None;
    }
    for i in (0..=tokens.len() - 3).rev() {
        if !INT_TOK.is_match(tokens[i]) || !INT_TOK.is_match(tokens[i + 1]) {
            continue;
        }
        let Ok(alt) = tokens[i].parse::<i32>() else {
            continue;
        };
        let Ok(az) = tokens[i + 1].parse::<i32>() else {
            continue;
        };
        if (-90..=90).contains(&alt)
            && (0..=360).contains(&az)
            && tokens[i + 2].parse::<f64>().is_ok()
        {
            return Some(i);
        }
    }
    None
}

/// Right-most `<digits>%` token, as a raw percentage. NaN when absent.
fn find_probability(tokens: &[&str]) -> f64 {
    for tok in tokens.iter().rev() {
        if PROB_TOK.is_match(tok) {
            return tok
                .trim_end_matches('%')
                .parse()
                .unwrap_or(f64::NAN);
        }
    }
    f64::NAN
}

/// Occulted-star anchor: a known catalog prefix plus its number, or a
/// compact J2000 designation (`J…` containing a sign). Returns the
/// designation and the index just past it.
fn find_star_anchor(tokens: &[&str]) -> (String, Option<usize>) {
    for (i, tok) in tokens.iter().enumerate() {
        if STAR_PREFIXES.contains(tok) && i + 1 < tokens.len() {
            return (format!("{} {}", tok, tokens[i + 1]), Some(i + 2));
        }
    }
    for (i, tok) in tokens.iter().enumerate() {
        if tok.starts_with('J') && (tok.contains('+') || tok.contains('-')) {
            return (tok.to_string(), Some(i + 1));
        }
    }
    (String::new(), None)
}

/// Asteroid designation: the token span between the star anchor (after
/// skipping single-letter continuation tokens and one separator column)
/// and the alt/az pair. Empty when either boundary is missing or the span
/// is inverted.
fn find_asteroid(tokens: &[&str]) -> String {
    let Some(alt_i) = find_altaz_index(tokens) else {
        return String::new();
    };
    let (_, Some(mut j)) = find_star_anchor(tokens) else {
        return String::new();
    };
    while j < tokens.len() && tokens[j].len() == 1 && tokens[j].chars().all(|c| c.is_alphabetic())
    {
        j += 1;
    }
    if j + 1 >= alt_i {
        return String::new();
    }
    tokens[j + 1..alt_i].join(" ")
}

/// Parse one report line.
///
/// Returns `Ok(None)` when the line does not have the event-row shape,
/// `Err` when it does but its columns cannot be extracted.
pub fn parse_event_line(line: &str) -> Result<Option<ParsedLine>> {
    if !EVENT_ROW.is_match(line) {
        return Ok(None);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (core, ra, dec) = split_radec_tail(&tokens)?;

    let field = |i: usize, name: &str| {
        core.get(i)
            .copied()
            .with_context(|| format!("missing {} column", name))
    };

    let year: i32 = field(0, "year")?.parse().context("bad year")?;
    let month = field(1, "month")?.to_string();
    let day: u32 = field(2, "day")?.parse().context("bad day")?;
    let hour: u32 = field(3, "hour")?.parse().context("bad hour")?;
    let minute: f64 = field(4, "minute")?.parse().context("bad minute")?;
    let dur_token = field(7, "duration")?.to_string();
    let dur = float_prefix(&dur_token);
    let mag_token = field(9, "magnitude")?.to_string();
    let mag: f64 = mag_token.parse().context("bad star magnitude")?;
    let mag_drop = float_prefix(field(10, "magnitude drop")?);

    let (star, _) = find_star_anchor(core);
    let asteroid = find_asteroid(core);
    let alt_i = find_altaz_index(core);
    let alt = alt_i.and_then(|i| core[i].parse().ok());
    let az = alt_i.and_then(|i| core[i + 1].parse().ok());
    let prob = find_probability(core);

    Ok(Some(ParsedLine {
        year,
        month,
        day,
        hour,
        minute,
        dur_token,
        dur,
        mag_token,
        mag,
        mag_drop,
        star,
        asteroid,
        alt,
        az,
        prob,
        ra,
        dec,
    }))
}

/// Parse a whole report: every non-empty line is considered, failures are
/// contained per line, and the outcome carries the raw-report checksum for
/// run identification.
pub fn parse_report(text: &str) -> ParseOutcome {
    let checksum = report_checksum(text);
    let mut events = Vec::new();
    let mut issues: Vec<ParseIssue> = Vec::new();
    let mut failed_lines = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let result = parse_event_line(raw).and_then(|parsed| match parsed {
            Some(parsed) => Event::from_parsed(&parsed).map(Some),
            None => Ok(None),
        });
        match result {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(err) => {
                failed_lines += 1;
                if issues.len() < MAX_RECORDED_ISSUES {
                    log::warn!("skipping report line {}: {:#}", line_no, err);
                    issues.push(ParseIssue {
                        line: line_no,
                        reason: format!("{:#}", err),
                        text: raw.to_string(),
                    });
                }
            }
        }
    }

    ParseOutcome {
        events,
        issues,
        failed_lines,
        checksum,
    }
}

/// SHA-256 of the raw report text, hex encoded.
pub fn report_checksum(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Day-of-month from the first 8-digit `YYYYMMDD` run in a filename.
pub fn infer_day_from_filename(name: &str) -> Option<u32> {
    DATE_RUN
        .captures(name)
        .and_then(|c| c.get(3))
        .and_then(|m| m.as_str().parse().ok())
}
