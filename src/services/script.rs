//! Script emission: the ordered event list rendered as an `.scs` command
//! script.
//!
//! The output is consumed by observatory automation firmware, so the
//! directive vocabulary, spacing, and numeric formatting are byte-stable:
//! integers render as plain decimal and floating values in
//! 6-significant-digit general form with insignificant trailing zeros
//! trimmed. The whole script is assembled in memory and only then written,
//! so a failing run never leaves a partial file behind.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{ScriptGenError, ScriptGenResult};
use crate::models::event::Event;

/// Spacing sentinel placed before the first event, low enough that the
/// first block always emits its recalibration directive.
const FIRST_EVENT_SENTINEL: f64 = -10.0;

/// Gap (in minutes) since the previous event's adjusted finish beyond
/// which a refocus run is scheduled.
const REFOCUS_GAP_MINUTES: f64 = 20.0;

/// Header and footer text bracketing the generated event blocks.
#[derive(Debug, Clone)]
pub struct ScriptTemplates {
    pub header: String,
    pub footer: String,
}

impl ScriptTemplates {
    /// Load the header and footer files. The header is forced to end with
    /// a newline; the footer is taken verbatim.
    pub fn load(pre_path: &Path, post_path: &Path) -> ScriptGenResult<Self> {
        let mut header = fs::read_to_string(pre_path).map_err(|source| {
            ScriptGenError::TemplateIo {
                role: "header",
                path: pre_path.to_path_buf(),
                source,
            }
        })?;
        if !header.ends_with('\n') {
            header.push('\n');
        }
        let footer =
            fs::read_to_string(post_path).map_err(|source| ScriptGenError::TemplateIo {
                role: "footer",
                path: post_path.to_path_buf(),
                source,
            })?;
        Ok(Self { header, footer })
    }
}

/// Shortest 6-significant-digit general formatting ("%.6g"): trailing
/// zeros and a bare decimal point are trimmed, and magnitudes outside
/// [1e-4, 1e6) switch to exponent notation.
pub fn format_sig6(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let sci = format!("{:.5e}", x);
    let Some(epos) = sci.find('e') else {
        return sci;
    };
    let exp: i32 = sci[epos + 1..].parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        let mantissa = sci[..epos].trim_end_matches('0').trim_end_matches('.');
        format!("{}e{}{:02}", mantissa, if exp < 0 { "-" } else { "+" }, exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, x);
        if fixed.contains('.') {
            fixed
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        } else {
            fixed
        }
    }
}

/// The `#Astrometry coordinates:` comment for an event's RA/Dec string.
fn astrometry_comment(radec: &str) -> String {
    let parts: Vec<&str> = radec.split_whitespace().collect();
    if let [ra_h, ra_m, ra_s, dec_d, dec_m, dec_s] = parts[..] {
        let sign = if dec_d.starts_with('-') { '-' } else { '+' };
        let dec_abs = dec_d.trim_start_matches(['+', '-']);
        format!(
            "#Astrometry coordinates: {}h{}m{}s {}{}d{}m{}s\n",
            ra_h, ra_m, ra_s, sign, dec_abs, dec_m, dec_s
        )
    } else {
        format!("#Astrometry coordinates: {}\n", radec)
    }
}

/// Append one event's command block.
fn write_event_block(out: &mut String, ev: &Event, seq: usize, laststime: f64) {
    let _ = writeln!(
        out,
        "#Start hours  {}  previous:  {}",
        format_sig6(ev.stime),
        format_sig6(laststime)
    );
    let _ = writeln!(out, "# *************** Occultation {} ************", seq);
    out.push_str("#\n");
    let _ = writeln!(
        out,
        "#UT=  {} Dur {} Mv= {} AltAz= {} LocalStart= {} prob= {} Target= {} RA/DEC {} star= {} MagDrop= {}",
        ev.time,
        ev.dur_token,
        ev.mag_token,
        ev.altaz,
        ev.lstime,
        format_sig6(ev.prob),
        ev.target,
        ev.radec,
        ev.occulted_star,
        format_sig6(ev.mag_drop)
    );
    out.push_str(&astrometry_comment(&ev.radec));
    let _ = writeln!(out, "TARGETNAME \" {} \"", ev.target);
    out.push_str("UNLOCK CONTROLS\n");
    out.push_str("MOUNT TRACKING None\n");
    let _ = writeln!(out, "WAIT UNTIL LATER THAN LOCALTIME \" {} \"", ev.sttime);
    out.push_str("IGNORE ERRORS FROM ONERROR RUN \"\"\n");
    out.push_str("MOUNT TRACKING Sidereal\n");
    let _ = writeln!(out, "  MOUNT GOTO \" {} \"", ev.radec);
    out.push_str("END IGNORE ERRORS\n");
    out.push_str("DELAY 2\n");
    out.push_str("#\n");
    if (ev.stime - laststime) * 60.0 > REFOCUS_GAP_MINUTES {
        out.push_str("GOSUB AFOCUS\n");
    }
    out.push_str("GOSUB PLATESOLV\n");
    let _ = writeln!(out, "WAIT UNTIL LATER THAN LOCALTIME \" {} \"", ev.mttime);
    out.push_str("GOSUB PLATESOLV\n");
    out.push_str("SET RESOLUTION TO 800x600\n");
    let _ = writeln!(out, "SET EXPOSURE TO {}", format_sig6(ev.inttime));
    out.push_str("DELAY 3\n");
    out.push_str("DISPLAY STRETCH AUTO\n");
    let _ = writeln!(out, "WAIT UNTIL LATER THAN LOCALTIME \" {} \"", ev.lstime);
    out.push_str("  CAPTURE 60 SECONDS LIVE FRAMES\n");
    out.push_str("SET RESOLUTION TO 1920x1200\n");
    out.push_str("SET EXPOSURE TO 0.5\n");
    out.push_str("DELAY 3\n");
    out.push_str("DISPLAY STRETCH AUTO\n");
    out.push_str("END UNLOCK\n");
}

/// Render the final script: header, one command block per event in time
/// order, footer. Fails when the accepted set is empty.
pub fn render_script(events: &[Event], header: &str, footer: &str) -> ScriptGenResult<String> {
    if events.is_empty() {
        return Err(ScriptGenError::EmptyAcceptedSet);
    }

    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|ev| ev.instant);

    let mut out = String::with_capacity(header.len() + footer.len() + events.len() * 1024);
    out.push_str(header);
    if !out.ends_with('\n') {
        out.push('\n');
    }

    let mut laststime = FIRST_EVENT_SENTINEL;
    for (i, ev) in ordered.iter().enumerate() {
        log::debug!(
            "emitting block {} for {} at {} (inttime {}, {} frames)",
            i + 1,
            ev.target,
            ev.time,
            ev.inttime,
            ev.nsamp
        );
        write_event_block(&mut out, ev, i + 1, laststime);
        laststime = ev.lshour as f64 + (ev.lsmin as f64 + 5.0) / 60.0;
    }

    out.push_str(footer);
    Ok(out)
}

/// Render and write the script in one step; nothing is written when
/// rendering fails.
pub fn write_script(
    events: &[Event],
    templates: &ScriptTemplates,
    out_path: &Path,
) -> ScriptGenResult<()> {
    let script = render_script(events, &templates.header, &templates.footer)?;
    fs::write(out_path, script).map_err(|source| ScriptGenError::OutputIo {
        path: out_path.to_path_buf(),
        source,
    })
}
