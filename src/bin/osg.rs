//! OSG command-line binary.
//!
//! Turns an occultation prediction report into a timed `.scs` command
//! script, with an interactive review step between filtering and emission.
//!
//! # Usage
//!
//! ```bash
//! # Generate a script for the night inferred from the filename
//! osg generate 20250117_events.txt c11
//!
//! # Non-interactive batch run keeping every filtered event
//! osg generate 20250117_events.txt c14 --keep -o night.scs
//!
//! # Inspect the parsed, filtered event table as JSON
//! osg dump 20250117_events.txt --telescope c11
//! ```
//!
//! # Environment Variables
//!
//! - `OSG_PRE` / `OSG_POST`: template path overrides
//! - `OSG_TELESCOPE`: default telescope profile
//! - `RUST_LOG`: log level (default: info)

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use osg_rust::api::{Event, Telescope};
use osg_rust::config::RunConfig;
use osg_rust::error::ScriptGenError;
use osg_rust::models::report::{infer_day_from_filename, parse_report};
use osg_rust::services::conflicts::conflict_groups;
use osg_rust::services::night_window::filter_night;
use osg_rust::services::script::{format_sig6, write_script, ScriptTemplates};
use osg_rust::store::{parse_exclusion_list, EventStore};

#[derive(Parser)]
#[command(name = "osg", about = "Occultation .scs script generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .scs command script from an events report
    Generate {
        /// Input events report, typically YYYYMMDD_events.txt
        events: PathBuf,
        /// Telescope profile (c11, c14, hubble24); falls back to the
        /// configured default
        telescope: Option<String>,
        /// Day-of-month of the observing night; inferred from the
        /// filename when omitted
        #[arg(long)]
        day: Option<u32>,
        /// Header template path
        #[arg(long)]
        pre: Option<PathBuf>,
        /// Footer template path
        #[arg(long)]
        post: Option<PathBuf>,
        /// Output script path (default: <YYYYMMDD>_174_script.scs next to
        /// the report)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Configuration file (default: osg.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Asteroid ids to reject, comma or space separated, instead of
        /// prompting
        #[arg(long, conflicts_with = "keep")]
        drop: Option<String>,
        /// Keep every filtered event and skip the prompt
        #[arg(long)]
        keep: bool,
    },
    /// Parse a report and print the reviewable event table as JSON
    Dump {
        /// Input events report
        events: PathBuf,
        /// Telescope profile used for the acceptance flags
        #[arg(long)]
        telescope: Option<String>,
        /// Day-of-month of the observing night; inferred from the
        /// filename when omitted, unfiltered when neither is available
        #[arg(long)]
        day: Option<u32>,
        /// Configuration file (default: osg.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    match Cli::parse().command {
        Commands::Generate {
            events,
            telescope,
            day,
            pre,
            post,
            out,
            config,
            drop,
            keep,
        } => generate(GenerateArgs {
            events,
            telescope,
            day,
            pre,
            post,
            out,
            config,
            drop,
            keep,
        }),
        Commands::Dump {
            events,
            telescope,
            day,
            config,
        } => dump(events, telescope, day, config),
    }
}

struct GenerateArgs {
    events: PathBuf,
    telescope: Option<String>,
    day: Option<u32>,
    pre: Option<PathBuf>,
    post: Option<PathBuf>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    drop: Option<String>,
    keep: bool,
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = RunConfig::load(args.config.as_deref())?;
    let telescope = resolve_telescope(args.telescope.as_deref(), &config, true)?;
    let day = resolve_day(args.day, &args.events)?;
    info!("observing night: day {} / telescope {}", day, telescope);

    let mut store = load_store(&args.events, telescope, Some(day))?;
    let mut accepted = store.accepted_events();

    let groups = conflict_groups(&accepted);
    print_conflicts(&groups);

    let exclusions = if args.keep {
        Default::default()
    } else if let Some(list) = args.drop.as_deref() {
        parse_exclusion_list(list)
    } else {
        prompt_exclusions()?
    };
    if !exclusions.is_empty() {
        let removed = store.reject_asteroids(&exclusions);
        println!("Removed {} events.", removed);
        accepted = store.accepted_events();
    } else {
        println!("No events removed.");
    }

    let pre = args.pre.unwrap_or(config.pre_path);
    let post = args.post.unwrap_or(config.post_path);
    let templates = ScriptTemplates::load(&pre, &post)?;

    let out_path = args
        .out
        .unwrap_or_else(|| default_output_path(&args.events));
    write_script(&accepted, &templates, &out_path)?;
    info!("wrote {} event blocks", accepted.len());
    println!("Script generated: {}", out_path.display());
    Ok(())
}

fn dump(
    events: PathBuf,
    telescope: Option<String>,
    day: Option<u32>,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = RunConfig::load(config.as_deref())?;
    let telescope = resolve_telescope(telescope.as_deref(), &config, false)?;
    let day = day.or_else(|| {
        events
            .file_name()
            .and_then(|n| infer_day_from_filename(&n.to_string_lossy()))
    });

    let store = load_store(&events, telescope, day)?;
    println!("{}", serde_json::to_string_pretty(store.entries())?);
    Ok(())
}

/// Parse the report, apply the night filter when a day is known, and build
/// the reviewable store.
fn load_store(
    report_path: &Path,
    telescope: Telescope,
    day: Option<u32>,
) -> anyhow::Result<EventStore> {
    let text =
        std::fs::read_to_string(report_path).map_err(|source| ScriptGenError::ReportIo {
            path: report_path.to_path_buf(),
            source,
        })?;
    let outcome = parse_report(&text);
    info!(
        "parsed {} events from report (checksum {})",
        outcome.events.len(),
        &outcome.checksum[..12]
    );
    if outcome.failed_lines > 0 {
        warn!(
            "skipped {} malformed report lines ({} recorded)",
            outcome.failed_lines,
            outcome.issues.len()
        );
    }

    let events = match day {
        Some(day) => filter_night(outcome.events, day),
        None => outcome.events,
    };
    Ok(EventStore::from_events(events, telescope))
}

fn resolve_telescope(
    cli: Option<&str>,
    config: &RunConfig,
    required: bool,
) -> anyhow::Result<Telescope> {
    let name = cli.or(config.telescope.as_deref());
    match name {
        Some(name) => Ok(Telescope::from_str(name)?),
        // the review table defaults to c14, matching the interactive flow
        None if !required => Ok(Telescope::C14),
        None => bail!(
            "no telescope profile given (known: {})",
            Telescope::ALL.map(|t| t.name()).join(", ")
        ),
    }
}

fn resolve_day(cli: Option<u32>, report_path: &Path) -> Result<u32, ScriptGenError> {
    let name = report_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    cli.or_else(|| infer_day_from_filename(&name))
        .ok_or(ScriptGenError::MissingObservingDay(name))
}

/// Default output name: the report's 8-digit date prefix plus the script
/// suffix, placed next to the report.
fn default_output_path(report_path: &Path) -> PathBuf {
    let name = report_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem: String = name.chars().take(8).collect();
    report_path.with_file_name(format!("{}_174_script.scs", stem))
}

fn print_conflicts(groups: &[&[Event]]) {
    println!("\x1b[1mPOTENTIAL CONFLICTS\x1b[0m");
    for group in groups {
        for ev in *group {
            println!(
                "Asteroid: {}   Event time: {}   Mag: {}   Dur: {}   Prob: {}  AltAz: {}",
                ev.target,
                ev.time,
                ev.mag_token,
                ev.dur_token,
                format_sig6(ev.prob),
                ev.altaz
            );
        }
        println!();
    }
}

fn prompt_exclusions() -> anyhow::Result<std::collections::HashSet<String>> {
    print!(
        "Enter the asteroid ids of the events to remove, separated by a comma. \
         If none to remove, enter 0: "
    );
    std::io::stdout().flush().context("flushing prompt")?;
    let mut reply = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut reply)
        .context("reading operator reply")?;
    Ok(parse_exclusion_list(&reply))
}
