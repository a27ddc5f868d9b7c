//! # OSG Rust
//!
//! Occultation observation script generator.
//!
//! This crate turns a text report of predicted asteroid occultation events
//! into a timed `.scs` command script for observatory automation software.
//! Between filtering and emission the operator reviews the candidate list
//! and may discard events; nothing is removed destructively, so every
//! decision can be reversed before the script is written.
//!
//! ## Pipeline
//!
//! raw report lines → line parser → night-window + telescope filters →
//! sorted event list → conflict detection (advisory) → operator review →
//! script emission.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: record identifiers and the public DTO surface
//! - [`models`]: event records, wall-clock arithmetic, and report parsing
//! - [`services`]: filters, conflict detection, and script emission
//! - [`store`]: the reviewable event store with per-record acceptance flags
//! - [`config`]: run configuration from file and environment
//! - [`error`]: the fatal error taxonomy
//!
//! Per-line parse failures never escape the parser; fatal conditions
//! (unknown telescope profile, missing templates, empty accepted set)
//! propagate to the binary and abort before any output file is written.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
