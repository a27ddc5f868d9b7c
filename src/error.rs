//! Fatal error taxonomy for the script-generation pipeline.
//!
//! Per-line parse failures are not represented here; they are collected as
//! [`crate::models::report::ParseIssue`] values and never abort a run.

use std::path::PathBuf;

/// Result type for pipeline operations.
pub type ScriptGenResult<T> = Result<T, ScriptGenError>;

/// Error type for conditions that abort the run before output is written.
#[derive(Debug, thiserror::Error)]
pub enum ScriptGenError {
    /// Telescope identifier does not match any known profile.
    #[error("unrecognized telescope profile '{0}'")]
    UnknownTelescope(String),

    /// No observing day was given and none could be inferred from the
    /// report filename.
    #[error("no observing day given and no YYYYMMDD date in report filename '{0}'")]
    MissingObservingDay(String),

    /// The events report could not be read.
    #[error("failed to read report '{}': {source}", path.display())]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header or footer template could not be read.
    #[error("failed to read {role} template '{}': {source}", path.display())]
    TemplateIo {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate event was rejected; there is nothing to emit.
    #[error("no accepted events to emit; script not written")]
    EmptyAcceptedSet,

    /// The generated script could not be written.
    #[error("failed to write script '{}': {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_telescope_message() {
        let err = ScriptGenError::UnknownTelescope("c99".to_string());
        assert_eq!(err.to_string(), "unrecognized telescope profile 'c99'");
    }

    #[test]
    fn test_template_io_message_names_role_and_path() {
        let err = ScriptGenError::TemplateIo {
            role: "header",
            path: PathBuf::from("pre174.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("header"), "role missing from message: {}", msg);
        assert!(msg.contains("pre174.txt"), "path missing: {}", msg);
    }

    #[test]
    fn test_empty_accepted_set_message() {
        let msg = ScriptGenError::EmptyAcceptedSet.to_string();
        assert!(msg.contains("no accepted events"));
    }
}
