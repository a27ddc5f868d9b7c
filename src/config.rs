//! Run configuration and environment variable handling.
//!
//! The binary works with plain defaults; an optional `osg.toml` file and a
//! few environment variables adjust them. Command-line arguments always
//! win over both.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "osg.toml";

/// Run configuration: template locations and the default telescope.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Header template prepended to every script.
    pub pre_path: PathBuf,
    /// Footer template appended to every script.
    pub post_path: PathBuf,
    /// Telescope profile assumed when none is given on the command line.
    pub telescope: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pre_path: PathBuf::from("pre174.txt"),
            post_path: PathBuf::from("post571.txt"),
            telescope: None,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load the configuration.
    ///
    /// Sources, later ones winning:
    /// 1. built-in defaults
    /// 2. the TOML file at `path`, or `osg.toml` if present and no path
    ///    was given (an explicitly named file must exist; the implicit
    ///    one is optional)
    /// 3. environment variables
    ///
    /// # Environment Variables
    /// - `OSG_PRE`: header template path
    /// - `OSG_POST`: footer template path
    /// - `OSG_TELESCOPE`: default telescope profile
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read configuration '{}'", p.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("in configuration '{}'", p.display()))?
            }
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    let text = std::fs::read_to_string(implicit).with_context(|| {
                        format!("failed to read configuration '{}'", implicit.display())
                    })?;
                    Self::from_toml_str(&text)
                        .with_context(|| format!("in configuration '{}'", implicit.display()))?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(pre) = env::var("OSG_PRE") {
            config.pre_path = PathBuf::from(pre);
        }
        if let Ok(post) = env::var("OSG_POST") {
            config.post_path = PathBuf::from(post);
        }
        if let Ok(telescope) = env::var("OSG_TELESCOPE") {
            config.telescope = Some(telescope);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.pre_path, PathBuf::from("pre174.txt"));
        assert_eq!(config.post_path, PathBuf::from("post571.txt"));
        assert!(config.telescope.is_none());
    }

    #[test]
    fn test_from_toml_str_overrides_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            pre_path = "templates/pre.txt"
            telescope = "c14"
            "#,
        )
        .unwrap();
        assert_eq!(config.pre_path, PathBuf::from("templates/pre.txt"));
        // unset keys keep their defaults
        assert_eq!(config.post_path, PathBuf::from("post571.txt"));
        assert_eq!(config.telescope.as_deref(), Some("c14"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(RunConfig::from_toml_str("teleskope = \"c11\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(RunConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osg.toml");
        std::fs::write(&path, "post_path = \"end.txt\"\n").unwrap();
        let config = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(config.post_path, PathBuf::from("end.txt"));
    }
}
