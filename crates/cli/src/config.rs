//! Configuration management for the CLI
//!
//! Settings are layered: config file, then `PLNCTL_*` environment
//! variables, then command-line flags.

use anyhow::{Context, Result};
use clap::ValueEnum;
use planning_lib::{DecodeMode, Framing};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// CLI settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub decode_mode: DecodeMode,
    #[serde(default)]
    pub framing: Framing,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the config file and environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::config_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }
        builder = builder.add_source(config::Environment::with_prefix("PLNCTL"));

        builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Apply command-line flags on top of the loaded settings
    pub fn with_overrides(
        mut self,
        decode_mode: Option<DecodeMode>,
        framing: Option<Framing>,
        format: Option<OutputFormat>,
        log_format: Option<LogFormat>,
    ) -> Self {
        if let Some(decode_mode) = decode_mode {
            self.decode_mode = decode_mode;
        }
        if let Some(framing) = framing {
            self.framing = framing;
        }
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }
        self
    }

    /// Get the default configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("plnctl").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_loaded_settings() {
        let settings = Settings::default().with_overrides(
            Some(DecodeMode::Strict),
            None,
            Some(OutputFormat::Json),
            None,
        );
        assert_eq!(settings.decode_mode, DecodeMode::Strict);
        assert_eq!(settings.framing, Framing::Delimited);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plnctl.toml");
        std::fs::write(&path, "decode_mode = \"strict\"\nframing = \"bare\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.decode_mode, DecodeMode::Strict);
        assert_eq!(settings.framing, Framing::Bare);
        assert_eq!(settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
