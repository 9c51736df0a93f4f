//! Configuration management for `ampify.toml`.
//!
//! | Section    | Purpose                                  |
//! |------------|------------------------------------------|
//! | `[format]` | Output formatting (pretty, indent)       |
//!
//! The file is optional. CLI flags override values read from it.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::FormatConfig;

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "ampify.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing ampify.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpConfig {
    /// Output formatting
    #[serde(default)]
    pub format: FormatConfig,
}

impl AmpConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG);
                if path.exists() {
                    Self::from_path(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(pretty) = cli.pretty {
            self.format.pretty = pretty;
        }
        if let Some(indent) = cli.indent {
            self.format.indent = indent;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.format.indent > section::MAX_INDENT {
            return Err(ConfigError::Validation(format!(
                "format.indent must be at most {}, got {}",
                section::MAX_INDENT,
                self.format.indent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub fn test_parse_config(content: &str) -> AmpConfig {
    let (parsed, ignored) = AmpConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
