//! Sanitizer configuration
//!
//! Options come from three layers, later ones winning: built-in defaults,
//! an optional TOML file, then command-line flags.
//!
//! # Example hartlog.toml
//!
//! ```toml
//! [sanitizer]
//! cores = 4
//! skip_blank_lines = false
//! output_dir = "traces"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of tracked hardware threads
pub const DEFAULT_CORES: usize = 4;

/// Options for one sanitizer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerOptions {
    /// Number of tracked cores; valid core indices are `0..cores`
    pub cores: usize,

    /// Ignore whitespace-only lines instead of rejecting them
    ///
    /// Off by default: a blank line has zero tokens and is malformed like
    /// any other line that is not made of `key value` pairs.
    pub skip_blank_lines: bool,

    /// Directory receiving `sanitized_log.log` and the per-core files
    pub output_dir: PathBuf,
}

impl Default for SanitizerOptions {
    fn default() -> Self {
        Self {
            cores: DEFAULT_CORES,
            skip_blank_lines: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SanitizerOptions {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cores == 0 {
            bail!("cores must be >= 1, got 0");
        }
        Ok(())
    }
}

/// Root of a hartlog.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub sanitizer: SanitizerOptions,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.sanitizer.validate()?;
        Ok(config)
    }
}
