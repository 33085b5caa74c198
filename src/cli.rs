//! CLI argument parsing for hartlog

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the `-c` run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "hartlog")]
#[command(version)]
#[command(
    about = "Split an interleaved multi-core simulator log into per-hart register-diff timelines",
    long_about = None
)]
pub struct Cli {
    /// Captured simulator log to sanitize
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Directory for sanitized_log.log and sanitized_log_N.log (default: .)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of tracked hardware threads (default: 4)
    #[arg(short = 'n', long = "cores", value_name = "N")]
    pub cores: Option<usize>,

    /// Ignore whitespace-only lines instead of failing on them
    #[arg(long = "skip-blank")]
    pub skip_blank: bool,

    /// Load sanitizer options from a TOML file (flags override it)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a run summary (line, snapshot and per-core counts) to stdout
    #[arg(short = 'c', long = "summary")]
    pub summary: bool,

    /// Summary format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also classify the raw log as a trial run that must print TEXT and
    /// no Exception(N) marker
    #[arg(long = "success-marker", value_name = "TEXT")]
    pub success_marker: Option<String>,

    /// Judge a debugger transcript by its <OK>/<FAILED> markers
    #[arg(long = "debugger-transcript", value_name = "PATH")]
    pub debugger_transcript: Option<PathBuf>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
