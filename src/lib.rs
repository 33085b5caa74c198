//! hartlog - per-hart timeline reconstruction for multi-core simulator logs
//!
//! A multi-core simulator prints instruction-trace lines and full register
//! dumps for every hart into a single serial stream. This library turns that
//! stream into one global and one per-core log in which each register dump
//! is reduced to the registers that changed since the same hart's previous
//! dump.
//!
//! ```
//! use hartlog::config::SanitizerOptions;
//! use hartlog::sanitizer::sanitize_str;
//!
//! let log = "mhartid 1\npc 100\na 5\npc 104\n";
//! let report = sanitize_str(log, &SanitizerOptions::default()).unwrap();
//! assert_eq!(report.output.core(0), Some("Core 0:\nmhartid = 1\npc = 100\na = 5\n\n"));
//! ```

pub mod classify;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod sanitizer;
pub mod snapshot;
pub mod stats;
pub mod verdict;

pub use error::SanitizeError;
pub use sanitizer::{sanitize_file, sanitize_str, SanitizeReport, Sanitizer};
