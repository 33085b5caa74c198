//! Pass/fail classification of captured trial output
//!
//! Repeated-trial harnesses run the simulator many times and keep the raw
//! logs of failing runs for sanitizing. This module holds the text-level
//! part of that contract: deciding whether a captured run or a debugger
//! transcript passed. Process management is left to the harness.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

/// Marker printed by the debugger script when every check passed
pub const DEBUGGER_OK_MARKER: &str = "<OK>";

/// Marker printed by the debugger script when a check failed
pub const DEBUGGER_FAILED_MARKER: &str = "<FAILED>";

/// `Exception(<digits>)` marker; the pattern is a fixed literal, so the
/// compile step cannot fail at runtime (checked by the tests below)
fn exception_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Exception\((\d+)\)").unwrap_or_else(|e| panic!("invalid exception pattern: {e}"))
    })
}

/// Outcome of one captured application run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialVerdict {
    passed: bool,
    success_marker_found: bool,
    exceptions: Vec<String>,
}

impl TrialVerdict {
    /// Classify captured output
    ///
    /// A run passes only if `success_marker` occurs and no
    /// `Exception(<digits>)` marker does.
    pub fn classify(output: &str, success_marker: &str) -> Self {
        let exceptions: Vec<String> = exception_pattern()
            .captures_iter(output)
            .map(|caps| caps[1].to_string())
            .collect();
        let success_marker_found = output.contains(success_marker);

        Self {
            passed: success_marker_found && exceptions.is_empty(),
            success_marker_found,
            exceptions,
        }
    }

    /// Read captured output from `path` and classify it
    pub fn classify_file(path: &Path, success_marker: &str) -> io::Result<Self> {
        let output = fs::read_to_string(path)?;
        Ok(Self::classify(&output, success_marker))
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn success_marker_found(&self) -> bool {
        self.success_marker_found
    }

    /// Exception codes in order of appearance (duplicates kept)
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    pub fn status(&self) -> &'static str {
        if self.passed {
            "OK"
        } else {
            "FAILED"
        }
    }
}

/// Outcome of a debugger-attached run, judged from its transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DebuggerVerdict {
    Passed,
    /// `<FAILED>` appeared somewhere in the transcript
    Failed,
    /// Neither marker settled it: `<OK>` never appeared
    MissingOk,
}

impl DebuggerVerdict {
    pub fn classify(transcript: &str) -> Self {
        if transcript.contains(DEBUGGER_FAILED_MARKER) {
            Self::Failed
        } else if !transcript.contains(DEBUGGER_OK_MARKER) {
            Self::MissingOk
        } else {
            Self::Passed
        }
    }

    /// Read a debugger transcript from `path` and classify it
    pub fn classify_file(path: &Path) -> io::Result<Self> {
        let transcript = fs::read_to_string(path)?;
        Ok(Self::classify(&transcript))
    }

    pub fn passed(self) -> bool {
        self == Self::Passed
    }

    pub fn status(self) -> &'static str {
        match self {
            Self::Passed => "OK",
            Self::Failed => "FAILED",
            Self::MissingOk => "FAILED (no <OK> marker)",
        }
    }
}
