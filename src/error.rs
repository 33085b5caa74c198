//! Error types for the log sanitizer
//!
//! Every error is fatal to a single sanitizer run: a misparsed snapshot
//! boundary corrupts all attribution that follows it, so there is no
//! per-line recovery.

use thiserror::Error;

/// Why the hardware-thread token of a trace line could not be extracted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceTokenError {
    #[error("trace line has no second whitespace-delimited token")]
    MissingToken,

    #[error("token {0:?} has no ':'-separated hart segment")]
    MissingSegment(String),

    #[error("hart segment of token {0:?} is empty")]
    EmptySegment(String),

    #[error("hart id {0:?} is not an integer")]
    NotNumeric(String),

    #[error("hart id {0:?} has no core index")]
    Overflow(String),
}

/// Why a closed snapshot could not be attributed to a core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributionReason {
    #[error("snapshot has no mhartid register")]
    MissingHartId,

    #[error("mhartid value {0:?} is not an integer")]
    NotNumeric(String),

    #[error("mhartid value {0:?} has no core index")]
    Overflow(String),
}

/// Errors that abort a sanitizer run
///
/// Line numbers are 1-based, as shown to the user.
#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("line {line}: expected `key value` pairs, found {tokens} token(s): {text:?}")]
    Format {
        line: usize,
        tokens: usize,
        text: String,
    },

    #[error("line {line}: cannot attribute snapshot to a core: {reason}")]
    Attribution {
        line: usize,
        reason: AttributionReason,
    },

    #[error("line {line}: bad hart token in trace line {text:?}: {reason}")]
    TraceToken {
        line: usize,
        text: String,
        reason: TraceTokenError,
    },

    #[error("line {line}: core index {core} is outside the tracked range 0..{cores}")]
    CoreOutOfRange { line: usize, core: i64, cores: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SanitizeError {
    /// The 1-based input line the error was raised on, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. }
            | Self::Attribution { line, .. }
            | Self::TraceToken { line, .. }
            | Self::CoreOutOfRange { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}
