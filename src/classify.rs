//! Line classification for interleaved simulator logs
//!
//! The simulator writes two kinds of records into one serial stream:
//! instruction-trace lines (prefixed with `riscv`) and register dumps made
//! of whitespace-separated `name value` pairs. This module only decides
//! which kind a line is; it holds no state.

use crate::error::TraceTokenError;

/// Literal prefix of an instruction-execution trace record
pub const TRACE_PREFIX: &str = "riscv";

/// Program-counter register; a repeated `pc` single entry closes a snapshot
pub const PC_REGISTER: &str = "pc";

/// Register holding the 1-based hardware-thread id of a snapshot
pub const HART_ID_REGISTER: &str = "mhartid";

/// Classification of one raw input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Instruction trace record, passed through verbatim
    Trace {
        text: &'a str,
        /// Core index extracted from the hart token (may be negative)
        core: i64,
    },
    /// Exactly one `key value` pair
    Single { key: &'a str, value: &'a str },
    /// Two or more `key value` pairs, left to right
    Multi(Vec<(&'a str, &'a str)>),
    /// Whitespace-only line (only produced when blank lines are skipped)
    Blank,
    /// Token count is neither 2 nor an even number >= 4
    Malformed { tokens: usize },
}

/// Classify a single line (trailing newline already stripped)
///
/// With `skip_blank` unset, whitespace-only lines are `Malformed` with a
/// token count of zero.
pub fn classify_line(text: &str, skip_blank: bool) -> Result<LineKind<'_>, TraceTokenError> {
    if text.starts_with(TRACE_PREFIX) {
        let core = trace_core_index(text)?;
        return Ok(LineKind::Trace { text, core });
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();

    let kind = match tokens.len() {
        0 if skip_blank => LineKind::Blank,
        2 => LineKind::Single {
            key: tokens[0],
            value: tokens[1],
        },
        n if n >= 4 && n % 2 == 0 => LineKind::Multi(
            tokens
                .chunks_exact(2)
                .map(|pair| (pair[0], pair[1]))
                .collect(),
        ),
        n => LineKind::Malformed { tokens: n },
    };

    Ok(kind)
}

/// Extract the core index from a trace line's hart token
///
/// The simulator formats the token as `<label>:<hart><sep>`, e.g. `hart:1,`.
/// The second whitespace-delimited token is split on `:`, the second segment
/// loses its final character and the remainder is parsed as the 1-based hart
/// id. The returned core index is `hart - 1`.
pub fn trace_core_index(text: &str) -> Result<i64, TraceTokenError> {
    let token = text
        .split_whitespace()
        .nth(1)
        .ok_or(TraceTokenError::MissingToken)?;

    let segment = token
        .split(':')
        .nth(1)
        .ok_or_else(|| TraceTokenError::MissingSegment(token.to_string()))?;

    let mut chars = segment.chars();
    if chars.next_back().is_none() {
        return Err(TraceTokenError::EmptySegment(token.to_string()));
    }
    let digits = chars.as_str();

    let hart: i64 = digits
        .parse()
        .map_err(|_| TraceTokenError::NotNumeric(digits.to_string()))?;

    hart.checked_sub(1)
        .ok_or_else(|| TraceTokenError::Overflow(digits.to_string()))
}
