//! Single-pass log sanitizer
//!
//! Reads a complete captured log front to back, reassembles register dumps
//! into per-hart snapshots, diffs each snapshot against the same hart's
//! previous one and splits the result into a global stream plus one stream
//! per tracked core.

use crate::classify::{classify_line, LineKind};
use crate::config::SanitizerOptions;
use crate::diff::{render_diff, CoreState};
use crate::error::SanitizeError;
use crate::snapshot::{Accumulator, RegisterSnapshot};
use crate::stats::SanitizeStats;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// File name of the global sanitized stream
pub const GLOBAL_LOG_NAME: &str = "sanitized_log.log";

/// File name of core `core`'s sanitized stream
pub fn core_log_name(core: usize) -> String {
    format!("sanitized_log_{}.log", core)
}

/// Append-only text accumulators for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedOutput {
    global: String,
    per_core: Vec<String>,
}

impl SanitizedOutput {
    pub fn new(cores: usize) -> Self {
        Self {
            global: String::new(),
            per_core: vec![String::new(); cores],
        }
    }

    /// Everything: all trace lines and all attributable diff blocks
    pub fn global(&self) -> &str {
        &self.global
    }

    /// Stream of a single core, `None` if the core is not tracked
    pub fn core(&self, core: usize) -> Option<&str> {
        self.per_core.get(core).map(String::as_str)
    }

    pub fn cores(&self) -> usize {
        self.per_core.len()
    }

    /// Trace lines go to the global stream always and to a core stream
    /// only when attributed
    fn push_trace(&mut self, text: &str, core: Option<usize>) {
        let entry = format!("{}\n\n", text);
        self.global.push_str(&entry);
        if let Some(stream) = core.and_then(|c| self.per_core.get_mut(c)) {
            stream.push_str(&entry);
        }
    }

    fn push_block(&mut self, core: usize, block: &str) {
        self.global.push_str(block);
        if let Some(stream) = self.per_core.get_mut(core) {
            stream.push_str(block);
        }
    }

    /// Write all streams into `dir`, replacing existing files
    ///
    /// Returns the written paths, global stream first.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, SanitizeError> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.per_core.len() + 1);

        let global_path = dir.join(GLOBAL_LOG_NAME);
        fs::write(&global_path, &self.global)?;
        written.push(global_path);

        for (core, stream) in self.per_core.iter().enumerate() {
            let path = dir.join(core_log_name(core));
            fs::write(&path, stream)?;
            written.push(path);
        }

        debug!(dir = %dir.display(), files = written.len(), "wrote sanitized logs");
        Ok(written)
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct SanitizeReport {
    pub output: SanitizedOutput,
    pub stats: SanitizeStats,
}

/// Sanitizer state for one run
///
/// Owns the in-progress snapshot, the per-core baselines and the output
/// accumulators. A fresh `Sanitizer` is created for every log; nothing
/// carries over between runs.
#[derive(Debug)]
pub struct Sanitizer {
    skip_blank_lines: bool,
    accumulator: Accumulator,
    state: CoreState,
    output: SanitizedOutput,
    stats: SanitizeStats,
}

impl Sanitizer {
    pub fn new(options: &SanitizerOptions) -> Self {
        Self {
            skip_blank_lines: options.skip_blank_lines,
            accumulator: Accumulator::new(),
            state: CoreState::new(options.cores),
            output: SanitizedOutput::new(options.cores),
            stats: SanitizeStats::new(options.cores),
        }
    }

    /// Process one line; `index` is its 0-based position in the file
    pub fn feed_line(&mut self, index: usize, text: &str) -> Result<(), SanitizeError> {
        let line = index + 1;
        self.stats.lines += 1;

        let kind = classify_line(text, self.skip_blank_lines).map_err(|reason| {
            SanitizeError::TraceToken {
                line,
                text: text.to_string(),
                reason,
            }
        })?;

        match kind {
            LineKind::Trace { text, core } => {
                let core = self.attribute(line, core)?;
                self.stats.trace_lines += 1;
                match core.and_then(|c| self.stats.core_mut(c)) {
                    Some(core_stats) => core_stats.trace_lines += 1,
                    None => self.stats.unattributed_trace_lines += 1,
                }
                self.output.push_trace(text, core);
            }
            LineKind::Single { key, value } => {
                self.stats.register_lines += 1;
                if let Some(closed) = self.accumulator.push_single(key, value) {
                    self.close_snapshot(line, closed)?;
                }
            }
            LineKind::Multi(pairs) => {
                self.stats.register_lines += 1;
                self.accumulator.push_multi(pairs);
            }
            LineKind::Blank => {
                self.stats.blank_lines += 1;
            }
            LineKind::Malformed { tokens } => {
                return Err(SanitizeError::Format {
                    line,
                    tokens,
                    text: text.to_string(),
                });
            }
        }

        Ok(())
    }

    /// End of input: drop any unclosed snapshot and hand back the output
    pub fn finish(mut self) -> SanitizeReport {
        let discarded = self.accumulator.finish();
        if discarded > 0 {
            debug!(registers = discarded, "dropping unclosed trailing snapshot");
        }
        self.stats.discarded_trailing_registers = discarded as u64;

        SanitizeReport {
            output: self.output,
            stats: self.stats,
        }
    }

    /// Map a raw core index onto a tracked stream
    ///
    /// Negative indices are the "unattributed" sentinel. Indices past the
    /// tracked range are fatal.
    fn attribute(&self, line: usize, core: i64) -> Result<Option<usize>, SanitizeError> {
        if core < 0 {
            return Ok(None);
        }
        match usize::try_from(core) {
            Ok(index) if index < self.state.cores() => Ok(Some(index)),
            _ => Err(SanitizeError::CoreOutOfRange {
                line,
                core,
                cores: self.state.cores(),
            }),
        }
    }

    fn close_snapshot(&mut self, line: usize, snapshot: RegisterSnapshot) -> Result<(), SanitizeError> {
        let raw_core = snapshot
            .core_index()
            .map_err(|reason| SanitizeError::Attribution { line, reason })?;
        let core = self.attribute(line, raw_core)?;
        self.stats.closed_snapshots += 1;

        let Some(core) = core else {
            trace!(line, core = raw_core, "dropping unattributed snapshot");
            self.stats.dropped_snapshots += 1;
            return Ok(());
        };

        let block = render_diff(core, self.state.previous(core), &snapshot);
        trace!(
            line,
            core,
            new = block.new_registers,
            changed = block.changed_registers,
            "closed snapshot"
        );
        self.output.push_block(core, &block.text);

        if let Some(core_stats) = self.stats.core_mut(core) {
            core_stats.snapshots += 1;
            core_stats.new_registers += block.new_registers as u64;
            core_stats.changed_registers += block.changed_registers as u64;
        }

        self.state.replace(core, snapshot);
        Ok(())
    }
}

/// Sanitize a complete log held in memory
pub fn sanitize_str(input: &str, options: &SanitizerOptions) -> Result<SanitizeReport, SanitizeError> {
    let total = input.lines().count();
    let mut sanitizer = Sanitizer::new(options);

    for (index, text) in input.lines().enumerate() {
        trace!("Line {}/{}", index, total);
        sanitizer.feed_line(index, text)?;
    }

    let report = sanitizer.finish();
    info!(
        lines = report.stats.lines,
        snapshots = report.stats.closed_snapshots,
        dropped = report.stats.dropped_snapshots,
        "sanitized log"
    );
    if report.stats.closed_snapshots == 0 && report.stats.register_lines > 0 {
        warn!("register dumps found but no snapshot ever closed");
    }
    Ok(report)
}

/// Read and sanitize a captured log file
pub fn sanitize_file(path: &Path, options: &SanitizerOptions) -> Result<SanitizeReport, SanitizeError> {
    debug!(path = %path.display(), cores = options.cores, "reading log");
    let input = fs::read_to_string(path)?;
    sanitize_str(&input, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AttributionReason, TraceTokenError};

    fn run(input: &str) -> SanitizeReport {
        sanitize_str(input, &SanitizerOptions::default()).unwrap()
    }

    fn run_err(input: &str) -> SanitizeError {
        sanitize_str(input, &SanitizerOptions::default()).unwrap_err()
    }

    #[test]
    fn test_reference_scenario() {
        let input = "mhartid 1\npc 100\na 5\nmhartid 1\npc 104\na 5\nb 9\n";
        let report = run(input);

        let expected = "Core 0:\nmhartid = 1\npc = 100\na = 5\n\n";
        assert_eq!(report.output.global(), expected);
        assert_eq!(report.output.core(0), Some(expected));
        for core in 1..4 {
            assert_eq!(report.output.core(core), Some(""));
        }
        assert_eq!(report.stats.closed_snapshots, 1);
        // pc=104, a=5, b=9 are still open at end of input
        assert_eq!(report.stats.discarded_trailing_registers, 3);
    }

    #[test]
    fn test_second_snapshot_diffs_against_first() {
        let input = "\
mhartid 2
pc 100
a 5
pc 104
mhartid 2
a 6
pc 108
";
        let report = run(input);
        let expected = "Core 1:\nmhartid = 2\npc = 100\na = 5\n\nCore 1:\npc = 100 -> 104\na = 5 -> 6\n\n";
        assert_eq!(report.output.core(1), Some(expected));
        assert_eq!(report.output.global(), expected);
    }

    #[test]
    fn test_interleaved_cores_keep_separate_baselines() {
        let input = "\
pc 100
mhartid 1
x 1
pc 200
mhartid 2
x 7
pc 104
mhartid 1
x 2
pc 0
";
        let report = run(input);
        assert_eq!(
            report.output.core(0),
            Some("Core 0:\npc = 100\nmhartid = 1\nx = 1\n\nCore 0:\npc = 100 -> 104\nx = 1 -> 2\n\n")
        );
        assert_eq!(
            report.output.core(1),
            Some("Core 1:\npc = 200\nmhartid = 2\nx = 7\n\n")
        );
        assert!(report
            .output
            .global()
            .starts_with("Core 0:\npc = 100\nmhartid = 1\nx = 1\n\nCore 1:"));
    }

    #[test]
    fn test_negative_core_snapshot_renders_nothing_but_resets() {
        let input = "pc 1\nmhartid 0\nr 3\npc 2\nmhartid 1\npc 3\n";
        let report = run(input);

        // The hart-0 snapshot vanishes; the next one starts fresh with pc=2
        assert_eq!(report.output.global(), "Core 0:\npc = 2\nmhartid = 1\n\n");
        assert_eq!(report.stats.dropped_snapshots, 1);
        assert_eq!(report.stats.closed_snapshots, 2);
    }

    #[test]
    fn test_trace_line_asymmetry() {
        let input = "riscv_cpu: hart:2, cause:1\nriscv_cpu: hart:0, cause:2\n";
        let report = run(input);

        assert_eq!(
            report.output.global(),
            "riscv_cpu: hart:2, cause:1\n\nriscv_cpu: hart:0, cause:2\n\n"
        );
        assert_eq!(report.output.core(1), Some("riscv_cpu: hart:2, cause:1\n\n"));
        assert_eq!(report.output.core(0), Some(""));
        assert_eq!(report.stats.unattributed_trace_lines, 1);
        assert_eq!(report.stats.cores[1].trace_lines, 1);
    }

    #[test]
    fn test_trace_lines_do_not_touch_snapshot() {
        let input = "pc 1\nmhartid 1\nriscv_cpu: hart:1, x\na 2\npc 2\n";
        let report = run(input);
        assert_eq!(
            report.output.core(0),
            Some("riscv_cpu: hart:1, x\n\nCore 0:\npc = 1\nmhartid = 1\na = 2\n\n")
        );
    }

    #[test]
    fn test_multi_entry_lines_fill_snapshot() {
        let input = "pc 10\nmhartid 1\n x1 a x2 b\n x3 c x1 d\npc 14\n";
        let report = run(input);
        assert_eq!(
            report.output.global(),
            "Core 0:\npc = 10\nmhartid = 1\nx1 = d\nx2 = b\nx3 = c\n\n"
        );
    }

    #[test]
    fn test_multi_entry_pc_does_not_close() {
        let input = "pc 10\nmhartid 1\npc 14 x1 0\n";
        let report = run(input);
        assert_eq!(report.output.global(), "");
        assert_eq!(report.stats.closed_snapshots, 0);
    }

    #[test]
    fn test_unchanged_snapshot_emits_bare_header() {
        let input = "pc 1\nmhartid 1\npc 1\nmhartid 1\npc 1\n";
        let report = run(input);
        assert_eq!(
            report.output.core(0),
            Some("Core 0:\npc = 1\nmhartid = 1\n\nCore 0:\n\n")
        );
    }

    #[test]
    fn test_empty_input() {
        let report = run("");
        assert_eq!(report.output.global(), "");
        assert_eq!(report.stats.lines, 0);
    }

    #[test]
    fn test_malformed_line_is_format_error() {
        match run_err("pc 1\nmhartid 1 extra\n") {
            SanitizeError::Format { line, tokens, text } => {
                assert_eq!(line, 2);
                assert_eq!(tokens, 3);
                assert_eq!(text, "mhartid 1 extra");
            }
            other => panic!("Expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line_rejected_by_default() {
        assert!(matches!(
            run_err("pc 1\n\npc 2\n"),
            SanitizeError::Format { line: 2, tokens: 0, .. }
        ));
    }

    #[test]
    fn test_blank_line_skipped_when_enabled() {
        let options = SanitizerOptions {
            skip_blank_lines: true,
            ..SanitizerOptions::default()
        };
        let report = sanitize_str("pc 1\n\nmhartid 1\n\npc 2\n", &options).unwrap();
        assert_eq!(report.output.global(), "Core 0:\npc = 1\nmhartid = 1\n\n");
        assert_eq!(report.stats.blank_lines, 2);
    }

    #[test]
    fn test_missing_hart_id_is_attribution_error() {
        match run_err("pc 1\na 2\npc 2\n") {
            SanitizeError::Attribution { line, reason } => {
                assert_eq!(line, 3);
                assert_eq!(reason, AttributionReason::MissingHartId);
            }
            other => panic!("Expected Attribution error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_hart_id_is_attribution_error() {
        assert!(matches!(
            run_err("pc 1\nmhartid one\npc 2\n"),
            SanitizeError::Attribution {
                reason: AttributionReason::NotNumeric(_),
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_snapshot_is_fatal() {
        match run_err("pc 1\nmhartid 5\npc 2\n") {
            SanitizeError::CoreOutOfRange { line, core, cores } => {
                assert_eq!((line, core, cores), (3, 4, 4));
            }
            other => panic!("Expected CoreOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_trace_line_is_fatal() {
        assert!(matches!(
            run_err("riscv_cpu: hart:9, x\n"),
            SanitizeError::CoreOutOfRange { line: 1, core: 8, .. }
        ));
    }

    #[test]
    fn test_bad_trace_token_is_fatal() {
        match run_err("pc 1\nriscv_cpu_do_interrupt\n") {
            SanitizeError::TraceToken { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, TraceTokenError::MissingToken);
            }
            other => panic!("Expected TraceToken error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimum_trace_hart_id_is_fatal() {
        match run_err("riscv_cpu: hart:-9223372036854775808, x\n") {
            SanitizeError::TraceToken { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(matches!(reason, TraceTokenError::Overflow(_)));
            }
            other => panic!("Expected TraceToken error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimum_snapshot_hart_id_is_fatal() {
        match run_err("pc 1\nmhartid -9223372036854775808\npc 2\n") {
            SanitizeError::Attribution { line, reason } => {
                assert_eq!(line, 3);
                assert!(matches!(reason, AttributionReason::Overflow(_)));
            }
            other => panic!("Expected Attribution error, got {other:?}"),
        }
    }

    #[test]
    fn test_sanitize_file_reads_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qemu.log");
        fs::write(&path, "pc 1\nmhartid 1\npc 2\n").unwrap();

        let report = sanitize_file(&path, &SanitizerOptions::default()).unwrap();
        assert_eq!(report.output.global(), "Core 0:\npc = 1\nmhartid = 1\n\n");
    }

    #[test]
    fn test_custom_core_count() {
        let options = SanitizerOptions {
            cores: 8,
            ..SanitizerOptions::default()
        };
        let report = sanitize_str("pc 1\nmhartid 8\npc 2\n", &options).unwrap();
        assert_eq!(report.output.cores(), 8);
        assert_eq!(report.output.core(7), Some("Core 7:\npc = 1\nmhartid = 8\n\n"));
    }

    #[test]
    fn test_crlf_input() {
        let report = run("pc 1\r\nmhartid 1\r\npc 2\r\n");
        assert_eq!(report.output.global(), "Core 0:\npc = 1\nmhartid = 1\n\n");
    }

    #[test]
    fn test_write_to_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = run("pc 1\nmhartid 2\npc 2\n");

        let written = report.output.write_to(dir.path()).unwrap();
        assert_eq!(written.len(), 5);
        assert_eq!(written[0], dir.path().join("sanitized_log.log"));

        let core1 = fs::read_to_string(dir.path().join("sanitized_log_1.log")).unwrap();
        assert_eq!(core1, "Core 1:\npc = 1\nmhartid = 2\n\n");
        let core3 = fs::read_to_string(dir.path().join("sanitized_log_3.log")).unwrap();
        assert!(core3.is_empty());
    }

    #[test]
    fn test_write_to_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GLOBAL_LOG_NAME), "stale contents").unwrap();

        run("").output.write_to(dir.path()).unwrap();
        let global = fs::read_to_string(dir.path().join(GLOBAL_LOG_NAME)).unwrap();
        assert!(global.is_empty());
    }

    #[test]
    fn test_sanitize_file_missing() {
        let err = sanitize_file(Path::new("/nonexistent/qemu.log"), &SanitizerOptions::default())
            .unwrap_err();
        assert!(matches!(err, SanitizeError::Io(_)));
    }
}
