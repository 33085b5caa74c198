//! Run statistics for `-c` summary mode

use crate::verdict::TrialVerdict;
use serde::Serialize;
use std::fmt::Write as _;

/// Counters for a single core's output stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoreStats {
    pub core: usize,
    /// Trace lines copied into this core's stream
    pub trace_lines: u64,
    /// Diff blocks rendered for this core
    pub snapshots: u64,
    pub new_registers: u64,
    pub changed_registers: u64,
}

/// Counters for a whole sanitizer run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeStats {
    pub lines: u64,
    pub trace_lines: u64,
    /// Trace lines with a negative core index (global stream only)
    pub unattributed_trace_lines: u64,
    pub register_lines: u64,
    pub blank_lines: u64,
    pub closed_snapshots: u64,
    /// Closed snapshots with a negative core index, rendered nowhere
    pub dropped_snapshots: u64,
    /// Registers in the unclosed snapshot left at end of input
    pub discarded_trailing_registers: u64,
    pub cores: Vec<CoreStats>,
}

impl SanitizeStats {
    pub fn new(cores: usize) -> Self {
        Self {
            cores: (0..cores)
                .map(|core| CoreStats {
                    core,
                    ..CoreStats::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn core_mut(&mut self, core: usize) -> Option<&mut CoreStats> {
        self.cores.get_mut(core)
    }

    /// Human-readable summary table
    pub fn format_text(&self, verdict: Option<&TrialVerdict>) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "lines read:            {}", self.lines);
        let _ = writeln!(
            out,
            "trace lines:           {} ({} unattributed)",
            self.trace_lines, self.unattributed_trace_lines
        );
        let _ = writeln!(out, "register lines:        {}", self.register_lines);
        if self.blank_lines > 0 {
            let _ = writeln!(out, "blank lines skipped:   {}", self.blank_lines);
        }
        let _ = writeln!(
            out,
            "snapshots closed:      {} ({} dropped)",
            self.closed_snapshots, self.dropped_snapshots
        );
        if self.discarded_trailing_registers > 0 {
            let _ = writeln!(
                out,
                "trailing snapshot:     {} registers discarded",
                self.discarded_trailing_registers
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>6} {:>10} {:>10} {:>10} {:>10}",
            "core", "traces", "snapshots", "new", "changed"
        );
        let _ = writeln!(out, "{}", "-".repeat(50));
        for core in &self.cores {
            let _ = writeln!(
                out,
                "{:>6} {:>10} {:>10} {:>10} {:>10}",
                core.core,
                core.trace_lines,
                core.snapshots,
                core.new_registers,
                core.changed_registers
            );
        }

        if let Some(verdict) = verdict {
            let _ = writeln!(out);
            let _ = writeln!(out, "verdict:               {}", verdict.status());
            for code in verdict.exceptions() {
                let _ = writeln!(out, "  exception {}", code);
            }
        }

        out
    }

    /// JSON summary, tagged `hartlog-json-v1`
    pub fn to_json(&self, verdict: Option<&TrialVerdict>) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Summary<'a> {
            format: &'static str,
            version: &'static str,
            stats: &'a SanitizeStats,
            #[serde(skip_serializing_if = "Option::is_none")]
            verdict: Option<&'a TrialVerdict>,
        }

        serde_json::to_string_pretty(&Summary {
            format: "hartlog-json-v1",
            version: env!("CARGO_PKG_VERSION"),
            stats: self,
            verdict,
        })
    }
}
