//! Per-core register state and diff rendering
//!
//! Raw dumps carry dozens of registers per instruction, most of them
//! unchanged from the previous step on the same hart. Rendering only new
//! and changed registers turns the interleaved dump into a readable,
//! per-core timeline.

use crate::snapshot::RegisterSnapshot;
use std::fmt::Write as _;

/// Last rendered snapshot of every tracked core
///
/// Lives for one sanitizer run. Entries start empty and are only ever
/// replaced wholesale, after the diff against them has been rendered.
#[derive(Debug, Clone)]
pub struct CoreState {
    last: Vec<Option<RegisterSnapshot>>,
}

impl CoreState {
    /// Create state for cores `0..cores`
    pub fn new(cores: usize) -> Self {
        Self {
            last: vec![None; cores],
        }
    }

    /// Number of tracked cores
    pub fn cores(&self) -> usize {
        self.last.len()
    }

    /// Previous snapshot for `core`, `None` when never rendered or untracked
    pub fn previous(&self, core: usize) -> Option<&RegisterSnapshot> {
        self.last.get(core).and_then(Option::as_ref)
    }

    /// Store `snapshot` as the new baseline for `core`
    ///
    /// Returns false (and stores nothing) if `core` is not tracked.
    pub fn replace(&mut self, core: usize, snapshot: RegisterSnapshot) -> bool {
        match self.last.get_mut(core) {
            Some(slot) => {
                *slot = Some(snapshot);
                true
            }
            None => false,
        }
    }
}

/// Rendered diff of one snapshot against its core's previous snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffBlock {
    /// Header, register lines and trailing blank line
    pub text: String,
    /// Registers absent from the previous snapshot
    pub new_registers: usize,
    /// Registers whose value differs from the previous snapshot
    pub changed_registers: usize,
}

/// Render `next` against `prev` for `core`
///
/// ```text
/// Core 0:
/// a0 = 5
/// pc = 100 -> 104
///
/// ```
///
/// Registers follow `next`'s insertion order. Unchanged registers are
/// omitted, but the header and the trailing blank line are always emitted.
pub fn render_diff(core: usize, prev: Option<&RegisterSnapshot>, next: &RegisterSnapshot) -> DiffBlock {
    let mut block = DiffBlock::default();
    let _ = writeln!(block.text, "Core {}:", core);

    for (name, value) in next.iter() {
        match prev.and_then(|p| p.get(name)) {
            None => {
                let _ = writeln!(block.text, "{} = {}", name, value);
                block.new_registers += 1;
            }
            Some(old) if old != value => {
                let _ = writeln!(block.text, "{} = {} -> {}", name, old, value);
                block.changed_registers += 1;
            }
            Some(_) => {}
        }
    }

    block.text.push('\n');
    block
}
