//! Register snapshots and the snapshot accumulator
//!
//! A snapshot is built from consecutive register lines until a second `pc`
//! single entry shows up, which marks the start of the next instruction's
//! dump. The accumulator is an explicit state machine:
//!
//! ```text
//! Idle --entry--> Accumulating --entry--> Accumulating
//!                      |
//!                      +--pc while pc present--> (closing) --> Accumulating{pc}
//! ```
//!
//! On close the whole map is moved out to the caller, never cloned or
//! shared with the snapshot that follows.

use crate::classify::{HART_ID_REGISTER, PC_REGISTER};
use crate::error::AttributionReason;
use indexmap::IndexMap;

/// Ordered register name -> value mapping for one instruction on one hart
///
/// Keys keep the position of their first insertion; later writes to the
/// same key only replace the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    registers: IndexMap<String, String>,
}

impl RegisterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a register value
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.registers.get_mut(name) {
            Some(slot) => {
                slot.clear();
                slot.push_str(value);
            }
            None => {
                self.registers.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.registers.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Registers in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.registers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Core index of this snapshot: `mhartid - 1`
    ///
    /// Negative results are valid and mean "not attributable to a stream".
    pub fn core_index(&self) -> Result<i64, AttributionReason> {
        let raw = self
            .get(HART_ID_REGISTER)
            .ok_or(AttributionReason::MissingHartId)?;

        let hart: i64 = raw
            .parse()
            .map_err(|_| AttributionReason::NotNumeric(raw.to_string()))?;

        hart.checked_sub(1)
            .ok_or_else(|| AttributionReason::Overflow(raw.to_string()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RegisterSnapshot {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (name, value) in iter {
            snapshot.insert(name, value);
        }
        snapshot
    }
}

/// In-progress snapshot state
///
/// `None` is the idle state: nothing collected since the last close (or
/// start of input). `Some` holds at least one register entry.
#[derive(Debug, Default)]
pub struct Accumulator {
    current: Option<RegisterSnapshot>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// The snapshot being built, if any
    pub fn current(&self) -> Option<&RegisterSnapshot> {
        self.current.as_ref()
    }

    /// Feed a single-entry line
    ///
    /// Returns the closed snapshot when `key` is `pc` and the snapshot being
    /// built already has a `pc`. The accumulator then holds only the new
    /// `pc` entry.
    pub fn push_single(&mut self, key: &str, value: &str) -> Option<RegisterSnapshot> {
        let closes = key == PC_REGISTER
            && self
                .current()
                .is_some_and(|snapshot| snapshot.contains(PC_REGISTER));

        let closed = if closes { self.close() } else { None };
        self.slot().insert(key, value);
        closed
    }

    /// Feed a multi-entry line
    ///
    /// Multi-entry lines never close a snapshot, even when one of the pairs
    /// is `pc`.
    pub fn push_multi<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let snapshot = self.slot();
        for (key, value) in pairs {
            snapshot.insert(key, value);
        }
    }

    /// Drop whatever is still open at end of input
    ///
    /// Returns the number of registers discarded (0 when idle).
    pub fn finish(&mut self) -> usize {
        self.close().map_or(0, |snapshot| snapshot.len())
    }

    /// Move the in-progress snapshot out, returning to idle
    fn close(&mut self) -> Option<RegisterSnapshot> {
        self.current.take()
    }

    /// Snapshot to write into, leaving idle on first use
    fn slot(&mut self) -> &mut RegisterSnapshot {
        self.current.get_or_insert_with(RegisterSnapshot::new)
    }
}
