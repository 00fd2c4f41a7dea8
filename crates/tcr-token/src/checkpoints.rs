//! Timestamped value history.

use serde::{Deserialize, Serialize};
use tcr_core::{Amount, Timestamp};

/// An append-only history of `(timestamp, value)` pairs in ascending
/// timestamp order. Writes at the same instant overwrite the latest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    entries: Vec<(Timestamp, Amount)>,
}

impl Checkpoints {
    /// Record `value` as of `at`.
    ///
    /// `at` is expected to be no earlier than the latest entry. An earlier
    /// `at` (a clock moved backwards) is clamped to the latest entry's
    /// timestamp so the history stays ordered.
    pub fn push(&mut self, at: Timestamp, value: Amount) {
        match self.entries.last_mut() {
            Some((ts, v)) if *ts >= at => *v = value,
            _ => self.entries.push((at, value)),
        }
    }

    /// Latest value.
    pub fn latest(&self) -> Amount {
        self.entries.last().map(|(_, v)| *v).unwrap_or(0)
    }

    /// Value of the last checkpoint at or before `at`; zero if none.
    pub fn at(&self, at: Timestamp) -> Amount {
        let idx = self.entries.partition_point(|(ts, _)| *ts <= at);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].1
        }
    }

    /// Number of stored checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no checkpoint was ever written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
