//! Assertion totals for one run.

use crate::snapshot_test::MatchStatus;

/// Counts of snapshot assertions by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Total assertions checked.
    pub total: usize,
    /// Snapshots recorded for the first time.
    pub created: usize,
    /// Snapshots equal to the stored value.
    pub matched: usize,
    /// Snapshots overwritten in update mode.
    pub updated: usize,
    /// Mismatches and lookups of missing snapshots.
    pub failed: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the exit code (0 = pass, 1 = failures).
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn record(&mut self, status: MatchStatus) {
        self.total += 1;
        match status {
            MatchStatus::Created => self.created += 1,
            MatchStatus::Matched => self.matched += 1,
            MatchStatus::Updated => self.updated += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}
