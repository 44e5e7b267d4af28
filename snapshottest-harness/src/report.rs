//! Plain-text run reports.

use std::fmt;

use snapshottest::ValidationReport;

use crate::stats::RunStats;

const RULE_WIDTH: usize = 80;

/// Every unvisited snapshot of every store, grouped by store.
pub struct UnvisitedListing<'a>(pub &'a ValidationReport);

impl fmt::Display for UnvisitedListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Following snapshots left unvisited:")?;
        for entry in self.0.entries() {
            writeln!(f, "{} ({})", entry.module, entry.path.display())?;
            for key in &entry.keys {
                writeln!(f, "  {}", key)?;
            }
        }
        write!(f, "{}", rule)
    }
}

/// Summary of a finished run.
pub struct RunSummary<'a> {
    pub stats: &'a RunStats,
    pub validation: &'a ValidationReport,
}

impl fmt::Display for RunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = !self.stats.success() || self.validation.has_failures();
        let status = if failed { "FAIL" } else { "PASS" };

        writeln!(f, "{}: snapshots", status)?;
        writeln!(
            f,
            "  {} checked, {} created, {} matched, {} updated, {} failed",
            self.stats.total,
            self.stats.created,
            self.stats.matched,
            self.stats.updated,
            self.stats.failed
        )?;
        write!(
            f,
            "  {} unvisited in {} file(s)",
            self.validation.unvisited_count(),
            self.validation.entries().len()
        )
    }
}

pub fn format_unvisited_listing(report: &ValidationReport) -> String {
    UnvisitedListing(report).to_string()
}

pub fn format_summary(stats: &RunStats, validation: &ValidationReport) -> String {
    RunSummary { stats, validation }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapshottest::{SnapshotConfig, StoreRegistry, Validator, Value};
    use tempfile::TempDir;

    fn report_with_leftovers(dir: &TempDir, fail: bool) -> ValidationReport {
        let config = SnapshotConfig::new().with_fail_on_unvisited(fail);
        let mut registry = StoreRegistry::with_config(config);
        for (name, keys) in [("a", &["old 1", "old 2"][..]), ("b", &["gone"][..])] {
            let store = registry
                .resolve(&format!("snap_{}", name), dir.path().join(format!("snap_{}.ron", name)), None)
                .unwrap();
            for key in keys {
                store.set(*key, Value::Unit);
            }
        }
        Validator::sweep(&registry)
    }

    #[test]
    fn test_format_unvisited_listing() {
        let dir = TempDir::new().unwrap();
        let report = report_with_leftovers(&dir, true);
        let listing = format_unvisited_listing(&report);

        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], "-".repeat(80));
        assert_eq!(lines[1], "Following snapshots left unvisited:");
        assert!(lines[2].starts_with("snap_a ("));
        assert_eq!(lines[3], "  old 1");
        assert_eq!(lines[4], "  old 2");
        assert!(lines[5].starts_with("snap_b ("));
        assert_eq!(lines[6], "  gone");
        assert_eq!(lines[7], "-".repeat(80));
    }

    #[test]
    fn test_format_summary_pass() {
        let stats = RunStats {
            total: 3,
            created: 1,
            matched: 2,
            updated: 0,
            failed: 0,
        };
        let summary = format_summary(&stats, &ValidationReport::default());
        insta::assert_snapshot!(summary, @r###"
        PASS: snapshots
          3 checked, 1 created, 2 matched, 0 updated, 0 failed
          0 unvisited in 0 file(s)
        "###);
    }

    #[test]
    fn test_format_summary_fails_on_leftovers() {
        let dir = TempDir::new().unwrap();
        let report = report_with_leftovers(&dir, true);
        let summary = format_summary(&RunStats::new(), &report);
        insta::assert_snapshot!(summary, @r###"
        FAIL: snapshots
          0 checked, 0 created, 0 matched, 0 updated, 0 failed
          3 unvisited in 2 file(s)
        "###);
    }

    #[test]
    fn test_format_summary_tolerated_leftovers_pass() {
        let dir = TempDir::new().unwrap();
        let report = report_with_leftovers(&dir, false);
        assert!(format_summary(&RunStats::new(), &report).starts_with("PASS"));
    }
}
