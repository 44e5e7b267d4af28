//! Lifecycle hooks called by the hosting test framework.
//!
//! The framework drives a run through [`SnapshotHooks`]: `before_test` and
//! `after_test` around each test, `after_file` once every test of a source
//! file has finished, and `after_run` once at the very end. [`SnapshotRun`]
//! is the implementation backed by a [`StoreRegistry`].

use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

use snapshottest::{
    snapshot_location, SnapshotError, StoreRegistry, ValidationReport, Validator, Value,
};

use crate::errors::{HarnessError, HarnessResult};
use crate::report::format_unvisited_listing;
use crate::snapshot_test::{MatchStatus, SnapshotTest, TestId};
use crate::stats::RunStats;

/// Environment variable that turns on update mode.
pub const UPDATE_ENV: &str = "SNAPSHOTTEST_UPDATE";

/// Whether [`UPDATE_ENV`] asks for update mode.
pub fn update_requested() -> bool {
    parse_update_flag(env::var(UPDATE_ENV).ok().as_deref())
}

fn parse_update_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
    }
}

/// Callbacks the test framework invokes during a run.
pub trait SnapshotHooks {
    /// A test is about to run.
    fn before_test(&mut self, test: TestId);

    /// The current test finished, whatever its outcome.
    fn after_test(&mut self);

    /// Every test of `test_file` finished. Returns whether its snapshot file
    /// was written.
    fn after_file(&mut self, test_file: &Path) -> HarnessResult<bool>;

    /// The run finished. Fails when a store forbids the snapshots left
    /// unvisited.
    fn after_run(&mut self) -> HarnessResult<RunReport>;
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStats,
    pub validation: ValidationReport,
    /// Snapshot files written by `after_run`.
    pub files_written: usize,
}

/// A test run and the snapshot stores it touches.
#[derive(Debug)]
pub struct SnapshotRun {
    registry: StoreRegistry,
    update: bool,
    current: Option<SnapshotTest>,
    files: BTreeSet<PathBuf>,
    stats: RunStats,
}

impl SnapshotRun {
    /// A run using the global config, in update mode when [`UPDATE_ENV`]
    /// says so.
    pub fn new() -> HarnessResult<Self> {
        Ok(Self::with_registry(StoreRegistry::new()?).with_update(update_requested()))
    }

    pub fn with_registry(registry: StoreRegistry) -> Self {
        Self {
            registry,
            update: false,
            current: None,
            files: BTreeSet::new(),
            stats: RunStats::new(),
        }
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn is_update(&self) -> bool {
        self.update
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StoreRegistry {
        &mut self.registry
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn current_test(&self) -> Option<&SnapshotTest> {
        self.current.as_ref()
    }

    pub fn current_test_mut(&mut self) -> Option<&mut SnapshotTest> {
        self.current.as_mut()
    }

    /// Source files that made at least one snapshot assertion.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Check `value` against the current test's next snapshot.
    pub fn assert_match(
        &mut self,
        value: impl Into<Value>,
        name: Option<&str>,
    ) -> HarnessResult<MatchStatus> {
        let test = self.current.as_mut().ok_or(HarnessError::NoActiveTest)?;
        self.files.insert(test.id().file.clone());

        match test.assert_match(&mut self.registry, value.into(), name) {
            Ok(status) => {
                self.stats.record(status);
                Ok(status)
            }
            Err(err) => {
                if matches!(
                    err,
                    SnapshotError::SnapshotMismatch { .. } | SnapshotError::SnapshotNotFound { .. }
                ) {
                    self.stats.record_failure();
                }
                Err(err.into())
            }
        }
    }
}

impl SnapshotHooks for SnapshotRun {
    fn before_test(&mut self, test: TestId) {
        tracing::debug!(test = %test.identifier(), "snapshot test started");
        self.current = Some(SnapshotTest::new(test, self.update));
    }

    fn after_test(&mut self) {
        self.current = None;
    }

    fn after_file(&mut self, test_file: &Path) -> HarnessResult<bool> {
        if !self.files.contains(test_file) {
            return Ok(false);
        }
        let (_, path) = snapshot_location(test_file);
        Ok(self.registry.save(&path)?)
    }

    fn after_run(&mut self) -> HarnessResult<RunReport> {
        self.current = None;
        let files_written = self.registry.save_all()?;

        let validation = Validator::sweep(&self.registry);
        if validation.has_failures() && validation.list_unvisited() {
            tracing::warn!("\n{}", format_unvisited_listing(&validation));
        } else if !validation.is_clean() {
            tracing::debug!(
                unvisited = validation.unvisited_count(),
                "snapshots left unvisited"
            );
        }

        let validation = validation.into_result()?;
        Ok(RunReport {
            stats: self.stats.clone(),
            validation,
            files_written,
        })
    }
}
