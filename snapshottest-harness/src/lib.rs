//! Test-framework integration for snapshottest.
//!
//! A hosting test framework drives a [`SnapshotRun`] through the
//! [`SnapshotHooks`] lifecycle and makes assertions with
//! [`assert_match_snapshot!`]. Snapshot keys are derived from the test
//! identity, files are saved when their tests finish, and stale snapshots
//! are checked when the run ends.
//!
//! ## Modules
//!
//! - [`snapshot_test`] - Per-test context and snapshot key derivation
//! - [`lifecycle`] - The hooks trait and the run driver
//! - [`stats`] - Assertion totals
//! - [`report`] - Plain-text unvisited listing and run summary
//! - [`errors`] - Error types for the harness
//!
//! ## Update mode
//!
//! Setting `SNAPSHOTTEST_UPDATE=1` makes every assertion overwrite its
//! stored snapshot instead of comparing against it.

#[macro_use]
mod macros;

pub mod errors;
pub mod lifecycle;
pub mod report;
pub mod snapshot_test;
pub mod stats;

pub use errors::{HarnessError, HarnessResult};
pub use lifecycle::{update_requested, RunReport, SnapshotHooks, SnapshotRun, UPDATE_ENV};
pub use report::{format_summary, format_unvisited_listing, RunSummary, UnvisitedListing};
pub use snapshot_test::{EqualityHook, MatchStatus, SnapshotTest, TestId};
pub use stats::RunStats;
