//! Error types for the harness.

use snapshottest::SnapshotError;
use thiserror::Error;

/// Errors that can occur while driving a snapshot run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Any failure of the underlying snapshot store.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A snapshot assertion was made outside `before_test`/`after_test`.
    #[error("snapshot assertion made outside of a running test")]
    NoActiveTest,
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
