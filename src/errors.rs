//! Error types for the snapshot store.
//!
//! Every error propagates to the caller unmodified. The only condition the
//! store absorbs is a backing file that does not exist yet, which loads as an
//! empty store.

use thiserror::Error;

/// Errors that can occur while loading, comparing, validating or saving
/// snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A backing file exists but is not a valid snapshot file.
    #[error("malformed snapshot file {path}:{line}:{column}: {message}")]
    MalformedStoreFile {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// A backing file names a value constructor this crate does not know.
    #[error("snapshot file {path}:{line}:{column} references unknown symbol `{symbol}`")]
    UnresolvableReference {
        path: String,
        line: usize,
        column: usize,
        symbol: String,
    },

    /// Lookup of an absent key while snapshot creation is disabled.
    #[error("snapshot `{key}` not found in {module} and creating snapshots is disabled")]
    SnapshotNotFound { module: String, key: String },

    /// The stored snapshot disagrees with the produced value.
    #[error("snapshot `{key}` does not match the stored value:\n{diff}")]
    SnapshotMismatch { key: String, diff: String },

    /// Stored snapshots were never visited and policy forbids leftovers.
    #[error("{module} left {} unvisited snapshot(s): {}", .keys.len(), .keys.join(", "))]
    UnvisitedSnapshotsLeft { module: String, keys: Vec<String> },

    /// A store was resolved again with an explicit config that differs from
    /// the one it was created with.
    #[error("snapshot store {path} is already open with a different config")]
    ConfigConflict { path: String },

    /// The configuration file could not be read or is contradictory.
    #[error("invalid snapshot config {path}: {message}")]
    Config { path: String, message: String },

    /// The store could not be rendered to text.
    #[error("failed to render snapshot file {path}: {message}")]
    Render { path: String, message: String },

    /// A value could not be converted into a snapshot value.
    #[error("value cannot be snapshotted: {message}")]
    Unsupported { message: String },

    /// Filesystem error while reading or writing a backing file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
