//! End-of-run check for snapshots nobody looked at.

use std::path::PathBuf;

use crate::errors::{SnapshotError, SnapshotResult};
use crate::registry::StoreRegistry;

/// Unvisited snapshots of one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnvisitedEntry {
    pub module: String,
    pub path: PathBuf,
    pub keys: Vec<String>,
    /// The store's config forbids leftovers, so this entry fails the run.
    pub fatal: bool,
    /// The store's config asks for the full listing on failure.
    pub list_unvisited: bool,
}

/// Every unvisited snapshot across a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    entries: Vec<UnvisitedEntry>,
}

impl ValidationReport {
    /// Stores with unvisited snapshots, ordered by path.
    pub fn entries(&self) -> &[UnvisitedEntry] {
        &self.entries
    }

    /// No store has unvisited snapshots.
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// At least one store forbids the leftovers it has.
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|e| e.fatal)
    }

    pub fn unvisited_count(&self) -> usize {
        self.entries.iter().map(|e| e.keys.len()).sum()
    }

    /// A failing store asked for the full listing.
    pub fn list_unvisited(&self) -> bool {
        self.entries.iter().any(|e| e.fatal && e.list_unvisited)
    }

    /// The first failing store as an error, or the report itself.
    pub fn into_result(self) -> SnapshotResult<Self> {
        match self.entries.iter().find(|e| e.fatal) {
            Some(entry) => Err(SnapshotError::UnvisitedSnapshotsLeft {
                module: entry.module.clone(),
                keys: entry.keys.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// Applies the `validate_before_close` policy to every store of a registry.
pub struct Validator;

impl Validator {
    /// Check every store without stopping at the first failure.
    pub fn sweep(registry: &StoreRegistry) -> ValidationReport {
        let mut entries = Vec::new();
        for store in registry.all_stores() {
            let keys: Vec<String> = store
                .unvisited_snapshots()
                .into_iter()
                .map(str::to_string)
                .collect();
            let fatal = store.config().fail_on_unvisited;
            if keys.is_empty() {
                continue;
            }
            tracing::debug!(module = store.module(), unvisited = keys.len(), fatal, "unvisited snapshots");
            entries.push(UnvisitedEntry {
                module: store.module().to_string(),
                path: store.path().to_path_buf(),
                keys,
                fatal,
                list_unvisited: store.config().list_unvisited,
            });
        }
        ValidationReport { entries }
    }

    /// [`sweep`](Self::sweep), failing on the first store that forbids its
    /// leftovers.
    pub fn validate(registry: &StoreRegistry) -> SnapshotResult<ValidationReport> {
        Self::sweep(registry).into_result()
    }
}
