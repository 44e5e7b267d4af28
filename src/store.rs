//! The per-test-file snapshot store.
//!
//! A [`SnapshotStore`] owns the snapshots of one test source file together
//! with the state of the current run: which keys were visited, which were
//! created or failed, and whether anything needs saving.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::callbacks::WriteCallbackChain;
use crate::config::SnapshotConfig;
use crate::diff::{self, Mismatch};
use crate::errors::{SnapshotError, SnapshotResult};
use crate::serializer::{self, Snapshots};
use crate::value::Value;

/// Result of checking a produced value against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// No snapshot existed; the produced value was stored.
    Created,
    /// The stored snapshot equals the produced value.
    Match,
    /// The stored snapshot differs; the store was left unchanged.
    Mismatch(Mismatch),
}

impl ComparisonOutcome {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ComparisonOutcome::Mismatch(_))
    }
}

/// Snapshots of one test source file, backed by one file on disk.
#[derive(Debug)]
pub struct SnapshotStore {
    module: String,
    path: PathBuf,
    config: SnapshotConfig,
    snapshots: Snapshots,
    visited: BTreeSet<String>,
    created: BTreeSet<String>,
    failed: BTreeSet<String>,
    dirty: bool,
}

impl SnapshotStore {
    /// An empty store. Nothing is read from disk.
    pub fn new(module: impl Into<String>, path: impl Into<PathBuf>, config: SnapshotConfig) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
            config,
            snapshots: Snapshots::new(),
            visited: BTreeSet::new(),
            created: BTreeSet::new(),
            failed: BTreeSet::new(),
            dirty: false,
        }
    }

    /// A store populated from its backing file, if that file exists.
    pub fn open(
        module: impl Into<String>,
        path: impl Into<PathBuf>,
        config: SnapshotConfig,
    ) -> SnapshotResult<Self> {
        let mut store = Self::new(module, path, config);
        store.load()?;
        Ok(store)
    }

    /// Replace the in-memory snapshots with the backing file's contents.
    ///
    /// A missing file leaves the store empty and is not created.
    pub fn load(&mut self) -> SnapshotResult<()> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no snapshot file yet");
            self.snapshots.clear();
            return Ok(());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| SnapshotError::io(&self.path, e))?;
        self.snapshots = serializer::parse(&text).map_err(|e| e.at(&self.path))?;
        self.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            snapshots = self.snapshots.len(),
            "loaded snapshot file"
        );
        Ok(())
    }

    /// Compare `produced` with the snapshot stored under `key`, creating it
    /// when absent and creation is allowed.
    pub fn get_or_create(&mut self, key: &str, produced: Value) -> SnapshotResult<ComparisonOutcome> {
        self.get_or_create_with(key, produced, diff::compare)
    }

    /// Like [`get_or_create`](Self::get_or_create), with a caller-supplied
    /// equality hook.
    pub fn get_or_create_with<F>(
        &mut self,
        key: &str,
        produced: Value,
        equality: F,
    ) -> SnapshotResult<ComparisonOutcome>
    where
        F: FnOnce(&Value, &Value) -> Result<(), Mismatch>,
    {
        let outcome = match self.snapshots.get(key) {
            Some(stored) => match equality(stored, &produced) {
                Ok(()) => ComparisonOutcome::Match,
                Err(mismatch) => {
                    tracing::warn!(module = %self.module, key, "snapshot mismatch");
                    self.failed.insert(key.to_string());
                    ComparisonOutcome::Mismatch(mismatch)
                }
            },
            None => {
                if !self.config.allow_create {
                    return Err(SnapshotError::SnapshotNotFound {
                        module: self.module.clone(),
                        key: key.to_string(),
                    });
                }
                tracing::debug!(module = %self.module, key, "creating snapshot");
                self.snapshots.insert(key.to_string(), produced);
                self.created.insert(key.to_string());
                self.dirty = true;
                ComparisonOutcome::Created
            }
        };
        self.visited.insert(key.to_string());
        Ok(outcome)
    }

    /// [`get_or_create`](Self::get_or_create) turning a mismatch into
    /// [`SnapshotError::SnapshotMismatch`].
    pub fn assert_match(&mut self, key: &str, produced: Value) -> SnapshotResult<ComparisonOutcome> {
        match self.get_or_create(key, produced)? {
            ComparisonOutcome::Mismatch(mismatch) => Err(SnapshotError::SnapshotMismatch {
                key: key.to_string(),
                diff: mismatch.to_string(),
            }),
            outcome => Ok(outcome),
        }
    }

    /// The snapshot stored under `key`. Does not count as a visit.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.snapshots.get(key)
    }

    /// Overwrite the snapshot under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.snapshots.insert(key.into(), value);
        self.dirty = true;
    }

    /// Mark `key` visited. Keys that are not stored are ignored and `false`
    /// is returned.
    pub fn visit(&mut self, key: &str) -> bool {
        if self.snapshots.contains_key(key) {
            self.visited.insert(key.to_string());
            true
        } else {
            false
        }
    }

    /// Stored keys not visited during this run, sorted.
    pub fn unvisited_snapshots(&self) -> Vec<&str> {
        self.snapshots
            .keys()
            .filter(|key| !self.visited.contains(key.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Fails when snapshots were left unvisited and the config forbids it.
    pub fn validate_before_close(&self) -> SnapshotResult<()> {
        let unvisited = self.unvisited_snapshots();
        if unvisited.is_empty() || !self.config.fail_on_unvisited {
            return Ok(());
        }
        Err(SnapshotError::UnvisitedSnapshotsLeft {
            module: self.module.clone(),
            keys: unvisited.into_iter().map(str::to_string).collect(),
        })
    }

    /// The file text for the current snapshots, before write callbacks.
    pub fn render(&self) -> SnapshotResult<String> {
        serializer::render(&self.snapshots).map_err(|e| SnapshotError::Render {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Write the store to its backing file if anything changed.
    ///
    /// Returns whether a write happened.
    pub fn save(&mut self, callbacks: &WriteCallbackChain) -> SnapshotResult<bool> {
        if !self.dirty {
            return Ok(false);
        }

        let text = callbacks.apply(self.render()?);

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))?;
            if let Some(marker) = &self.config.package_marker {
                let marker_path = dir.join(marker);
                if !marker_path.exists() {
                    fs::write(&marker_path, "").map_err(|e| SnapshotError::io(&marker_path, e))?;
                }
            }
        }

        fs::write(&self.path, text).map_err(|e| SnapshotError::io(&self.path, e))?;
        self.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            snapshots = self.snapshots.len(),
            "saved snapshot file"
        );
        Ok(true)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.snapshots.keys().map(String::as_str)
    }

    /// Keys created during this run.
    pub fn new_snapshots(&self) -> impl Iterator<Item = &str> {
        self.created.iter().map(String::as_str)
    }

    /// Keys that mismatched during this run.
    pub fn failed_snapshots(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(String::as_str)
    }

    /// Keys visited during this run.
    pub fn visited_snapshots(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(String::as_str)
    }
}
