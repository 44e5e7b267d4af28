//! One [`SnapshotStore`] per backing file.
//!
//! The registry is an ordinary value owned by whoever drives the test run and
//! lent to the code that needs stores. Resolving the same path twice yields
//! the same store, so every caller observes the same in-memory state.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::callbacks::WriteCallbackChain;
use crate::config::{self, SnapshotConfig};
use crate::errors::{SnapshotError, SnapshotResult};
use crate::store::SnapshotStore;

/// Directory, next to the test file, holding its snapshot file.
pub const SNAPSHOT_DIR: &str = "snapshots";

/// Extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "ron";

/// Backing file path and module name for the snapshots of `test_file`.
///
/// `tests/api.rs` maps to `tests/snapshots/snap_api.ron`, module
/// `snapshots::snap_api`.
pub fn snapshot_location(test_file: &Path) -> (String, PathBuf) {
    let stem = test_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("snap_{}", stem);
    let dir = test_file.parent().unwrap_or_else(|| Path::new(""));
    let path = dir
        .join(SNAPSHOT_DIR)
        .join(format!("{}.{}", name, SNAPSHOT_EXTENSION));
    (format!("{}::{}", SNAPSHOT_DIR, name), path)
}

/// Cache of open stores keyed by backing file path.
#[derive(Debug)]
pub struct StoreRegistry {
    global: SnapshotConfig,
    stores: BTreeMap<PathBuf, SnapshotStore>,
    callbacks: WriteCallbackChain,
}

impl StoreRegistry {
    /// A registry whose default config is [`config::global`].
    pub fn new() -> SnapshotResult<Self> {
        Ok(Self::with_config(config::global()?.clone()))
    }

    /// A registry with an explicit default config.
    pub fn with_config(global: SnapshotConfig) -> Self {
        Self {
            global,
            stores: BTreeMap::new(),
            callbacks: WriteCallbackChain::new(),
        }
    }

    /// Config given to stores resolved without an override.
    pub fn global_config(&self) -> &SnapshotConfig {
        &self.global
    }

    /// The store for `path`, opening it on first use.
    ///
    /// `config` applies when the store is first opened. Passing a different
    /// config for an already open store is an error.
    pub fn resolve(
        &mut self,
        module: &str,
        path: impl Into<PathBuf>,
        config: Option<SnapshotConfig>,
    ) -> SnapshotResult<&mut SnapshotStore> {
        match self.stores.entry(path.into()) {
            Entry::Occupied(entry) => {
                let store = entry.into_mut();
                if let Some(config) = config {
                    if &config != store.config() {
                        return Err(SnapshotError::ConfigConflict {
                            path: store.path().display().to_string(),
                        });
                    }
                }
                Ok(store)
            }
            Entry::Vacant(entry) => {
                let config = config.unwrap_or_else(|| self.global.clone());
                let store = SnapshotStore::open(module, entry.key().clone(), config)?;
                tracing::debug!(module, path = %store.path().display(), "opened snapshot store");
                Ok(entry.insert(store))
            }
        }
    }

    /// The store for the snapshots of `test_file`, see [`snapshot_location`].
    pub fn resolve_for_test_file(&mut self, test_file: &Path) -> SnapshotResult<&mut SnapshotStore> {
        let (module, path) = snapshot_location(test_file);
        self.resolve(&module, path, None)
    }

    pub fn get(&self, path: &Path) -> Option<&SnapshotStore> {
        self.stores.get(path)
    }

    /// Every store resolved so far, ordered by path.
    pub fn all_stores(&self) -> impl Iterator<Item = &SnapshotStore> {
        self.stores.values()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Add a transform applied by every later save, of every store.
    pub fn register_before_file_write_callback<F>(&mut self, callback: F)
    where
        F: Fn(String) -> String + 'static,
    {
        self.callbacks.register(callback);
    }

    pub fn clear_before_file_write_callbacks(&mut self) {
        self.callbacks.clear();
    }

    /// Save the store for `path`. Returns whether a write happened; unknown
    /// paths write nothing.
    pub fn save(&mut self, path: &Path) -> SnapshotResult<bool> {
        match self.stores.get_mut(path) {
            Some(store) => store.save(&self.callbacks),
            None => Ok(false),
        }
    }

    /// Save every dirty store. Returns how many files were written.
    pub fn save_all(&mut self) -> SnapshotResult<usize> {
        let mut written = 0;
        for store in self.stores.values_mut() {
            if store.save(&self.callbacks)? {
                written += 1;
            }
        }
        Ok(written)
    }
}
