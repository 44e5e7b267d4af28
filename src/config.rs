//! Snapshot configuration.
//!
//! A store's config comes from, in priority order: an explicit override
//! passed when the store is resolved, the registry's global config (by
//! default read once per process from [`CONFIG_FILE_NAME`]), or the built-in
//! defaults.
//!
//! ```toml
//! [snapshottest]
//! allow_create = true
//! fail_on_unvisited = true
//! list_unvisited = true
//! package_marker = "README.md"
//! ```
//!
//! Two older spellings of the leftover-snapshot policy are still accepted:
//! `allow_unvisited = x` means `fail_on_unvisited = !x`, and
//! `fail_on_unused = x` means `fail_on_unvisited = x`. Settings that
//! contradict each other are rejected.

use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::{SnapshotError, SnapshotResult};

/// File read by [`global`], relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "snapshottest.toml";

/// Resolved options for one snapshot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Create a snapshot when a key has none yet.
    pub allow_create: bool,
    /// Treat stored snapshots that were never visited as an error.
    pub fail_on_unvisited: bool,
    /// When validation fails, list every unvisited snapshot of every store.
    pub list_unvisited: bool,
    /// File created next to each saved store file when missing.
    pub package_marker: Option<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            allow_create: true,
            fail_on_unvisited: false,
            list_unvisited: false,
            package_marker: None,
        }
    }
}

/// Reasons a config document is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has mistyped options.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Two spellings of the leftover policy disagree.
    #[error("`{key}` contradicts `{other}`")]
    Contradiction {
        key: &'static str,
        other: &'static str,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    snapshottest: RawSection,
}

#[derive(Debug, Default, Deserialize)]
struct RawSection {
    allow_create: Option<bool>,
    #[serde(alias = "failOnUnvisited")]
    fail_on_unvisited: Option<bool>,
    allow_unvisited: Option<bool>,
    fail_on_unused: Option<bool>,
    list_unvisited: Option<bool>,
    package_marker: Option<String>,
}

impl RawSection {
    /// Reconcile the three spellings of the leftover policy.
    fn leftover_policy(&self) -> Result<Option<bool>, ConfigError> {
        let candidates = [
            ("fail_on_unvisited", self.fail_on_unvisited),
            ("allow_unvisited", self.allow_unvisited.map(|allow| !allow)),
            ("fail_on_unused", self.fail_on_unused),
        ];
        let mut decided: Option<(&'static str, bool)> = None;
        for (name, fail) in candidates {
            if let Some(fail) = fail {
                match decided {
                    Some((first, previous)) if previous != fail => {
                        return Err(ConfigError::Contradiction {
                            key: name,
                            other: first,
                        });
                    }
                    Some(_) => {}
                    None => decided = Some((name, fail)),
                }
            }
        }
        Ok(decided.map(|(_, fail)| fail))
    }
}

impl SnapshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_create(mut self, allow: bool) -> Self {
        self.allow_create = allow;
        self
    }

    pub fn with_fail_on_unvisited(mut self, fail: bool) -> Self {
        self.fail_on_unvisited = fail;
        self
    }

    pub fn with_list_unvisited(mut self, list: bool) -> Self {
        self.list_unvisited = list;
        self
    }

    pub fn with_package_marker(mut self, marker: impl Into<String>) -> Self {
        self.package_marker = Some(marker.into());
        self
    }

    /// Overlay the `[snapshottest]` section of a TOML document on the
    /// defaults. Unknown keys are ignored.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let section = file.snapshottest;
        let mut config = Self::default();
        if let Some(allow) = section.allow_create {
            config.allow_create = allow;
        }
        if let Some(fail) = section.leftover_policy()? {
            config.fail_on_unvisited = fail;
        }
        if let Some(list) = section.list_unvisited {
            config.list_unvisited = list;
        }
        if section.package_marker.is_some() {
            config.package_marker = section.package_marker;
        }
        Ok(config)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;

        Self::from_toml_str(&content).map_err(|e| SnapshotError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

static GLOBAL: OnceCell<SnapshotConfig> = OnceCell::new();

/// Process-wide default config, read from [`CONFIG_FILE_NAME`] on first use.
pub fn global() -> SnapshotResult<&'static SnapshotConfig> {
    GLOBAL.get_or_try_init(|| {
        let config = SnapshotConfig::load(Path::new(CONFIG_FILE_NAME))?;
        tracing::debug!(?config, "loaded global snapshot config");
        Ok(config)
    })
}
