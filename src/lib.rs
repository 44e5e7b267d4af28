//! Snapshot storage and comparison for tests.
//!
//! Expected test outputs ("snapshots") are kept in one RON file per test
//! source file, reloaded on later runs, and compared structurally against
//! freshly produced values. Stored snapshots that no test looked at during a
//! run can be reported or rejected.
//!
//! ## Modules
//!
//! - [`value`] - The snapshot value model
//! - [`serializer`] - Deterministic RON rendering and non-executing parsing
//! - [`diff`] - Structural comparison and difference lines
//! - [`store`] - The per-test-file snapshot store
//! - [`callbacks`] - Transforms applied to a store file before it is written
//! - [`registry`] - One store per backing file
//! - [`validator`] - End-of-run unvisited snapshot sweep
//! - [`config`] - Options and the `snapshottest.toml` overlay
//! - [`errors`] - Error types
//!
//! ## Example
//!
//! ```no_run
//! use snapshottest::{ComparisonOutcome, SnapshotConfig, StoreRegistry, Value};
//!
//! let mut registry = StoreRegistry::with_config(SnapshotConfig::default());
//! let store = registry
//!     .resolve_for_test_file(std::path::Path::new("tests/api.rs"))
//!     .unwrap();
//! let outcome = store
//!     .get_or_create("Api::test_status 1", Value::map([("status", 200)]))
//!     .unwrap();
//! assert!(!outcome.is_mismatch());
//! registry.save_all().unwrap();
//! ```

pub mod callbacks;
pub mod config;
pub mod diff;
pub mod errors;
pub mod registry;
pub mod serializer;
pub mod store;
pub mod validator;
pub mod value;

pub use callbacks::{WriteCallback, WriteCallbackChain};
pub use config::{ConfigError, SnapshotConfig, CONFIG_FILE_NAME};
pub use diff::{compare, DiffLine, DiffSide, Mismatch, PrettyDiff};
pub use errors::{SnapshotError, SnapshotResult};
pub use registry::{snapshot_location, StoreRegistry};
pub use serializer::{FormatError, Snapshots};
pub use store::{ComparisonOutcome, SnapshotStore};
pub use validator::{UnvisitedEntry, ValidationReport, Validator};
pub use value::Value;
