//! Snapshot file format.
//!
//! A store file is a RON map from snapshot key to tagged [`Value`], one
//! record per key in lexicographic key order:
//!
//! ```text
//! {
//!     "TestDemo::test_api 1": Map({
//!         Str("status"): Int(200),
//!     }),
//! }
//! ```
//!
//! Parsing never executes anything: the text is read against the fixed
//! [`Value`] grammar. RON comments are accepted, so a comment header injected
//! by a write callback reloads cleanly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ron::ser::PrettyConfig;
use ron::Options;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::errors::SnapshotError;
use crate::value::Value;

/// The records of one store, ordered by key.
pub type Snapshots = BTreeMap<String, Value>;

/// A store file that could not be read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The text does not follow the snapshot grammar.
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },
    /// The text uses a constructor that is not part of the grammar.
    Unresolvable {
        line: usize,
        column: usize,
        symbol: String,
    },
}

impl FormatError {
    /// Attach the backing file path.
    pub fn at(self, path: &Path) -> SnapshotError {
        let path = path.display().to_string();
        match self {
            FormatError::Malformed {
                line,
                column,
                message,
            } => SnapshotError::MalformedStoreFile {
                path,
                line,
                column,
                message,
            },
            FormatError::Unresolvable {
                line,
                column,
                symbol,
            } => SnapshotError::UnresolvableReference {
                path,
                line,
                column,
                symbol,
            },
        }
    }
}

fn pretty_config() -> PrettyConfig {
    PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(false)
}

/// Shared by rendering and parsing so both accept the same nesting depth.
fn options() -> Options {
    Options::default().without_recursion_limit()
}

/// Render every record of a store.
pub fn render(snapshots: &Snapshots) -> Result<String, ron::Error> {
    let mut text = options().to_string_pretty(snapshots, pretty_config())?;
    text.push('\n');
    Ok(text)
}

/// Render a single value in its canonical form.
pub fn render_value(value: &Value) -> Result<String, ron::Error> {
    options().to_string_pretty(value, pretty_config())
}

/// Parse a store file.
///
/// Text holding nothing but whitespace and comments is an empty store. A key
/// recorded twice is malformed.
pub fn parse(text: &str) -> Result<Snapshots, FormatError> {
    if is_blank(text) {
        return Ok(Snapshots::new());
    }
    options()
        .from_str::<Records>(text)
        .map(|records| records.0)
        .map_err(|err| {
            let line = err.position.line;
            let column = err.position.col;
            match err.code {
                ron::Error::NoSuchEnumVariant { found, .. } => FormatError::Unresolvable {
                    line,
                    column,
                    symbol: found,
                },
                code => FormatError::Malformed {
                    line,
                    column,
                    message: code.to_string(),
                },
            }
        })
}

/// Parse a single value.
pub fn parse_value(text: &str) -> Result<Value, FormatError> {
    options().from_str(text).map_err(|err| FormatError::Malformed {
        line: err.position.line,
        column: err.position.col,
        message: err.code.to_string(),
    })
}

/// Top-level map of a store file, rejecting repeated keys.
struct Records(Snapshots);

impl<'de> Deserialize<'de> for Records {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordsVisitor)
    }
}

struct RecordsVisitor;

impl<'de> Visitor<'de> for RecordsVisitor {
    type Value = Records;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of snapshot records")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Records, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut snapshots = Snapshots::new();
        while let Some(key) = access.next_key::<String>()? {
            if snapshots.contains_key(&key) {
                return Err(de::Error::custom(format!(
                    "duplicate snapshot key `{}`",
                    key
                )));
            }
            let value = access.next_value::<Value>()?;
            snapshots.insert(key, value);
        }
        Ok(Records(snapshots))
    }
}

fn is_blank(text: &str) -> bool {
    let mut rest = text.trim_start();
    loop {
        if rest.is_empty() {
            return true;
        }
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |idx| &after[idx..]).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            match after.find("*/") {
                Some(idx) => rest = after[idx + 2..].trim_start(),
                None => return false,
            }
        } else {
            return false;
        }
    }
}
