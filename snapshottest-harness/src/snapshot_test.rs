//! Per-test snapshot context.

use std::fmt;
use std::path::PathBuf;

use snapshottest::{ComparisonOutcome, Mismatch, SnapshotError, SnapshotResult, StoreRegistry, Value};

/// Identity of one test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId {
    /// Source file the test is defined in. Selects the snapshot store.
    pub file: PathBuf,
    /// Enclosing suite, e.g. the test module or fixture type.
    pub group: String,
    pub name: String,
}

impl TestId {
    pub fn new(file: impl Into<PathBuf>, group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            group: group.into(),
            name: name.into(),
        }
    }

    /// `group::name`, the prefix of every snapshot key of this test.
    pub fn identifier(&self) -> String {
        format!("{}::{}", self.group, self.name)
    }
}

/// What an assertion did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// No snapshot existed; the value was recorded.
    Created,
    /// The stored snapshot equals the value.
    Matched,
    /// Update mode overwrote the stored snapshot.
    Updated,
}

/// Equality used to compare a stored snapshot with a produced value.
pub type EqualityHook = Box<dyn Fn(&Value, &Value) -> Result<(), Mismatch>>;

/// Snapshot state of the test currently running.
pub struct SnapshotTest {
    id: TestId,
    counter: usize,
    update: bool,
    equality: Option<EqualityHook>,
}

impl SnapshotTest {
    pub fn new(id: TestId, update: bool) -> Self {
        Self {
            id,
            counter: 1,
            update,
            equality: None,
        }
    }

    /// Compare with `hook` instead of structural equality.
    pub fn with_equality<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<(), Mismatch> + 'static,
    {
        self.equality = Some(Box::new(hook));
        self
    }

    pub fn set_equality<F>(&mut self, hook: F)
    where
        F: Fn(&Value, &Value) -> Result<(), Mismatch> + 'static,
    {
        self.equality = Some(Box::new(hook));
    }

    pub fn id(&self) -> &TestId {
        &self.id
    }

    pub fn is_update(&self) -> bool {
        self.update
    }

    /// Key of the next snapshot.
    ///
    /// Unnamed snapshots are numbered from 1 in assertion order, named ones
    /// use their name and leave the numbering alone.
    pub fn snapshot_key(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{}::{}", self.id.identifier(), name),
            None => format!("{} {}", self.id.identifier(), self.counter),
        }
    }

    /// Check `value` against the store of this test's file.
    ///
    /// A mismatch is returned as [`SnapshotError::SnapshotMismatch`] carrying
    /// the diff text.
    pub fn assert_match(
        &mut self,
        registry: &mut StoreRegistry,
        value: Value,
        name: Option<&str>,
    ) -> SnapshotResult<MatchStatus> {
        let key = self.snapshot_key(name);
        if name.is_none() {
            self.counter += 1;
        }

        let store = registry.resolve_for_test_file(&self.id.file)?;

        if self.update {
            store.set(key.as_str(), value);
            store.visit(&key);
            return Ok(MatchStatus::Updated);
        }

        let outcome = match &self.equality {
            Some(hook) => store.get_or_create_with(&key, value, |stored, produced| hook(stored, produced))?,
            None => store.get_or_create(&key, value)?,
        };
        match outcome {
            ComparisonOutcome::Created => Ok(MatchStatus::Created),
            ComparisonOutcome::Match => Ok(MatchStatus::Matched),
            ComparisonOutcome::Mismatch(mismatch) => Err(SnapshotError::SnapshotMismatch {
                key,
                diff: mismatch.to_string(),
            }),
        }
    }
}

impl fmt::Debug for SnapshotTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotTest")
            .field("id", &self.id)
            .field("counter", &self.counter)
            .field("update", &self.update)
            .field("custom_equality", &self.equality.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapshottest::SnapshotConfig;
    use tempfile::TempDir;

    fn test_in(dir: &TempDir, update: bool) -> SnapshotTest {
        SnapshotTest::new(
            TestId::new(dir.path().join("test_demo.rs"), "TestDemo", "test_api"),
            update,
        )
    }

    fn registry() -> StoreRegistry {
        StoreRegistry::with_config(SnapshotConfig::default())
    }

    #[test]
    fn test_identifier() {
        let id = TestId::new("tests/demo.rs", "TestDemo", "test_api");
        assert_eq!(id.identifier(), "TestDemo::test_api");
    }

    #[test]
    fn test_unnamed_keys_are_numbered() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let mut test = test_in(&dir, false);

        assert_eq!(test.snapshot_key(None), "TestDemo::test_api 1");
        test.assert_match(&mut registry, Value::from(1), None).unwrap();
        assert_eq!(test.snapshot_key(None), "TestDemo::test_api 2");
    }

    #[test]
    fn test_named_keys_do_not_advance_counter() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let mut test = test_in(&dir, false);

        test.assert_match(&mut registry, Value::from(1), Some("first")).unwrap();
        test.assert_match(&mut registry, Value::from(2), None).unwrap();

        let store = registry.resolve_for_test_file(&test.id().file).unwrap();
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, vec!["TestDemo::test_api 1", "TestDemo::test_api::first"]);
    }

    #[test]
    fn test_created_then_matched() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();

        let mut first = test_in(&dir, false);
        let status = first.assert_match(&mut registry, Value::from("v"), None).unwrap();
        assert_eq!(status, MatchStatus::Created);

        let mut second = test_in(&dir, false);
        let status = second.assert_match(&mut registry, Value::from("v"), None).unwrap();
        assert_eq!(status, MatchStatus::Matched);
    }

    #[test]
    fn test_mismatch_carries_diff() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        test_in(&dir, false)
            .assert_match(&mut registry, Value::map([("a", 1)]), None)
            .unwrap();

        let err = test_in(&dir, false)
            .assert_match(&mut registry, Value::map([("a", 2)]), None)
            .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r###"
        snapshot `TestDemo::test_api 1` does not match the stored value:
        - ["a"]: 1
        + ["a"]: 2
        "###);
    }

    #[test]
    fn test_update_mode_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        test_in(&dir, false)
            .assert_match(&mut registry, Value::from(1), None)
            .unwrap();

        let status = test_in(&dir, true)
            .assert_match(&mut registry, Value::from(2), None)
            .unwrap();
        assert_eq!(status, MatchStatus::Updated);

        let store = registry.resolve_for_test_file(&dir.path().join("test_demo.rs")).unwrap();
        assert_eq!(store.get("TestDemo::test_api 1"), Some(&Value::from(2)));
        assert!(store.unvisited_snapshots().is_empty());
    }

    #[test]
    fn test_custom_equality() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        test_in(&dir, false)
            .assert_match(&mut registry, Value::from(1.0), None)
            .unwrap();

        let mut approx = test_in(&dir, false).with_equality(|stored, produced| match (stored, produced) {
            (Value::Float(a), Value::Float(b)) if (a - b).abs() < 1e-6 => Ok(()),
            _ => Err(Mismatch::new(stored, produced)),
        });
        let status = approx
            .assert_match(&mut registry, Value::from(1.0000001), None)
            .unwrap();
        assert_eq!(status, MatchStatus::Matched);
    }
}
