//! Snapshot assertion macros.

/// Assert that a value matches the current test's next snapshot.
///
/// Panics with the error text (for a mismatch, the diff) when the assertion
/// fails, and evaluates to the [`MatchStatus`](crate::MatchStatus) otherwise.
///
/// # Arguments
///
/// - `run`: the [`SnapshotRun`](crate::SnapshotRun) driving the test
/// - `value`: anything convertible into a snapshot `Value`
/// - `name` (optional): an explicit snapshot name instead of the counter
///
/// # Example
///
/// ```ignore
/// run.before_test(TestId::new(file!(), "Api", "test_status"));
/// assert_match_snapshot!(run, Value::map([("status", 200)]));
/// assert_match_snapshot!(run, "ok", "body");
/// run.after_test();
/// ```
#[macro_export]
macro_rules! assert_match_snapshot {
    ($run:expr, $value:expr) => {{
        match $run.assert_match($value, None) {
            Ok(status) => status,
            Err(err) => panic!("{}", err),
        }
    }};

    ($run:expr, $value:expr, $name:expr) => {{
        match $run.assert_match($value, Some($name)) {
            Ok(status) => status,
            Err(err) => panic!("{}", err),
        }
    }};
}
