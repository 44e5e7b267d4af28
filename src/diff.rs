//! Structural comparison of snapshot values.
//!
//! Equality decisions never depend on the diff text: [`compare`] decides with
//! `==` and only builds [`DiffLine`]s once the values are known to differ.

use std::collections::BTreeSet;
use std::fmt;

use crate::value::Value;

/// Which side of the comparison a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    /// Present in the stored snapshot only.
    Expected,
    /// Present in the produced value only.
    Actual,
}

impl DiffSide {
    pub fn marker(self) -> char {
        match self {
            DiffSide::Expected => '-',
            DiffSide::Actual => '+',
        }
    }
}

/// A single difference between the stored and the produced value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub side: DiffSide,
    /// Location inside the value, e.g. `["items"][2]`. Empty at the root.
    pub path: String,
    /// Compact rendering of the value at `path`.
    pub value: String,
}

impl DiffLine {
    fn new(side: DiffSide, path: &str, value: &Value) -> Self {
        Self {
            side,
            path: path.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} {}", self.side.marker(), self.value)
        } else {
            write!(f, "{} {}: {}", self.side.marker(), self.path, self.value)
        }
    }
}

/// The stored and produced values differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub lines: Vec<DiffLine>,
}

impl Mismatch {
    pub fn new(expected: &Value, actual: &Value) -> Self {
        Self {
            lines: diff(expected, actual),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for Mismatch {}

/// Equality used when a produced value is checked against a stored one.
///
/// The store calls this unless a test framework supplies its own hook.
pub fn compare(expected: &Value, actual: &Value) -> Result<(), Mismatch> {
    if expected == actual {
        Ok(())
    } else {
        Err(Mismatch::new(expected, actual))
    }
}

/// Difference lines between `expected` and `actual`. Empty when equal.
pub fn diff(expected: &Value, actual: &Value) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    diff_at("", expected, actual, &mut lines);
    lines
}

fn diff_at(path: &str, expected: &Value, actual: &Value, lines: &mut Vec<DiffLine>) {
    if expected == actual {
        return;
    }
    match (expected, actual) {
        (Value::Seq(left), Value::Seq(right)) => {
            for (idx, (l, r)) in left.iter().zip(right.iter()).enumerate() {
                diff_at(&format!("{}[{}]", path, idx), l, r, lines);
            }
            let common = left.len().min(right.len());
            for (idx, item) in left.iter().enumerate().skip(common) {
                lines.push(DiffLine::new(
                    DiffSide::Expected,
                    &format!("{}[{}]", path, idx),
                    item,
                ));
            }
            for (idx, item) in right.iter().enumerate().skip(common) {
                lines.push(DiffLine::new(
                    DiffSide::Actual,
                    &format!("{}[{}]", path, idx),
                    item,
                ));
            }
        }
        (Value::Map(left), Value::Map(right)) => {
            let keys: BTreeSet<&Value> = left.keys().chain(right.keys()).collect();
            for key in keys {
                let key_path = format!("{}[{}]", path, key);
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => diff_at(&key_path, l, r, lines),
                    (Some(l), None) => lines.push(DiffLine::new(DiffSide::Expected, &key_path, l)),
                    (None, Some(r)) => lines.push(DiffLine::new(DiffSide::Actual, &key_path, r)),
                    (None, None) => {}
                }
            }
        }
        (Value::Set(left), Value::Set(right)) => {
            for member in left.difference(right) {
                lines.push(DiffLine::new(DiffSide::Expected, path, member));
            }
            for member in right.difference(left) {
                lines.push(DiffLine::new(DiffSide::Actual, path, member));
            }
        }
        _ => {
            lines.push(DiffLine::new(DiffSide::Expected, path, expected));
            lines.push(DiffLine::new(DiffSide::Actual, path, actual));
        }
    }
}

/// Wrapper routing `==` through [`compare`], for use with `assert_eq!`.
///
/// `Debug` prints the canonical multi-line form so a failing assertion shows
/// both values the way they are stored.
#[derive(Clone)]
pub struct PrettyDiff<'a>(pub &'a Value);

impl PartialEq for PrettyDiff<'_> {
    fn eq(&self, other: &Self) -> bool {
        compare(self.0, other.0).is_ok()
    }
}

impl fmt::Debug for PrettyDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::serializer::render_value(self.0) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(lines: &[DiffLine]) -> String {
        lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_equal_values_have_no_lines() {
        let value = Value::map([("a", 1)]);
        assert!(diff(&value, &value.clone()).is_empty());
        assert!(compare(&value, &value).is_ok());
    }

    #[test]
    fn test_changed_map_member() {
        let lines = diff(&Value::map([("a", 1)]), &Value::map([("a", 2)]));
        insta::assert_snapshot!(render(&lines), @r###"
        - ["a"]: 1
        + ["a"]: 2
        "###);
    }

    #[test]
    fn test_added_and_removed_map_keys() {
        let expected = Value::map([("keep", 1), ("old", 2)]);
        let actual = Value::map([("keep", 1), ("new", 3)]);
        insta::assert_snapshot!(render(&diff(&expected, &actual)), @r###"
        + ["new"]: 3
        - ["old"]: 2
        "###);
    }

    #[test]
    fn test_sequences_pair_positionally() {
        let expected = Value::seq([1, 2, 3]);
        let actual = Value::seq([1, 5]);
        insta::assert_snapshot!(render(&diff(&expected, &actual)), @r###"
        - [1]: 2
        + [1]: 5
        - [2]: 3
        "###);
    }

    #[test]
    fn test_sets_pair_by_member() {
        let expected = Value::set(["a", "b"]);
        let actual = Value::set(["b", "c"]);
        insta::assert_snapshot!(render(&diff(&expected, &actual)), @r###"
        - "a"
        + "c"
        "###);
    }

    #[test]
    fn test_nested_paths() {
        let expected = Value::map([("items", Value::seq([Value::map([("id", 1)])]))]);
        let actual = Value::map([("items", Value::seq([Value::map([("id", 7)])]))]);
        insta::assert_snapshot!(render(&diff(&expected, &actual)), @r###"
        - ["items"][0]["id"]: 1
        + ["items"][0]["id"]: 7
        "###);
    }

    #[test]
    fn test_kind_change_falls_back_to_both_values() {
        let lines = diff(&Value::seq([1]), &Value::set([1]));
        insta::assert_snapshot!(render(&lines), @r###"
        - [1]
        + #{1}
        "###);
    }

    #[test]
    fn test_opaque_values_fall_back_to_reproduction() {
        let expected = Value::Opaque {
            type_name: "demo::Handle".to_string(),
            repr: "Handle(1)".to_string(),
        };
        let actual = Value::Opaque {
            type_name: "demo::Handle".to_string(),
            repr: "Handle(2)".to_string(),
        };
        let lines = diff(&expected, &actual);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "- <demo::Handle Handle(1)>");
        assert_eq!(lines[1].to_string(), "+ <demo::Handle Handle(2)>");
    }

    #[test]
    fn test_diff_is_deterministic() {
        let expected = Value::map([("b", Value::set([1, 2])), ("a", Value::seq(["x"]))]);
        let actual = Value::map([("a", Value::seq(["y"])), ("b", Value::set([2, 3]))]);
        assert_eq!(diff(&expected, &actual), diff(&expected, &actual));
    }

    #[test]
    fn test_mismatch_display_joins_lines() {
        let mismatch = compare(&Value::from("x"), &Value::from("y")).unwrap_err();
        assert_eq!(mismatch.to_string(), "- \"x\"\n+ \"y\"");
    }

    #[test]
    fn test_pretty_diff_routes_equality() {
        let a = Value::set([1, 2]);
        let b = Value::set([2, 1]);
        assert_eq!(PrettyDiff(&a), PrettyDiff(&b));
        assert_ne!(PrettyDiff(&a), PrettyDiff(&Value::set([1])));
    }
}
