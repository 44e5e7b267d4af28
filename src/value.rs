//! The in-memory snapshot value model.
//!
//! [`Value`] is what a test hands to a store and what a store reads back
//! from disk. Every variant has a total order so values can key maps and
//! populate sets, which keeps rendering deterministic.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::{SnapshotError, SnapshotResult};

/// A snapshot value.
///
/// Equality is structural and typed: `Int(1)` and `Float(1.0)` are different
/// values. Floats compare by IEEE total order, so `NaN` equals itself and
/// `-0.0` differs from `0.0`.
#[derive(Clone, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered sequence.
    Seq(Vec<Value>),
    /// Unordered set, kept in canonical sorted order.
    Set(BTreeSet<Value>),
    /// Mapping with unique keys.
    Map(BTreeMap<Value, Value>),
    /// A value without a literal form, compared by its reproduction.
    Opaque { type_name: String, repr: String },
}

impl Value {
    /// Build an opaque value from anything with a `Debug` reproduction.
    ///
    /// The tag is [`std::any::type_name`], whose output may change between
    /// compiler versions. Stored snapshots built this way can stop matching
    /// after a toolchain upgrade; use [`opaque_named`](Self::opaque_named)
    /// for snapshots that must outlive one.
    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::opaque_named(std::any::type_name::<T>(), value)
    }

    /// Build an opaque value tagged with a caller-chosen type name.
    pub fn opaque_named<T: fmt::Debug + ?Sized>(type_name: impl Into<String>, value: &T) -> Self {
        Value::Opaque {
            type_name: type_name.into(),
            repr: format!("{:?}", value),
        }
    }

    /// Convert any serde-serializable value.
    ///
    /// Structs and string-keyed maps become [`Value::Map`] with string keys,
    /// unit variants become strings and `None` becomes [`Value::Unit`].
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> SnapshotResult<Self> {
        let json = serde_json::to_value(value).map_err(|e| SnapshotError::Unsupported {
            message: e.to_string(),
        })?;
        Ok(Value::from_json(json))
    }

    fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Unit,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Unit),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Build a map from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a set from members. Duplicates collapse.
    pub fn set<T, I>(members: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Value::Set(members.into_iter().map(Into::into).collect())
    }

    /// Build a sequence from items.
    pub fn seq<T, I>(items: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Whether this is a sequence, set or map.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Seq(_) | Value::Set(_) | Value::Map(_))
    }

    /// Short name of the variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Opaque { .. } => "opaque",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Unit => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Seq(_) => 5,
            Value::Set(_) => 6,
            Value::Map(_) => 7,
            Value::Opaque { .. } => 8,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Unit, Value::Unit) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (
                Value::Opaque {
                    type_name: type_a,
                    repr: repr_a,
                },
                Value::Opaque {
                    type_name: type_b,
                    repr: repr_b,
                },
            ) => (type_a, repr_a).cmp(&(type_b, repr_b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Unit => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Seq(items) => items.hash(state),
            Value::Set(members) => members.hash(state),
            Value::Map(entries) => entries.hash(state),
            Value::Opaque { type_name, repr } => {
                type_name.hash(state);
                repr.hash(state);
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Compact single-line literal, used in diff lines.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Seq(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Value::Set(members) => {
                f.write_str("#{")?;
                write_joined(f, members.iter())?;
                f.write_str("}")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (idx, (k, v)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Opaque { type_name, repr } => write!(f, "<{} {}>", type_name, repr),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

// Out-of-range values fall back to a float rather than failing.
macro_rules! from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    match i64::try_from(v) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Float(v as f64),
                    }
                }
            }
        )*
    };
}

from_wide_int!(u64, usize, isize, i128, u128);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Unit)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::seq(items)
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::seq(items.iter().cloned())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::seq(items)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(members: BTreeSet<T>) -> Self {
        Value::set(members)
    }
}

impl<T: Into<Value>, S> From<HashSet<T, S>> for Value {
    fn from(members: HashSet<T, S>) -> Self {
        Value::set(members)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Value::map(entries)
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(entries: HashMap<K, V, S>) -> Self {
        Value::map(entries)
    }
}
