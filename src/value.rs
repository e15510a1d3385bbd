//! Payloads held by the bars of a graph.
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// What a bar holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// integer graphs
    Int(i64),
    /// string graphs, bars are as high as the string is long
    Text(String),
    /// keyed record, ordered by key only
    Record {
        /// sort key
        key: i64,
        /// payload riding along with the key
        label: String,
    },
}

impl Value {
    /// Shorthand for a keyed record.
    pub fn record<S: Into<String>>(key: i64, label: S) -> Self {
        Value::Record {
            key,
            label: label.into(),
        }
    }

    /// Integers `1..=count`, the classic bar set.
    pub fn increments(count: usize) -> Vec<Value> {
        (1..=count as i64).map(Value::Int).collect()
    }

    /// Height of the bar drawn for this value.
    pub fn magnitude(&self) -> f64 {
        match self {
            Value::Int(n) => *n as f64,
            Value::Text(s) => s.chars().count() as f64,
            Value::Record { key, .. } => *key as f64,
        }
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Record { .. } => "record",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Record { key, label } => write!(f, "{}:{}", key, label),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

/// Default comparator for values.
///
/// Integers compare numerically, texts lexically and records by key.
/// Values of different kinds never belong to the same graph and compare equal.
pub fn natural_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Record { key: x, .. }, Value::Record { key: y, .. }) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Values usable by radix sort: a non-negative integer key.
pub trait RadixKey {
    /// The key, or `None` if this value cannot be radix sorted.
    fn radix_key(&self) -> Option<u64>;

    /// Describe the value when rejecting it.
    fn kind(&self) -> &'static str {
        "non-integer"
    }
}

impl RadixKey for Value {
    fn radix_key(&self) -> Option<u64> {
        match self {
            Value::Int(n) | Value::Record { key: n, .. } => u64::try_from(*n).ok(),
            Value::Text(_) => None,
        }
    }
    fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Record { .. } => "negative integer",
            Value::Text(_) => "text",
        }
    }
}

macro_rules! unsigned_radix_key {
    ($($t:ty),*) => {
        $(impl RadixKey for $t {
            fn radix_key(&self) -> Option<u64> {
                Some(*self as u64)
            }
        })*
    };
}

macro_rules! signed_radix_key {
    ($($t:ty),*) => {
        $(impl RadixKey for $t {
            fn radix_key(&self) -> Option<u64> {
                u64::try_from(*self).ok()
            }
            fn kind(&self) -> &'static str {
                "negative integer"
            }
        })*
    };
}

unsigned_radix_key!(u8, u16, u32, u64, usize);
signed_radix_key!(i8, i16, i32, i64, isize);

impl RadixKey for String {
    fn radix_key(&self) -> Option<u64> {
        None
    }
    fn kind(&self) -> &'static str {
        "text"
    }
}

impl RadixKey for &str {
    fn radix_key(&self) -> Option<u64> {
        None
    }
    fn kind(&self) -> &'static str {
        "text"
    }
}
