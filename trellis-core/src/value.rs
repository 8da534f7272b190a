//! Dynamic Values
//!
//! `Value` is the payload type for element props and component state
//! fields. It covers the scalar types plus two composite forms: a plain
//! `Map` (not yet reactive) and a `Store` (the reactive view a map turns
//! into when it enters a cell).
//!
//! # The Same-Value Rule
//!
//! Change detection across the crate uses [`SameValue`], a strict
//! comparison that differs from `PartialEq` in two places:
//!
//! - floats compare by bit pattern, so `NaN` is the same value as `NaN`
//!   and `+0.0` is distinguishable from `-0.0`;
//! - composites compare by identity, so a structurally equal but distinct
//!   map is a different value.
//!
//! A write whose new value is *not* distinguishable under this rule is a
//! complete no-op: no storage update, no notification.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::reactive::Store;

/// Strict same-value comparison used to decide whether a write is
/// distinguishable from the stored value.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

/// Conversion applied to a value before it is exposed to readers.
///
/// Plain composites become reactive stores; everything else passes
/// through unchanged. For scalar types this is the identity.
pub trait Wrap: Sized {
    fn wrap(&self) -> Self;
}

macro_rules! plain_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }

            impl Wrap for $ty {
                fn wrap(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

plain_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, String,
);

impl SameValue for f32 {
    fn same_value(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Wrap for f32 {
    fn wrap(&self) -> Self {
        *self
    }
}

impl SameValue for f64 {
    fn same_value(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Wrap for f64 {
    fn wrap(&self) -> Self {
        *self
    }
}

/// A dynamic value carried by element props and store fields.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A plain composite, compared by identity.
    Map(Arc<IndexMap<String, Value>>),
    /// The reactive view of a composite.
    Store(Store),
}

impl Value {
    /// Build a plain composite from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            Value::Store(store) => Some(store),
            _ => None,
        }
    }
}

impl SameValue for Value {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Store(a), Value::Store(b)) => a.same_store(b),
            _ => false,
        }
    }
}

impl Wrap for Value {
    fn wrap(&self) -> Value {
        match self {
            Value::Map(entries) => Value::Store(Store::from_entries(entries)),
            other => other.clone(),
        }
    }
}

/// Equality follows the same-value rule, not structural comparison.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Map(_) | Value::Store(_) => write!(f, "[object]"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Store> for Value {
    fn from(v: Store) -> Self {
        Value::Store(v)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
