//! Reactive Store
//!
//! Deep reactivity for composite values. A store is the reactive view a
//! plain map turns into when it enters a cell: every field is backed by
//! its own [`Cell`], so reads track and writes notify at field
//! granularity.
//!
//! Field cells are interned in a per-store map and created lazily on
//! first access, seeded from the map the store was built from. Repeated
//! reads of the same field therefore go through the same cell, and a
//! nested map surfaces as a nested store with stable identity.
//!
//! Stores are cheap clonable handles with identity semantics: two stores
//! built from structurally equal maps are still different values.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::value::Value;

use super::cell::Cell;

/// The reactive view of a composite value.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    /// Field values the store was created from. A field's cell is seeded
    /// from here the first time the field is touched.
    seed: IndexMap<String, Value>,
    cells: RwLock<IndexMap<String, Cell<Value>>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                seed: IndexMap::new(),
                cells: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// Create a store from key/value pairs.
    pub fn with<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            inner: Arc::new(StoreInner {
                seed: entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
                cells: RwLock::new(IndexMap::new()),
            }),
        }
    }

    pub(crate) fn from_entries(entries: &Arc<IndexMap<String, Value>>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                seed: (**entries).clone(),
                cells: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// The interned cell backing `key`, created on first access.
    fn field(&self, key: &str) -> Cell<Value> {
        if let Some(cell) = self.inner.cells.read().get(key) {
            return cell.clone();
        }

        let mut cells = self.inner.cells.write();
        // another reader may have interned it between the two locks
        if let Some(cell) = cells.get(key) {
            return cell.clone();
        }

        let initial = self.inner.seed.get(key).cloned().unwrap_or(Value::Null);
        let cell = Cell::new(initial);
        cells.insert(key.to_string(), cell.clone());
        cell
    }

    /// Read a field, registering the running computation as a dependent
    /// of that field. Missing fields read as [`Value::Null`] and still
    /// register, so a later write is observed.
    pub fn get(&self, key: &str) -> Value {
        self.field(key).read()
    }

    /// Read a field without registering a dependency.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.field(key).read_untracked()
    }

    /// Write a field through its cell.
    ///
    /// An indistinguishable value is a no-op; a change notifies the
    /// field's dependents synchronously.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.field(key).write(value.into());
    }

    /// Identity comparison. Structurally equal stores are distinct.
    pub(crate) fn same_store(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("seeded_fields", &self.inner.seed.len())
            .field("live_fields", &self.inner.cells.read().len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{SubscriberId, TrackingScope};

    #[test]
    fn fields_read_their_seeded_values() {
        let store = Store::with([("count", 0), ("step", 2)]);

        assert_eq!(store.get_untracked("count"), Value::Int(0));
        assert_eq!(store.get_untracked("step"), Value::Int(2));
    }

    #[test]
    fn missing_fields_read_as_null() {
        let store = Store::new();
        assert_eq!(store.get_untracked("absent"), Value::Null);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let store = Store::new();
        store.set("name", "ada");
        assert_eq!(store.get_untracked("name"), Value::Str("ada".into()));
    }

    #[test]
    fn clone_shares_fields() {
        let a = Store::with([("n", 1)]);
        let b = a.clone();

        a.set("n", 2);
        assert_eq!(b.get_untracked("n"), Value::Int(2));
        assert!(a.same_store(&b));
    }

    #[test]
    fn structurally_equal_stores_are_distinct() {
        let a = Store::with([("n", 1)]);
        let b = Store::with([("n", 1)]);
        assert!(!a.same_store(&b));
    }

    #[test]
    fn nested_maps_surface_as_stores_with_stable_identity() {
        let store = Store::with([("user", Value::map([("name", "ada")]))]);

        let first = store.get_untracked("user");
        let second = store.get_untracked("user");

        let first = first.as_store().expect("nested map should wrap");
        let second = second.as_store().expect("nested map should wrap");
        assert!(first.same_store(second));
        assert_eq!(first.get_untracked("name"), Value::Str("ada".into()));
    }

    #[test]
    fn tracked_get_registers_on_the_field_cell() {
        let store = Store::with([("n", 1)]);
        let id = SubscriberId::new();

        {
            let _scope = TrackingScope::enter(id);
            store.get("n");
        }

        assert_eq!(store.field("n").dependent_count(), 1);
        assert_eq!(store.field("other").dependent_count(), 0);
    }
}
