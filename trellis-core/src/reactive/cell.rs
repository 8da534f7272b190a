//! Reactive Cell
//!
//! A cell is the fundamental reactive primitive: a single mutable value
//! box that records which computations read it and notifies them when it
//! changes.
//!
//! # How Cells Work
//!
//! 1. Reading a cell inside a tracking scope registers the running
//!    computation into the cell's dependent set.
//!
//! 2. Writing a value that is distinguishable from the stored one (under
//!    the same-value rule) updates the cell and synchronously notifies
//!    every dependent, in registration order, before `write` returns.
//!
//! 3. Writing an indistinguishable value is a complete no-op.
//!
//! # Raw vs. Current
//!
//! A cell keeps two views of its payload: the raw value as written, and
//! the wrapped value readers see. For scalars the two are identical; a
//! composite is wrapped into a reactive store on the way in, so nested
//! reads and writes track at field granularity. Distinguishability is
//! always judged against the raw value.
//!
//! # Memory Layout
//!
//! A cell is a cheap clonable handle to one shared box. Dropping the
//! last handle drops the box; there is no explicit teardown.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

use crate::value::{SameValue, Wrap};

use super::runtime::{Runtime, SubscriberId};
use super::scope::{DepSet, TrackingScope};

/// A reactive value box.
///
/// # Example
///
/// ```rust,ignore
/// let count = Cell::new(0);
///
/// // Read the value (registers a dependency inside a tracking scope)
/// let value = count.read();
///
/// // Update the value (notifies dependents)
/// count.write(5);
/// ```
pub struct Cell<T>
where
    T: SameValue + Wrap + Clone + Send + Sync + 'static,
{
    inner: Arc<CellInner<T>>,
}

struct CellInner<T> {
    /// Last value written, before wrapping.
    raw: RwLock<T>,
    /// `wrap(raw)`, the value readers see.
    current: RwLock<T>,
    /// Computations that read this cell since their last run.
    dependents: DepSet,
}

impl<T> Cell<T>
where
    T: SameValue + Wrap + Clone + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        let current = value.wrap();
        Self {
            inner: Arc::new(CellInner {
                raw: RwLock::new(value),
                current: RwLock::new(current),
                dependents: Arc::new(RwLock::new(IndexSet::new())),
            }),
        }
    }

    /// Read the current value.
    ///
    /// Inside an active tracking scope this also registers the running
    /// computation as a dependent of the cell. No other side effects.
    pub fn read(&self) -> T {
        if TrackingScope::is_active() {
            TrackingScope::track(&self.inner.dependents);
        }
        self.inner.current.read().clone()
    }

    /// Read without registering a dependency.
    pub fn read_untracked(&self) -> T {
        self.inner.current.read().clone()
    }

    /// Write a new value.
    ///
    /// A value indistinguishable from the stored one is a complete
    /// no-op. Otherwise the raw and wrapped values are updated and every
    /// dependent is notified synchronously, in registration order,
    /// before this call returns. No cell lock is held while dependents
    /// run.
    pub fn write(&self, value: T) {
        {
            let raw = self.inner.raw.read();
            if value.same_value(&raw) {
                return;
            }
        }

        let wrapped = value.wrap();
        *self.inner.raw.write() = value;
        *self.inner.current.write() = wrapped;

        let dependents: Vec<SubscriberId> =
            self.inner.dependents.read().iter().copied().collect();
        if dependents.is_empty() {
            return;
        }

        tracing::trace!(dependents = dependents.len(), "cell changed");
        Runtime::notify_all(&dependents);
    }

    /// Update through a function of the current raw value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let raw = self.inner.raw.read();
            f(&raw)
        };
        self.write(next);
    }

    /// Number of computations currently registered as dependents.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependents.read().len()
    }
}

impl<T> Clone for Cell<T>
where
    T: SameValue + Wrap + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Cell<T>
where
    T: SameValue + Wrap + Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("value", &*self.inner.current.read())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
