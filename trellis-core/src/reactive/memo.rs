//! Memo
//!
//! A memo is a cached derived value. It recomputes on access after a
//! dependency changed and returns the cached result otherwise.
//!
//! # Differences from Effect
//!
//! - Memos return a value; effects do not.
//! - Memos are lazy (compute on access); effects are eager (run when a
//!   dependency changes).
//!
//! A dependency change marks the memo dirty and forwards the
//! notification to the memo's own dependents, so an effect that reads a
//! memo re-runs end-to-end when the underlying cell changes. Forwarding
//! is eager: the memo does not recompute first to check whether its
//! output actually changed. A computation reading both a cell and a memo
//! of that cell can therefore run twice in one cascade; batching is the
//! scheduler's concern, not this primitive's.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::runtime::{Notify, RegistrationHandle, Runtime, SubscriberId};
use super::scope::{DepSet, ObservedDeps, TrackingScope};

/// Cache state of a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up to date.
    Clean,
    /// A dependency changed; the next access recomputes.
    Dirty,
}

/// A cached derived value that recomputes only after a dependency
/// changed.
///
/// # Example
///
/// ```rust,ignore
/// let count = Cell::new(2);
/// let doubled = Memo::new({
///     let count = count.clone();
///     move || count.read() * 2
/// });
///
/// assert_eq!(doubled.get(), 4);
/// count.write(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<MemoInner<T>>,
    registration: Arc<RegistrationHandle>,
}

struct MemoInner<T> {
    subscriber: SubscriberId,
    compute: Box<dyn Fn() -> T + Send + Sync>,
    /// Cached value; `None` until the first computation.
    value: RwLock<Option<T>>,
    state: RwLock<MemoState>,
    /// Dependent sets the last computation registered into.
    observed: RwLock<ObservedDeps>,
    /// Computations that read this memo.
    dependents: DepSet,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new memo. Nothing is computed until the first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let inner = Arc::new(MemoInner {
            subscriber: SubscriberId::new(),
            compute: Box::new(compute),
            value: RwLock::new(None),
            state: RwLock::new(MemoState::Dirty),
            observed: RwLock::new(SmallVec::new()),
            dependents: Arc::new(RwLock::new(IndexSet::new())),
        });
        let registration = Arc::new(Runtime::register(inner.clone()));

        Self {
            inner,
            registration,
        }
    }

    /// The current value, recomputing if a dependency changed since the
    /// last computation.
    ///
    /// Inside an active tracking scope this also registers the reader as
    /// a dependent of the memo.
    pub fn get(&self) -> T {
        if TrackingScope::is_active() {
            TrackingScope::track(&self.inner.dependents);
        }

        let state = *self.inner.state.read();
        if state == MemoState::Clean {
            if let Some(value) = self.inner.value.read().clone() {
                return value;
            }
        }
        self.inner.recompute()
    }

    /// The current cache state.
    pub fn state(&self) -> MemoState {
        *self.inner.state.read()
    }

    /// Whether the memo has computed at least once.
    pub fn has_value(&self) -> bool {
        self.inner.value.read().is_some()
    }

    /// Number of computations currently reading this memo.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependents.read().len()
    }
}

impl<T> MemoInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn recompute(&self) -> T {
        // drop stale dependencies, then collect fresh ones
        let observed = std::mem::take(&mut *self.observed.write());
        for dep in observed {
            dep.write().shift_remove(&self.subscriber);
        }

        let scope = TrackingScope::enter(self.subscriber);
        let next = (self.compute)();
        *self.observed.write() = scope.observed();
        drop(scope);

        *self.value.write() = Some(next.clone());
        *self.state.write() = MemoState::Clean;
        next
    }
}

impl<T> Notify for MemoInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber
    }

    fn notify(&self) {
        *self.state.write() = MemoState::Dirty;

        let dependents: Vec<SubscriberId> = self.dependents.read().iter().copied().collect();
        if dependents.is_empty() {
            return;
        }
        Runtime::notify_all(&dependents);
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            registration: Arc::clone(&self.registration),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("state", &self.state())
            .field("has_value", &self.has_value())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
