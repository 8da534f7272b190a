//! Effect
//!
//! An effect is a side-effecting computation that re-runs whenever one
//! of its dependencies changes. Effects are the unit that keeps reactive
//! state synchronized with the outside world; the renderer binds one
//! around every component's render function.
//!
//! # How Effects Work
//!
//! 1. On creation, the effect runs its function immediately under a
//!    tracking scope to establish its initial dependencies.
//!
//! 2. A dependency write notifies the effect, which re-runs the function
//!    synchronously before the write returns.
//!
//! 3. Before every run the effect removes itself from every dependent
//!    set it was recorded in during the previous run. Dependency
//!    bookkeeping is rebuilt fresh each run, so a branch that stops
//!    reading a cell stops depending on it.
//!
//! A run that writes a cell the effect does not read can re-enter the
//! effect recursively; that discipline is the caller's responsibility.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::runtime::{Notify, RegistrationHandle, Runtime, SubscriberId};
use super::scope::{ObservedDeps, TrackingScope};

/// A computation that re-runs when its dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let count = Cell::new(0);
///
/// let effect = Effect::new({
///     let count = count.clone();
///     move || println!("count is {}", count.read())
/// });
///
/// count.write(5); // prints "count is 5" before returning
/// ```
pub struct Effect {
    inner: Arc<EffectInner>,
    registration: Arc<RegistrationHandle>,
}

struct EffectInner {
    subscriber: SubscriberId,
    run: Box<dyn Fn() + Send + Sync>,
    /// Dependent sets this effect was registered into by its last run.
    observed: RwLock<ObservedDeps>,
    disposed: AtomicBool,
    runs: AtomicU64,
}

impl Effect {
    /// Create a new effect.
    ///
    /// The function runs immediately to establish dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(EffectInner {
            subscriber: SubscriberId::new(),
            run: Box::new(run),
            observed: RwLock::new(SmallVec::new()),
            disposed: AtomicBool::new(false),
            runs: AtomicU64::new(0),
        });
        let registration = Arc::new(Runtime::register(inner.clone()));

        let effect = Self {
            inner,
            registration,
        };
        effect.inner.execute();
        effect
    }

    /// The id this effect tracks dependencies under.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber
    }

    /// Stop the effect. It will not run again and is removed from every
    /// dependent set it was registered in.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        self.inner.clear_observed();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of times the effect has run.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.load(Ordering::SeqCst)
    }

    /// Number of dependent sets the last run registered into.
    pub fn dependency_count(&self) -> usize {
        self.inner.observed.read().len()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            registration: Arc::clone(&self.registration),
        }
    }
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        // Drop out of every dependent set from the previous run.
        self.clear_observed();

        let scope = TrackingScope::enter(self.subscriber);
        (self.run)();
        *self.observed.write() = scope.observed();
        drop(scope);

        self.runs.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(subscriber = ?self.subscriber, "effect ran");
    }

    fn clear_observed(&self) {
        let observed = std::mem::take(&mut *self.observed.write());
        for dep in observed {
            dep.write().shift_remove(&self.subscriber);
        }
    }
}

impl Notify for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber
    }

    fn notify(&self) {
        self.execute();
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber", &self.inner.subscriber)
            .field("runs", &self.run_count())
            .field("dependencies", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
