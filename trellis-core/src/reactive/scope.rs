//! Tracking Scope
//!
//! The scope records which computation is currently running so that
//! reading a cell can register that computation as a dependent.
//!
//! Each thread keeps its own stack of frames. Entering a scope pushes a
//! frame and returns a guard; the guard's `Drop` pops it, so the stack
//! stays balanced on every exit path, panics included. Nested scopes are
//! supported: a render pass that mounts a child component tracks the
//! child's reads against the child, not the parent.
//!
//! A frame also collects every dependent set the computation was
//! registered into. The computation takes that list when its run ends
//! and uses it to remove itself before the next run, which is how stale
//! dependencies drop out.

use std::cell::RefCell;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::runtime::SubscriberId;

/// The dependent set of a single reactive cell.
///
/// Shared between the cell (which notifies through it), the scope (which
/// registers into it), and the computations that clear themselves out of
/// it before re-running. Iteration order is registration order.
pub(crate) type DepSet = Arc<RwLock<IndexSet<SubscriberId>>>;

/// Dependent sets a computation was registered into during one run.
pub(crate) type ObservedDeps = SmallVec<[DepSet; 4]>;

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

struct Frame {
    subscriber: SubscriberId,
    observed: ObservedDeps,
}

/// Guard marking a computation as the currently active subscriber.
pub struct TrackingScope {
    subscriber: SubscriberId,
}

impl TrackingScope {
    /// Enter a new scope for the given subscriber.
    pub fn enter(subscriber: SubscriberId) -> Self {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                subscriber,
                observed: SmallVec::new(),
            });
        });
        Self { subscriber }
    }

    /// Whether any computation is currently being tracked on this thread.
    pub fn is_active() -> bool {
        SCOPE_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The subscriber of the innermost active scope, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        SCOPE_STACK.with(|stack| stack.borrow().last().map(|frame| frame.subscriber))
    }

    /// Register the active subscriber into `dep`.
    ///
    /// Called by cells on read. The set is recorded with the frame the
    /// first time it is seen, so a cell read twice in one run is cleared
    /// once. No-op without an active scope.
    pub(crate) fn track(dep: &DepSet) {
        SCOPE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let Some(frame) = stack.last_mut() else {
                return;
            };
            if dep.write().insert(frame.subscriber) {
                frame.observed.push(Arc::clone(dep));
            }
        });
    }

    /// Dependent sets observed so far by this scope.
    pub(crate) fn observed(&self) -> ObservedDeps {
        SCOPE_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|frame| frame.observed.clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.subscriber, self.subscriber,
                    "tracking scope mismatch: expected {:?}, got {:?}",
                    self.subscriber, frame.subscriber
                );
            }
        });
    }
}
