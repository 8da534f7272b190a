//! Subscriber Registry
//!
//! Cells store their dependents as plain ids; the registry resolves ids
//! to live computations at notification time. This keeps cells small and
//! lets a computation disappear (drop) without every cell that ever saw
//! it having to be told.
//!
//! # How Notification Works
//!
//! 1. A computation registers itself under its [`SubscriberId`] when it
//!    is created, receiving a handle that unregisters it on drop.
//!
//! 2. A cell write collects its dependent ids in registration order and
//!    hands them to [`Runtime::notify_all`].
//!
//! 3. The registry upgrades each id to a live computation, releases its
//!    lock, then invokes them one by one. The lock is released first so
//!    a notified computation is free to register or unregister
//!    subscribers while it runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

/// Unique identifier for a subscriber.
///
/// A subscriber is any computation that depends on reactive values:
/// effects, memos, and component render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A computation that can be re-run when one of its dependencies changes.
pub trait Notify: Send + Sync {
    /// The id this computation registers under.
    fn subscriber_id(&self) -> SubscriberId;

    /// React to a dependency change. Invoked synchronously by the write
    /// that changed the dependency.
    fn notify(&self);
}

static REGISTRY: OnceLock<RwLock<HashMap<SubscriberId, Weak<dyn Notify>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<SubscriberId, Weak<dyn Notify>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Handle to a registered subscriber.
///
/// Dropping the handle unregisters the subscriber; ids of dropped
/// subscribers still present in dependent sets simply stop resolving.
pub struct RegistrationHandle {
    subscriber: SubscriberId,
}

impl Drop for RegistrationHandle {
    fn drop(&mut self) {
        registry().write().remove(&self.subscriber);
    }
}

/// The subscriber registry.
pub struct Runtime;

impl Runtime {
    /// Register a computation. Returns a handle that unregisters it when
    /// dropped.
    pub fn register(notify: Arc<dyn Notify>) -> RegistrationHandle {
        let subscriber = notify.subscriber_id();
        registry().write().insert(subscriber, Arc::downgrade(&notify));
        RegistrationHandle { subscriber }
    }

    /// Notify the given subscribers, in order, each exactly once.
    ///
    /// Ids that no longer resolve are skipped.
    pub(crate) fn notify_all(subscribers: &[SubscriberId]) {
        let live: Vec<Arc<dyn Notify>> = {
            let registry = registry().read();
            subscribers
                .iter()
                .filter_map(|id| registry.get(id).and_then(Weak::upgrade))
                .collect()
        };

        for target in live {
            target.notify();
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
