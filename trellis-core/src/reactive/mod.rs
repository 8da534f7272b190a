//! Reactive Primitives
//!
//! This module implements the fine-grained reactive dependency graph:
//! cells, stores, effects, and memos.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`Cell`] is a mutable value box. Reading it inside a tracking scope
//! registers the running computation as a dependent; writing a
//! distinguishable value notifies every dependent synchronously.
//!
//! ## Stores
//!
//! A [`Store`] is the deep-reactive view of a composite value: each
//! field is backed by its own cell, interned lazily, so dependency
//! tracking works at field granularity without any ambient property
//! interception.
//!
//! ## Effects
//!
//! An [`Effect`] is an eager computation that re-runs whenever a
//! dependency changes. Dependencies are re-collected fresh on every run.
//!
//! ## Memos
//!
//! A [`Memo`] is a lazily cached derived value that recomputes on access
//! after a dependency changed.
//!
//! # Implementation Notes
//!
//! The "currently running computation" lives on a thread-local stack
//! ([`TrackingScope`]) with push/pop guards, never a bare global. Cells
//! keep dependents as ids in insertion order; the [`Runtime`] registry
//! resolves ids to live computations at notification time. The whole
//! system is synchronous: a write runs its full cascade of dependents
//! before returning.

mod cell;
mod effect;
mod memo;
mod runtime;
mod scope;
mod store;

pub use cell::Cell;
pub use effect::Effect;
pub use memo::{Memo, MemoState};
pub use runtime::{Notify, RegistrationHandle, Runtime, SubscriberId};
pub use scope::TrackingScope;
pub use store::Store;
