//! Trellis Core
//!
//! This crate provides the core runtime for the Trellis reactive UI
//! framework. It implements:
//!
//! - Reactive primitives (cells, stores, effects, memos)
//! - A virtual-tree model and the reconciliation engine
//! - Component instances bound together by render effects
//!
//! # Architecture
//!
//! The crate is organized into a few modules:
//!
//! - `reactive`: fine-grained dependency tracking and notification
//! - `render`: the vnode model, the patch engine, and the app entry point
//! - `value`: dynamic payloads and the same-value comparison rule
//! - `error`: the crate's error surface
//!
//! The host rendering surface (a DOM, a terminal, anything) is not part
//! of this crate; it is supplied through the [`render::HostOps`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::reactive::{Cell, Store};
//! use trellis_core::render::{create_app, Component, VNode};
//!
//! let count = Cell::new(0_i64);
//!
//! let counter = Component::new("counter", Store::new, {
//!     let count = count.clone();
//!     move |_state| {
//!         VNode::element("div")
//!             .text(count.read().to_string())
//!             .build()
//!     }
//! });
//!
//! let app = create_app(my_host, counter);
//! app.mount(root_container)?;
//!
//! // Any later write re-renders and patches synchronously.
//! count.write(1);
//! ```

pub mod error;
pub mod reactive;
pub mod render;
pub mod value;
