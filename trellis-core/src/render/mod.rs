//! Virtual-Tree Reconciliation
//!
//! This module implements the rendering half of the runtime: the vnode
//! model, the patch engine that turns vnode trees into minimal host
//! mutations, component instances with their render effects, and the
//! application entry point.
//!
//! The host itself stays behind the [`HostOps`] trait; this module never
//! touches a concrete rendering surface.

mod app;
mod component;
mod host;
mod renderer;
mod vnode;

pub use app::{create_app, App};
pub use component::{Component, ComponentInstance, Phase};
pub use host::{HostId, HostOps};
pub use renderer::Renderer;
pub use vnode::{Children, ElementBuilder, NodeKind, Props, VNode};
