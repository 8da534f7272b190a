//! Host Operations
//!
//! The mutation primitives supplied by the embedding environment. The
//! reconciler computes *which* mutations to apply; the host applies them
//! to its actual tree, whatever that is (a DOM, a terminal grid, a test
//! recorder).
//!
//! Handles are opaque ids so vnodes stay independent of the host's node
//! representation.

use crate::error::RenderError;
use crate::value::Value;

/// Opaque handle to a node owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(u64);

impl HostId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Mutation primitives the engine drives the host through.
pub trait HostOps: Send + Sync {
    /// Create a new, unattached element tagged `tag`. Must not fail for
    /// a well-formed tag.
    fn create_element(&mut self, tag: &str) -> Result<HostId, RenderError>;

    /// Create a new, unattached text node.
    fn create_text(&mut self, content: &str) -> Result<HostId, RenderError>;

    /// Replace the entire text content of an element.
    fn set_element_text(&mut self, node: HostId, content: &str) -> Result<(), RenderError>;

    /// Apply or remove a single named attribute or behavior. `next` of
    /// `None` means remove. Must be idempotent when called with an
    /// identical `prev`/`next` pair.
    fn patch_prop(
        &mut self,
        node: HostId,
        key: &str,
        prev: Option<&Value>,
        next: Option<&Value>,
    ) -> Result<(), RenderError>;

    /// Append `node` as the last child of `container`.
    fn insert(&mut self, node: HostId, container: HostId) -> Result<(), RenderError>;
}
