//! Application Entry Point
//!
//! The one top-level surface this crate exposes to an embedding
//! application: bind a root component to a host, then mount it into a
//! container.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RenderError;

use super::component::Component;
use super::host::{HostId, HostOps};
use super::renderer::Renderer;
use super::vnode::VNode;

/// A root component bound to a host.
pub struct App<H: HostOps + 'static> {
    renderer: Renderer<H>,
    root: Arc<Component>,
    tree: RwLock<Option<Arc<VNode>>>,
}

/// Bind `root` to `host`.
pub fn create_app<H: HostOps + 'static>(host: H, root: Arc<Component>) -> App<H> {
    App {
        renderer: Renderer::new(host),
        root,
        tree: RwLock::new(None),
    }
}

impl<H: HostOps + 'static> App<H> {
    /// Mount the root component into `container`.
    ///
    /// Performs the first patch with no old tree. The mounted tree is
    /// held by the app, which keeps component instances and their render
    /// effects alive until the app is dropped.
    pub fn mount(&self, container: HostId) -> Result<(), RenderError> {
        let root = Arc::new(VNode::component(Arc::clone(&self.root)));
        self.renderer.patch(None, &root, container, None)?;
        *self.tree.write() = Some(root);
        Ok(())
    }

    /// The mounted root vnode, once `mount` has run.
    pub fn tree(&self) -> Option<Arc<VNode>> {
        self.tree.read().clone()
    }

    /// Shared handle to the host.
    pub fn host(&self) -> Arc<RwLock<H>> {
        self.renderer.host()
    }
}
