//! Reconciler
//!
//! The patch engine walks an old and a new vnode tree together and turns
//! the difference into host mutations, reusing previously created host
//! nodes where the trees line up.
//!
//! # Dispatch
//!
//! `patch` dispatches on the new node's kind:
//!
//! - **Text** and **Fragment** nodes always take the mount path; there
//!   is no update path for either in this engine.
//! - **Element** nodes mount when there is no old node and patch props
//!   against the old node otherwise. Child lists are not diffed on
//!   update; keyed or two-pointer list reconciliation is the extension
//!   point for that.
//! - **Component** nodes always instantiate; an old component
//!   counterpart is never patched in place.
//!
//! # The Render Effect
//!
//! Mounting a component wraps its render function in an [`Effect`], so
//! any cell or store field read while rendering re-runs reconciliation
//! for that component when it changes. The first activation mounts the
//! subtree; every later one renders a fresh tree and patches it against
//! the stored one.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::RenderError;
use crate::reactive::Effect;
use crate::value::SameValue;

use super::component::{Component, ComponentInstance, Phase};
use super::host::{HostId, HostOps};
use super::vnode::{empty_props, Children, NodeKind, Props, VNode};

/// The reconciliation engine, bound to one host.
pub struct Renderer<H: HostOps> {
    host: Arc<RwLock<H>>,
}

impl<H: HostOps> Clone for Renderer<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: HostOps + 'static> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host: Arc::new(RwLock::new(host)),
        }
    }

    /// Shared handle to the host.
    pub fn host(&self) -> Arc<RwLock<H>> {
        Arc::clone(&self.host)
    }

    /// Reconcile `new` against `old` inside `container`.
    ///
    /// `old` of `None` is the mount path. Host failures abort the pass
    /// and propagate unchanged.
    pub fn patch(
        &self,
        old: Option<&VNode>,
        new: &VNode,
        container: HostId,
        parent: Option<&Arc<ComponentInstance>>,
    ) -> Result<(), RenderError> {
        match new.kind() {
            NodeKind::Text(content) => self.mount_text(new, content, container),
            NodeKind::Fragment { children } => self.mount_children(children, container, parent),
            NodeKind::Element {
                tag,
                props,
                children,
            } => match old {
                None => self.mount_element(new, tag, props, children, container, parent),
                Some(old) => self.patch_element(old, new, tag, props),
            },
            NodeKind::Component { def, .. } => {
                self.mount_component(new, def, container, parent)
            }
        }
    }

    /// Text nodes are always freshly mounted; there is no update path.
    fn mount_text(
        &self,
        node: &VNode,
        content: &str,
        container: HostId,
    ) -> Result<(), RenderError> {
        let id = {
            let mut host = self.host.write();
            let id = host.create_text(content)?;
            host.insert(id, container)?;
            id
        };
        node.set_host(id);
        Ok(())
    }

    /// Fragments are transparent: children mount into the fragment's own
    /// container, and are remounted rather than diffed on update.
    fn mount_children(
        &self,
        children: &[VNode],
        container: HostId,
        parent: Option<&Arc<ComponentInstance>>,
    ) -> Result<(), RenderError> {
        for child in children {
            self.patch(None, child, container, parent)?;
        }
        Ok(())
    }

    fn mount_element(
        &self,
        node: &VNode,
        tag: &str,
        props: &Arc<Props>,
        children: &Children,
        container: HostId,
        parent: Option<&Arc<ComponentInstance>>,
    ) -> Result<(), RenderError> {
        tracing::debug!(tag, "mount element");
        let el = self.host.write().create_element(tag)?;
        node.set_host(el);

        match children {
            Children::Text(content) => {
                self.host.write().set_element_text(el, content)?;
            }
            Children::Nodes(nodes) => {
                for child in nodes {
                    self.patch(None, child, el, parent)?;
                }
            }
        }

        {
            let mut host = self.host.write();
            for (key, value) in props.iter() {
                host.patch_prop(el, key, None, Some(value))?;
            }
            host.insert(el, container)?;
        }
        Ok(())
    }

    /// Reuse the old node's host element and reconcile props onto it.
    ///
    /// Child lists keep their mounted host state; they are not diffed
    /// here.
    fn patch_element(
        &self,
        old: &VNode,
        new: &VNode,
        tag: &str,
        new_props: &Arc<Props>,
    ) -> Result<(), RenderError> {
        let el = old.host().ok_or_else(|| RenderError::MissingHost {
            tag: tag.to_string(),
        })?;
        new.set_host(el);

        let old_props = match old.kind() {
            NodeKind::Element { props, .. } => Arc::clone(props),
            _ => empty_props(),
        };
        tracing::debug!(tag, "patch element");
        self.patch_props(el, &old_props, new_props)
    }

    /// Three-pass prop reconciliation. Unchanged keys produce no host
    /// calls.
    fn patch_props(
        &self,
        el: HostId,
        old: &Arc<Props>,
        new: &Arc<Props>,
    ) -> Result<(), RenderError> {
        if Arc::ptr_eq(old, new) {
            return Ok(());
        }

        let mut host = self.host.write();

        for (key, next) in new.iter() {
            let prev = old.get(key);
            let changed = match prev {
                Some(prev) => !prev.same_value(next),
                None => true,
            };
            if changed {
                host.patch_prop(el, key, prev, Some(next))?;
            }
        }

        // the canonical empty map has nothing to remove
        if !Arc::ptr_eq(old, &empty_props()) {
            for (key, prev) in old.iter() {
                if !new.contains_key(key) {
                    host.patch_prop(el, key, Some(prev), None)?;
                }
            }
        }
        Ok(())
    }

    /// Components always instantiate; there is no patch-in-place path
    /// for an existing instance.
    fn mount_component(
        &self,
        node: &VNode,
        def: &Arc<Component>,
        container: HostId,
        parent: Option<&Arc<ComponentInstance>>,
    ) -> Result<(), RenderError> {
        let instance = def.instantiate(parent);
        tracing::debug!(component = instance.name(), "mount component");
        node.set_instance(Arc::clone(&instance));
        self.bind_render_effect(&instance, node, container)
    }

    /// Wrap the instance's render function in an effect so any reactive
    /// read during rendering re-runs reconciliation on change.
    ///
    /// The first activation runs synchronously inside [`Effect::new`];
    /// its failure, if any, is surfaced to the caller. Later activations
    /// have no caller, so failures are logged and recorded on the
    /// instance instead.
    fn bind_render_effect(
        &self,
        instance: &Arc<ComponentInstance>,
        owner: &VNode,
        container: HostId,
    ) -> Result<(), RenderError> {
        let renderer = self.clone();
        let weak = Arc::downgrade(instance);
        let owner_host = owner.host_slot();

        let effect = Effect::new(move || {
            let Some(instance) = weak.upgrade() else {
                return;
            };
            if let Err(err) = renderer.render_pass(&instance, &owner_host, container) {
                tracing::error!(component = instance.name(), error = %err, "render pass failed");
                instance.record_error(err);
            }
        });
        instance.attach_effect(effect);

        match instance.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// One activation of a component's render effect.
    fn render_pass(
        &self,
        instance: &Arc<ComponentInstance>,
        owner_host: &Arc<OnceLock<HostId>>,
        container: HostId,
    ) -> Result<(), RenderError> {
        if !instance.is_mounted() {
            instance.set_phase(Phase::Mounting);
            let sub_tree = Arc::new(instance.render());
            self.patch(None, &sub_tree, container, Some(instance))?;
            if let Some(root) = sub_tree.host() {
                let _ = owner_host.set(root);
            }
            instance.store_sub_tree(sub_tree);
            instance.set_phase(Phase::Stable);
        } else {
            instance.set_phase(Phase::Updating);
            let next = Arc::new(instance.render());
            let prev = instance.sub_tree();
            self.patch(prev.as_deref(), &next, container, Some(instance))?;
            instance.store_sub_tree(next);
            instance.set_phase(Phase::Stable);
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
