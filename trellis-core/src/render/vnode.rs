//! Virtual Node Model
//!
//! A vnode is a lightweight description of one desired host node,
//! produced fresh on every render pass. The previous pass's tree is kept
//! only as the old-tree reference for the next patch, then discarded.
//!
//! Node kinds form a closed set; the reconciler dispatches with one
//! exhaustive match, so classification stays total and mutually
//! exclusive.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use super::component::{Component, ComponentInstance};
use super::host::HostId;
use crate::value::Value;

/// Attribute map of an element vnode.
pub type Props = IndexMap<String, Value>;

/// The canonical empty prop map shared by prop-less elements.
///
/// Sharing one instance lets prop reconciliation skip the removal scan
/// when the old element had nothing to remove.
pub(crate) fn empty_props() -> Arc<Props> {
    static EMPTY: OnceLock<Arc<Props>> = OnceLock::new();
    EMPTY.get_or_init(|| Arc::new(Props::new())).clone()
}

/// Children of an element vnode: raw text content or nested nodes.
#[derive(Debug, Clone)]
pub enum Children {
    Text(String),
    Nodes(Vec<VNode>),
}

/// What a vnode describes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A host text node; `String` is the content.
    Text(String),
    /// A host element.
    Element {
        tag: String,
        props: Arc<Props>,
        children: Children,
    },
    /// A transparent grouping node; children mount into the fragment's
    /// own container.
    Fragment { children: Vec<VNode> },
    /// A stateful component. The instance is attached on mount and owns
    /// the component's render effect.
    Component {
        def: Arc<Component>,
        instance: OnceLock<Arc<ComponentInstance>>,
    },
}

/// A description of one desired host node.
#[derive(Debug, Clone)]
pub struct VNode {
    kind: NodeKind,
    /// Host node backing this description. Set at most once: when the
    /// node is materialized, or carried over from the node it patched.
    host: Arc<OnceLock<HostId>>,
}

impl VNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            host: Arc::new(OnceLock::new()),
        }
    }

    /// A text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text(content.into()))
    }

    /// A transparent grouping node.
    pub fn fragment(children: Vec<VNode>) -> Self {
        Self::with_kind(NodeKind::Fragment { children })
    }

    /// A stateful component node.
    pub fn component(def: Arc<Component>) -> Self {
        Self::with_kind(NodeKind::Component {
            def,
            instance: OnceLock::new(),
        })
    }

    /// Start building an element node.
    pub fn element(tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder {
            tag: tag.into(),
            props: Props::new(),
            children: Children::Nodes(Vec::new()),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The host node backing this vnode, once mounted.
    pub fn host(&self) -> Option<HostId> {
        self.host.get().copied()
    }

    pub(crate) fn host_slot(&self) -> Arc<OnceLock<HostId>> {
        Arc::clone(&self.host)
    }

    pub(crate) fn set_host(&self, id: HostId) {
        let already_set = self.host.set(id).is_err();
        debug_assert!(!already_set, "host handle recorded twice");
    }

    /// The component instance bound to this vnode, once mounted.
    pub fn instance(&self) -> Option<&Arc<ComponentInstance>> {
        match &self.kind {
            NodeKind::Component { instance, .. } => instance.get(),
            _ => None,
        }
    }

    pub(crate) fn set_instance(&self, instance: Arc<ComponentInstance>) {
        if let NodeKind::Component {
            instance: slot, ..
        } = &self.kind
        {
            let _ = slot.set(instance);
        }
    }
}

/// Builder for element vnodes.
pub struct ElementBuilder {
    tag: String,
    props: Props,
    children: Children,
}

impl ElementBuilder {
    /// Set one attribute.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Raw text content. Replaces any child nodes added so far.
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.children = Children::Text(content.into());
        self
    }

    /// Append a child node. Replaces raw text content if any was set.
    pub fn child(mut self, child: VNode) -> Self {
        match &mut self.children {
            Children::Nodes(nodes) => nodes.push(child),
            Children::Text(_) => self.children = Children::Nodes(vec![child]),
        }
        self
    }

    /// Append several child nodes.
    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> Self {
        for node in nodes {
            self = self.child(node);
        }
        self
    }

    pub fn build(self) -> VNode {
        let props = if self.props.is_empty() {
            empty_props()
        } else {
            Arc::new(self.props)
        };
        VNode::with_kind(NodeKind::Element {
            tag: self.tag,
            props,
            children: self.children,
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
