//! Components
//!
//! A [`Component`] is a definition: how to build the component's
//! reactive state and how to render it. A [`ComponentInstance`] is one
//! mounted occurrence of that definition, owning the state store exposed
//! to the render function, the subtree the last render produced, and the
//! render effect that keeps it reactive.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::RenderError;
use crate::reactive::{Effect, Store};

use super::vnode::VNode;

/// Lifecycle phase of a component instance.
///
/// `Unmounted` is the initial phase; there is no terminal phase while
/// the instance is alive. A mounted instance alternates between `Stable`
/// and `Updating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created; the render effect has not produced host nodes yet.
    Unmounted,
    /// First render pass in progress.
    Mounting,
    /// Mounted, no render pass in progress.
    Stable,
    /// Mounted, re-render in progress.
    Updating,
}

type SetupFn = dyn Fn() -> Store + Send + Sync;
type RenderFn = dyn Fn(&Store) -> VNode + Send + Sync;

/// A component definition.
pub struct Component {
    name: String,
    setup: Box<SetupFn>,
    render: Box<RenderFn>,
}

impl Component {
    /// Define a component. `setup` builds the reactive state exposed to
    /// `render`; both run once per mounted instance, `render` again on
    /// every dependency change.
    pub fn new<S, R>(name: impl Into<String>, setup: S, render: R) -> Arc<Self>
    where
        S: Fn() -> Store + Send + Sync + 'static,
        R: Fn(&Store) -> VNode + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            setup: Box::new(setup),
            render: Box::new(render),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn instantiate(
        self: &Arc<Self>,
        parent: Option<&Arc<ComponentInstance>>,
    ) -> Arc<ComponentInstance> {
        Arc::new(ComponentInstance {
            def: Arc::clone(self),
            state: (self.setup)(),
            sub_tree: RwLock::new(None),
            phase: RwLock::new(Phase::Unmounted),
            parent: parent.map(Arc::downgrade).unwrap_or_default(),
            effect: RwLock::new(None),
            error: RwLock::new(None),
        })
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name).finish()
    }
}

/// One mounted occurrence of a component.
pub struct ComponentInstance {
    def: Arc<Component>,
    /// Reactive state exposed to the render function.
    state: Store,
    /// Tree produced by the most recent render pass.
    sub_tree: RwLock<Option<Arc<VNode>>>,
    phase: RwLock<Phase>,
    /// Scope resolution only, never an ownership edge.
    parent: Weak<ComponentInstance>,
    /// Render effect keeping this instance reactive. Held so the effect
    /// lives exactly as long as the instance.
    effect: RwLock<Option<Effect>>,
    /// Failure recorded by a render pass that had no caller to return
    /// to.
    error: RwLock<Option<RenderError>>,
}

impl ComponentInstance {
    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn state(&self) -> &Store {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    /// Whether the first render pass has completed.
    pub fn is_mounted(&self) -> bool {
        matches!(self.phase(), Phase::Stable | Phase::Updating)
    }

    pub fn parent(&self) -> Option<Arc<ComponentInstance>> {
        self.parent.upgrade()
    }

    /// The tree the last render pass produced.
    pub fn sub_tree(&self) -> Option<Arc<VNode>> {
        self.sub_tree.read().clone()
    }

    /// Take the most recent recorded render failure, if any.
    pub fn take_error(&self) -> Option<RenderError> {
        self.error.write().take()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        *self.phase.write() = phase;
    }

    pub(crate) fn render(&self) -> VNode {
        (self.def.render)(&self.state)
    }

    pub(crate) fn store_sub_tree(&self, tree: Arc<VNode>) {
        *self.sub_tree.write() = Some(tree);
    }

    pub(crate) fn attach_effect(&self, effect: Effect) {
        *self.effect.write() = Some(effect);
    }

    pub(crate) fn record_error(&self, err: RenderError) {
        *self.error.write() = Some(err);
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("name", &self.name())
            .field("phase", &self.phase())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
