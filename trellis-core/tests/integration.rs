//! Integration Tests for the Reactive Rendering Pipeline
//!
//! These tests drive the whole stack end to end: cells and stores feed
//! component render functions, the reconciler turns the produced vnode
//! trees into mutations on a mock host, and later writes re-render and
//! patch synchronously.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use trellis_core::error::RenderError;
use trellis_core::reactive::{Cell, Memo, Store};
use trellis_core::render::{create_app, Component, HostId, HostOps, Renderer, VNode};
use trellis_core::value::Value;

// ----------------------------------------------------------------------------
// Mock host
// ----------------------------------------------------------------------------

/// An in-memory host tree that records every mutation applied to it.
struct MockHost {
    nodes: Vec<MockNode>,
    patch_prop_calls: usize,
    fail_tag: Option<String>,
}

#[derive(Default)]
struct MockNode {
    tag: Option<String>,
    text: Option<String>,
    attrs: BTreeMap<String, Value>,
    children: Vec<u64>,
    inserted: u32,
}

impl MockHost {
    /// A host with one pre-existing root container.
    fn new() -> Self {
        Self {
            nodes: vec![MockNode {
                tag: Some("root".into()),
                ..MockNode::default()
            }],
            patch_prop_calls: 0,
            fail_tag: None,
        }
    }

    fn failing_on(tag: &str) -> Self {
        let mut host = Self::new();
        host.fail_tag = Some(tag.to_string());
        host
    }

    fn root() -> HostId {
        HostId::new(0)
    }

    fn node(&self, id: HostId) -> &MockNode {
        &self.nodes[id.raw() as usize]
    }

    fn alloc(&mut self, node: MockNode) -> HostId {
        self.nodes.push(node);
        HostId::new(self.nodes.len() as u64 - 1)
    }
}

impl HostOps for MockHost {
    fn create_element(&mut self, tag: &str) -> Result<HostId, RenderError> {
        if self.fail_tag.as_deref() == Some(tag) {
            return Err(RenderError::Host(format!("cannot create <{tag}>")));
        }
        Ok(self.alloc(MockNode {
            tag: Some(tag.to_string()),
            ..MockNode::default()
        }))
    }

    fn create_text(&mut self, content: &str) -> Result<HostId, RenderError> {
        Ok(self.alloc(MockNode {
            text: Some(content.to_string()),
            ..MockNode::default()
        }))
    }

    fn set_element_text(&mut self, node: HostId, content: &str) -> Result<(), RenderError> {
        self.nodes[node.raw() as usize].text = Some(content.to_string());
        Ok(())
    }

    fn patch_prop(
        &mut self,
        node: HostId,
        key: &str,
        _prev: Option<&Value>,
        next: Option<&Value>,
    ) -> Result<(), RenderError> {
        self.patch_prop_calls += 1;
        let attrs = &mut self.nodes[node.raw() as usize].attrs;
        match next {
            Some(value) => {
                attrs.insert(key.to_string(), value.clone());
            }
            None => {
                attrs.remove(key);
            }
        }
        Ok(())
    }

    fn insert(&mut self, node: HostId, container: HostId) -> Result<(), RenderError> {
        self.nodes[container.raw() as usize].children.push(node.raw());
        self.nodes[node.raw() as usize].inserted += 1;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------------

/// Rendering a text vnode into an empty container yields exactly one
/// host text node, appended once.
#[test]
fn text_mount() {
    let hello = Component::new("hello", Store::new, |_state| VNode::text("hello"));
    let app = create_app(MockHost::new(), hello);
    app.mount(MockHost::root()).unwrap();

    let host = app.host();
    let host = host.read();
    let root = host.node(MockHost::root());
    assert_eq!(root.children.len(), 1);

    let text = host.node(HostId::new(root.children[0]));
    assert_eq!(text.text.as_deref(), Some("hello"));
    assert_eq!(text.inserted, 1);
}

/// An element with a prop and a text child mounts as one host element
/// containing one host text node.
#[test]
fn element_mount_with_children() {
    let view = Component::new("view", Store::new, |_state| {
        VNode::element("div")
            .prop("id", "x")
            .child(VNode::text("hi"))
            .build()
    });
    let app = create_app(MockHost::new(), view);
    app.mount(MockHost::root()).unwrap();

    let host = app.host();
    let host = host.read();
    let root = host.node(MockHost::root());
    assert_eq!(root.children.len(), 1);

    let div = host.node(HostId::new(root.children[0]));
    assert_eq!(div.tag.as_deref(), Some("div"));
    assert_eq!(div.attrs.get("id"), Some(&Value::Str("x".into())));
    assert_eq!(div.inserted, 1);
    assert_eq!(div.children.len(), 1);

    let text = host.node(HostId::new(div.children[0]));
    assert_eq!(text.text.as_deref(), Some("hi"));
}

/// The mounted vnode's handle is set exactly once and names the host
/// node that was actually inserted.
#[test]
fn host_handle_matches_the_inserted_node() {
    let view = Component::new("view", Store::new, |_state| {
        VNode::element("div").build()
    });
    let app = create_app(MockHost::new(), view);
    app.mount(MockHost::root()).unwrap();

    let tree = app.tree().expect("mounted");
    let instance = tree.instance().expect("instance attached");
    let sub_tree = instance.sub_tree().expect("subtree stored");

    let el = sub_tree.host().expect("element mounted");
    // the component vnode carries its subtree's root handle
    assert_eq!(tree.host(), Some(el));

    let host = app.host();
    let host = host.read();
    assert_eq!(host.node(MockHost::root()).children, vec![el.raw()]);
    assert_eq!(host.node(el).inserted, 1);
}

/// Fragment children mount transparently into the fragment's container.
#[test]
fn fragment_children_mount_into_the_parent_container() {
    let view = Component::new("view", Store::new, |_state| {
        VNode::fragment(vec![
            VNode::text("a"),
            VNode::element("p").text("b").build(),
        ])
    });
    let app = create_app(MockHost::new(), view);
    app.mount(MockHost::root()).unwrap();

    let host = app.host();
    let host = host.read();
    let root = host.node(MockHost::root());
    assert_eq!(root.children.len(), 2);
    assert_eq!(host.node(HostId::new(root.children[0])).text.as_deref(), Some("a"));
    assert_eq!(host.node(HostId::new(root.children[1])).tag.as_deref(), Some("p"));
}

/// Old props `{a:1, b:2}` to new props `{a:1, c:3}` issues exactly two
/// host calls: set `c`, remove `b`. Nothing for the unchanged `a`.
#[test]
fn prop_patch_minimality() {
    let renderer = Renderer::new(MockHost::new());

    let old = VNode::element("div").prop("a", 1).prop("b", 2).build();
    renderer.patch(None, &old, MockHost::root(), None).unwrap();

    let calls_after_mount = renderer.host().read().patch_prop_calls;

    let new = VNode::element("div").prop("a", 1).prop("c", 3).build();
    renderer
        .patch(Some(&old), &new, MockHost::root(), None)
        .unwrap();

    let host = renderer.host();
    let host = host.read();
    assert_eq!(host.patch_prop_calls - calls_after_mount, 2);

    let el = host.node(new.host().expect("patched element keeps its handle"));
    assert_eq!(el.attrs.get("a"), Some(&Value::Int(1)));
    assert_eq!(el.attrs.get("c"), Some(&Value::Int(3)));
    assert!(!el.attrs.contains_key("b"));
}

/// Writing a distinguishable value to a cell the render read re-renders
/// exactly once, patches the existing element, and does not re-create
/// the component instance.
#[test]
fn component_re_render() {
    let count = Cell::new(0_i64);
    let renders = Arc::new(AtomicI32::new(0));
    let setups = Arc::new(AtomicI32::new(0));

    let counter = Component::new(
        "counter",
        {
            let setups = setups.clone();
            move || {
                setups.fetch_add(1, Ordering::SeqCst);
                Store::new()
            }
        },
        {
            let count = count.clone();
            let renders = renders.clone();
            move |_state| {
                renders.fetch_add(1, Ordering::SeqCst);
                VNode::element("div").prop("data-count", count.read()).build()
            }
        },
    );

    let app = create_app(MockHost::new(), counter);
    app.mount(MockHost::root()).unwrap();

    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(setups.load(Ordering::SeqCst), 1);

    let instance = app.tree().unwrap().instance().cloned().expect("instance");
    let el = instance.sub_tree().unwrap().host().expect("mounted");

    count.write(1);

    // one additional render pass, same instance, same host element
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    assert_eq!(setups.load(Ordering::SeqCst), 1);

    let after = app.tree().unwrap().instance().cloned().expect("instance");
    assert!(Arc::ptr_eq(&instance, &after));
    assert_eq!(after.sub_tree().unwrap().host(), Some(el));

    let host = app.host();
    let host = host.read();
    assert_eq!(host.node(el).attrs.get("data-count"), Some(&Value::Int(1)));
    // the element was inserted only by the initial mount
    assert_eq!(host.node(el).inserted, 1);
}

/// Writes that are not distinguishable under the same-value rule never
/// re-render: equal ints, `NaN` over `NaN`. Replacing `0.0` with `-0.0`
/// is distinguishable and does re-render.
#[test]
fn no_op_writes_do_not_re_render() {
    let number = Cell::new(Value::Float(f64::NAN));
    let renders = Arc::new(AtomicI32::new(0));

    let view = Component::new("view", Store::new, {
        let number = number.clone();
        let renders = renders.clone();
        move |_state| {
            renders.fetch_add(1, Ordering::SeqCst);
            VNode::element("div").prop("value", number.read()).build()
        }
    });

    let app = create_app(MockHost::new(), view);
    app.mount(MockHost::root()).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    number.write(Value::Float(f64::NAN));
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    number.write(Value::Float(0.0));
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    number.write(Value::Float(0.0));
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    number.write(Value::Float(-0.0));
    assert_eq!(renders.load(Ordering::SeqCst), 3);
}

/// Mutating a nested field through the wrapped view of a composite
/// behaves as a write to that field's own cell.
#[test]
fn deep_reactivity_through_nested_stores() {
    let renders = Arc::new(AtomicI32::new(0));

    let profile = Component::new(
        "profile",
        || Store::with([("user", Value::map([("name", "ada")]))]),
        {
            let renders = renders.clone();
            move |state| {
                renders.fetch_add(1, Ordering::SeqCst);
                let name = match state.get("user") {
                    Value::Store(user) => user.get("name"),
                    other => other,
                };
                VNode::element("span").prop("title", name).build()
            }
        },
    );

    let app = create_app(MockHost::new(), profile);
    app.mount(MockHost::root()).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    let instance = app.tree().unwrap().instance().cloned().expect("instance");
    let el = instance.sub_tree().unwrap().host().expect("mounted");
    {
        let host = app.host();
        let host = host.read();
        assert_eq!(host.node(el).attrs.get("title"), Some(&Value::Str("ada".into())));
    }

    // reach the same nested store the render reads through
    let user = instance
        .state()
        .get_untracked("user")
        .as_store()
        .cloned()
        .expect("nested map wraps to a store");

    user.set("name", "grace");

    assert_eq!(renders.load(Ordering::SeqCst), 2);
    let host = app.host();
    let host = host.read();
    assert_eq!(
        host.node(el).attrs.get("title"),
        Some(&Value::Str("grace".into()))
    );

    // writing the same name again is a no-op
    user.set("name", "grace");
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

/// A memo between a cell and a render function propagates changes end
/// to end.
#[test]
fn memo_feeds_a_render_function() {
    let count = Cell::new(2_i64);
    let doubled = Memo::new({
        let count = count.clone();
        move || count.read() * 2
    });

    let view = Component::new("view", Store::new, {
        let doubled = doubled.clone();
        move |_state| {
            VNode::element("div").prop("value", doubled.get()).build()
        }
    });

    let app = create_app(MockHost::new(), view);
    app.mount(MockHost::root()).unwrap();

    let el = app
        .tree()
        .unwrap()
        .instance()
        .unwrap()
        .sub_tree()
        .unwrap()
        .host()
        .unwrap();
    {
        let host = app.host();
        let host = host.read();
        assert_eq!(host.node(el).attrs.get("value"), Some(&Value::Int(4)));
    }

    count.write(5);

    let host = app.host();
    let host = host.read();
    assert_eq!(host.node(el).attrs.get("value"), Some(&Value::Int(10)));
}

/// A failing host operation aborts the mount and propagates unchanged.
#[test]
fn host_failure_propagates_out_of_mount() {
    let view = Component::new("view", Store::new, |_state| {
        VNode::element("boom").build()
    });
    let app = create_app(MockHost::failing_on("boom"), view);

    let err = app.mount(MockHost::root()).unwrap_err();
    assert!(matches!(err, RenderError::Host(_)));
}

/// Nested components mount depth first: the child's subtree lands inside
/// the parent's element.
#[test]
fn nested_components_mount_inside_their_parent() {
    let child = Component::new("child", Store::new, |_state| {
        VNode::element("em").text("inner").build()
    });
    let parent = Component::new("parent", Store::new, {
        let child = child.clone();
        move |_state| {
            VNode::element("section")
                .child(VNode::component(child.clone()))
                .build()
        }
    });

    let app = create_app(MockHost::new(), parent);
    app.mount(MockHost::root()).unwrap();

    let host = app.host();
    let host = host.read();
    let root = host.node(MockHost::root());
    assert_eq!(root.children.len(), 1);

    let section = host.node(HostId::new(root.children[0]));
    assert_eq!(section.tag.as_deref(), Some("section"));
    assert_eq!(section.children.len(), 1);

    let em = host.node(HostId::new(section.children[0]));
    assert_eq!(em.tag.as_deref(), Some("em"));
    assert_eq!(em.text.as_deref(), Some("inner"));
}
