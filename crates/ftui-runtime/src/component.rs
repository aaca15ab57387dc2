#![forbid(unsafe_code)]

//! Component tree: arena of nodes, lifecycle, dirty propagation.
//!
//! Per the engine's design notes, component↔parent links never use owning
//! back-pointers: the tree is an arena of [`Node`]s indexed by stable
//! [`ComponentId`]s, and parent/child edges are plain ID pairs. The tree
//! owns every node; dropping a subtree's root ID from the arena is the only
//! way a component goes away.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use ftui_core::event::{KeyEvent, MouseEvent};
use ftui_core::geometry::Rect;

use crate::engine::{LifecycleError, RenderContext};

/// Stable identifier for a node in the component arena.
///
/// IDs are never reused while a node referencing them could still be alive
/// in a caller's hands (the arena only recycles a slot after `unmount` has
/// fully removed it), but callers should still treat an ID as opaque and
/// let [`ComponentTree`] validate it.
pub type ComponentId = u32;

/// What a component's `render` produces: a frame-local snapshot, not a
/// stream. The engine consumes it once per composite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// Rendered lines, top to bottom, relative to the component's bounds.
    pub lines: Vec<String>,
    /// Requested cursor position, relative to the component's bounds.
    pub cursor: Option<(u16, u16)>,
}

impl Output {
    /// Build an output from plain lines with no cursor request.
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: None,
        }
    }

    /// Build a single-line output, e.g. for error banners.
    #[must_use]
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            cursor: None,
        }
    }
}

/// The result of attempting to render one component this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// `render` returned normally.
    Rendered(Output),
    /// `render` panicked; `message` is the panic payload, shown as an error
    /// banner in place of the component's real output. The component's
    /// dirty flag stays set so the next frame retries it.
    Failed(String),
}

/// Which interactive capabilities a component exposes to the engine.
///
/// These are advisory: the engine still performs hit-testing and bounds
/// checks before honoring them, and ignores `draggable`/`resizable` in
/// inline mode entirely (see the engine's Open Question on z-index).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Can receive keyboard focus and `tab`/`shift-tab` traversal.
    pub focusable: bool,
    /// Can be dragged by its body when the engine claims a press.
    pub draggable: bool,
    /// Can be resized via an edge/corner handle band.
    pub resizable: bool,
}

/// The behavior contract every tree node implements.
///
/// All methods have inert defaults except `render`, since a component with
/// no interactive behavior is still a valid, commonly-needed leaf (e.g. a
/// static label).
pub trait Component {
    /// One-shot initialization. Called exactly once, before the first
    /// render, when the node is attached to the tree.
    fn mount(&mut self, _ctx: &RenderContext) {}

    /// Teardown. Called exactly once, in post-order over children, when the
    /// node (or an ancestor) is removed from the tree.
    fn unmount(&mut self) {}

    /// Pure function of current state: the lines (and optional cursor hint)
    /// to composite at this node's bounds. Called only during composition.
    fn render(&self) -> Output;

    /// Handle a decoded key event. Returns `true` if consumed (stops
    /// bubbling to the parent), `false` to let it continue upward.
    fn handle_key(&mut self, _event: KeyEvent) -> bool {
        false
    }

    /// Handle a mouse event after hit-testing has selected this component.
    /// Same consumed/bubble convention as `handle_key`.
    fn handle_mouse(&mut self, _event: MouseEvent) -> bool {
        false
    }

    /// Notifies the component that its resolved bounds changed size; the
    /// component should invalidate any cached geometry but not re-render
    /// synchronously (that happens on the next composite pass).
    fn on_resize(&mut self, _width: u16, _height: u16) {}
}

struct Node {
    component: Box<dyn Component>,
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    bounds: Rect,
    z: i32,
    visible: bool,
    focusable: bool,
    caps: Capabilities,
    dirty: bool,
    mounted: bool,
}

/// An event the tree emits for its own mutation hooks (`add_child` /
/// `remove_child`). The engine drains these after each dispatch to update
/// any bookkeeping that cares about structural changes (e.g. re-snapshotting
/// the layer list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    /// A child was attached under `parent`.
    ChildAdded {
        /// The parent the child was attached to.
        parent: ComponentId,
        /// The newly attached child.
        child: ComponentId,
    },
    /// A child (and its subtree) was detached from `parent`.
    ChildRemoved {
        /// The parent the child was detached from.
        parent: ComponentId,
        /// The detached child.
        child: ComponentId,
    },
    /// A component gained keyboard focus.
    Focus(ComponentId),
    /// A component lost keyboard focus.
    Blur(ComponentId),
}

/// The component arena: owns every mounted node, the dirty set, and the
/// focus cursor.
#[derive(Default)]
pub struct ComponentTree {
    nodes: Vec<Option<Node>>,
    free: Vec<ComponentId>,
    root: Option<ComponentId>,
    dirty: Vec<bool>,
    focus: Option<ComponentId>,
    events: VecDeque<TreeEvent>,
}

impl ComponentTree {
    /// Create an empty tree (no root mounted yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, node: Node) -> ComponentId {
        if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = Some(node);
            self.dirty[id as usize] = true;
            id
        } else {
            let id = self.nodes.len() as u32;
            self.nodes.push(Some(node));
            self.dirty.push(true);
            id
        }
    }

    fn node(&self, id: ComponentId) -> Option<&Node> {
        self.nodes.get(id as usize).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, id: ComponentId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize).and_then(|n| n.as_mut())
    }

    /// The tree's root, if one has been mounted.
    #[must_use]
    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    /// Mount `component` as the tree's root. Fails if a root already exists.
    pub fn mount_root(
        &mut self,
        mut component: Box<dyn Component>,
        caps: Capabilities,
        ctx: &RenderContext,
    ) -> Result<ComponentId, LifecycleError> {
        if self.root.is_some() {
            return Err(LifecycleError::AlreadyMounted(self.root.unwrap()));
        }
        component.mount(ctx);
        let id = self.alloc(Node {
            component,
            parent: None,
            children: Vec::new(),
            bounds: Rect::default(),
            z: 0,
            visible: true,
            focusable: caps.focusable,
            caps,
            dirty: true,
            mounted: true,
        });
        self.root = Some(id);
        Ok(id)
    }

    /// Mount `component` as a new child of `parent`, at local z-index `z`.
    /// Emits [`TreeEvent::ChildAdded`].
    pub fn add_child(
        &mut self,
        parent: ComponentId,
        mut component: Box<dyn Component>,
        z: i32,
        caps: Capabilities,
        ctx: &RenderContext,
    ) -> Result<ComponentId, LifecycleError> {
        if self.node(parent).is_none() {
            return Err(LifecycleError::NotMounted(parent));
        }
        component.mount(ctx);
        let id = self.alloc(Node {
            component,
            parent: Some(parent),
            children: Vec::new(),
            bounds: Rect::default(),
            z,
            visible: true,
            focusable: caps.focusable,
            caps,
            dirty: true,
            mounted: true,
        });
        self.node_mut(parent).expect("checked above").children.push(id);
        self.events.push_back(TreeEvent::ChildAdded { parent, child: id });
        Ok(id)
    }

    /// Unmount `child` (and its entire subtree, leaf-first) and detach it
    /// from `parent`. Emits [`TreeEvent::ChildRemoved`].
    pub fn remove_child(
        &mut self,
        parent: ComponentId,
        child: ComponentId,
    ) -> Result<(), LifecycleError> {
        let Some(p) = self.node_mut(parent) else {
            return Err(LifecycleError::NotMounted(parent));
        };
        let Some(pos) = p.children.iter().position(|&c| c == child) else {
            return Err(LifecycleError::NotMounted(child));
        };
        p.children.remove(pos);
        self.unmount_subtree(child);
        self.events.push_back(TreeEvent::ChildRemoved { parent, child });
        Ok(())
    }

    fn unmount_subtree(&mut self, id: ComponentId) {
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.unmount_subtree(child);
        }
        if let Some(mut node) = self.nodes[id as usize].take() {
            if node.mounted {
                node.component.unmount();
            }
            self.free.push(id);
            if self.focus == Some(id) {
                self.focus = None;
            }
        }
    }

    /// Unmount the entire tree, leaf-first, as `stop()` requires. Idempotent.
    pub fn unmount_all(&mut self) {
        if let Some(root) = self.root.take() {
            self.unmount_subtree(root);
        }
    }

    /// Mark a component dirty. Ancestors are not individually marked — the
    /// engine recomposites the whole layer set whenever any component is
    /// dirty, per the renderer's cell-diff-level optimization.
    pub fn mark_dirty(&mut self, id: ComponentId) {
        if let Some(slot) = self.dirty.get_mut(id as usize) {
            *slot = true;
        }
    }

    /// Whether any component is currently dirty.
    #[must_use]
    pub fn has_dirty(&self) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .any(|(i, n)| n.is_some() && self.dirty[i])
    }

    /// Clear every dirty flag. Must only be called after a successful flush.
    pub fn clear_dirty(&mut self) {
        for d in &mut self.dirty {
            *d = false;
        }
    }

    /// Keep a component's dirty flag set (used when its render failed and
    /// the engine painted an error banner instead).
    pub fn keep_dirty(&mut self, id: ComponentId) {
        self.mark_dirty(id);
    }

    /// Clear every dirty flag except the ids in `failed` — the components
    /// whose render panicked this frame via [`Self::render`]. Those keep
    /// their flag set so the next composite pass retries them.
    pub fn clear_dirty_except(&mut self, failed: &[ComponentId]) {
        for (i, d) in self.dirty.iter_mut().enumerate() {
            if !failed.contains(&(i as ComponentId)) {
                *d = false;
            }
        }
    }

    /// Drain pending structural/focus events.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.events.drain(..).collect()
    }

    /// Set a component's resolved bounds (from layout) and notify it via
    /// `on_resize` if the size changed.
    pub fn set_bounds(&mut self, id: ComponentId, bounds: Rect) {
        if let Some(node) = self.node_mut(id) {
            let changed = node.bounds.width != bounds.width || node.bounds.height != bounds.height;
            node.bounds = bounds;
            if changed {
                node.component.on_resize(bounds.width, bounds.height);
            }
        }
    }

    /// A component's last-resolved bounds.
    #[must_use]
    pub fn bounds(&self, id: ComponentId) -> Option<Rect> {
        self.node(id).map(|n| n.bounds)
    }

    /// A component's local z-index (relative to its siblings).
    #[must_use]
    pub fn z(&self, id: ComponentId) -> Option<i32> {
        self.node(id).map(|n| n.z)
    }

    /// A component's parent, if any.
    #[must_use]
    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// A component's children, in tree (declaration) order.
    #[must_use]
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether a component is currently visible.
    #[must_use]
    pub fn visible(&self, id: ComponentId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    /// Set a component's visibility.
    pub fn set_visible(&mut self, id: ComponentId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
        self.mark_dirty(id);
    }

    /// A component's interactive capability flags.
    #[must_use]
    pub fn capabilities(&self, id: ComponentId) -> Option<Capabilities> {
        self.node(id).map(|n| n.caps)
    }

    /// Pre-order traversal starting at the tree root (children visited in
    /// declaration order). This is both the layer manager's tie-break order
    /// and the focus traversal's declaration order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<ComponentId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.pre_order_from(root, &mut out);
        }
        out
    }

    fn pre_order_from(&self, id: ComponentId, out: &mut Vec<ComponentId>) {
        out.push(id);
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                self.pre_order_from(child, out);
            }
        }
    }

    /// Render a single component, catching a panic inside `render` rather
    /// than letting it abort the frame. Returns `None` if the id is
    /// unmounted.
    ///
    /// On panic, the component's dirty flag is kept set via
    /// [`Self::keep_dirty`] — it is *not* cleared until a subsequent call
    /// here renders successfully — so the engine's next
    /// [`Self::clear_dirty_except`] call leaves this component dirty for a
    /// retry next frame.
    #[must_use]
    pub fn render(&mut self, id: ComponentId) -> Option<RenderOutcome> {
        let node = self.node(id)?;
        match catch_unwind(AssertUnwindSafe(|| node.component.render())) {
            Ok(output) => Some(RenderOutcome::Rendered(output)),
            Err(payload) => {
                let message = panic_payload_message(&*payload);
                self.keep_dirty(id);
                Some(RenderOutcome::Failed(message))
            }
        }
    }

    /// Dispatch a key event to the focused component, bubbling to ancestors
    /// while it returns `false`. Returns `true` if any component consumed it.
    pub fn dispatch_key(&mut self, event: KeyEvent) -> bool {
        let Some(mut current) = self.focus else {
            return false;
        };
        loop {
            let consumed = self
                .node_mut(current)
                .is_some_and(|n| n.component.handle_key(event));
            if consumed {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Dispatch a mouse event directly to `id` (the hit-test result),
    /// bubbling to ancestors while it returns `false`.
    pub fn dispatch_mouse(&mut self, id: ComponentId, event: MouseEvent) -> bool {
        let mut current = id;
        loop {
            let consumed = self
                .node_mut(current)
                .is_some_and(|n| n.component.handle_mouse(event));
            if consumed {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Advance focus to the next focusable component in declaration order
    /// (wrapping). Emits `Blur`/`Focus` events.
    pub fn focus_next(&mut self) {
        self.focus_step(1);
    }

    /// Reverse focus to the previous focusable component in declaration
    /// order (wrapping). Emits `Blur`/`Focus` events.
    pub fn focus_prev(&mut self) {
        self.focus_step(-1);
    }

    fn focus_step(&mut self, dir: i32) {
        let order = self.pre_order();
        let focusable: Vec<ComponentId> = order
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(|n| n.focusable))
            .collect();
        if focusable.is_empty() {
            return;
        }
        let current_idx = self
            .focus
            .and_then(|f| focusable.iter().position(|&id| id == f));
        let next_idx = match current_idx {
            Some(i) => {
                let len = focusable.len() as i32;
                (((i as i32) + dir).rem_euclid(len)) as usize
            }
            None if dir >= 0 => 0,
            None => focusable.len() - 1,
        };
        let next = focusable[next_idx];
        if Some(next) == self.focus {
            return;
        }
        if let Some(prev) = self.focus.replace(next) {
            self.mark_dirty(prev);
            self.events.push_back(TreeEvent::Blur(prev));
        }
        self.mark_dirty(next);
        self.events.push_back(TreeEvent::Focus(next));
    }

    /// The currently focused component, if any.
    #[must_use]
    pub fn focused(&self) -> Option<ComponentId> {
        self.focus
    }
}

/// Extract a human-readable message from a `catch_unwind` payload. Panics
/// from `panic!("...")` and `.unwrap()`/`.expect("...")` land in one of
/// these two downcasts; anything else (a custom payload type) falls back to
/// a generic message rather than losing the frame.
fn panic_payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "component panicked".to_string()
    }
}
