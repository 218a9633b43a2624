//! Widget tree for hierarchical UI management.
//!
//! Nodes live in an arena keyed by [`WidgetId`]. Each node has at most one
//! owner; a node without an owner is either a root or a detached subtree the
//! caller may re-attach or destroy.

use super::listener::{Event, EventCx, EventName, Listener, ListenerHandle, UiRequest};
use super::{Widget, WidgetFlags, WidgetId};
use crate::error::{UiError, UiResult};
use crate::layout::{Layout, Rect};
use std::collections::HashMap;

/// One widget plus its structural state.
pub(crate) struct Node {
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) layout: Layout,
    pub(crate) geometry: Rect,
    pub(crate) flags: WidgetFlags,
    listeners: HashMap<EventName, Vec<(ListenerHandle, Listener)>>,
    pub(crate) widget: Box<dyn Widget>,
}

/// Manages the widget hierarchy.
pub struct WidgetTree {
    /// Nodes indexed by ID.
    nodes: HashMap<WidgetId, Node>,
    /// ID counter for generating unique IDs.
    next_id: u64,
    /// Counter for listener handles.
    next_listener: u64,
    /// Requests raised by listeners, drained by the input router.
    requests: Vec<UiRequest>,
}

impl WidgetTree {
    /// Creates a new empty widget tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::with_capacity(256),
            next_id: 1,
            next_listener: 1,
            requests: Vec::new(),
        }
    }

    /// Creates a detached widget.
    pub fn create(&mut self, widget: impl Widget, layout: Layout) -> WidgetId {
        let id = WidgetId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent: None,
                children: Vec::new(),
                layout,
                geometry: Rect::ZERO,
                flags: WidgetFlags::NEW,
                listeners: HashMap::new(),
                widget: Box::new(widget),
            },
        );
        id
    }

    pub(crate) fn node(&self, id: WidgetId) -> UiResult<&Node> {
        self.nodes.get(&id).ok_or(UiError::UnknownWidget(id))
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> UiResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(UiError::UnknownWidget(id))
    }

    /// Returns true if the widget exists.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live widgets, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Short name of a widget's content type, for trace output.
    #[must_use]
    pub fn widget_name(&self, id: WidgetId) -> &'static str {
        self.nodes.get(&id).map_or("<gone>", |n| n.widget.name())
    }

    /// Returns the owner of a widget.
    #[must_use]
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Returns the children of a widget.
    #[must_use]
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Returns the geometry computed by the last layout run.
    #[must_use]
    pub fn geometry(&self, id: WidgetId) -> Option<Rect> {
        self.nodes.get(&id).map(|n| n.geometry)
    }

    /// Moves a widget. Only meaningful for roots; owners overwrite their
    /// children's positions on every layout run.
    pub fn set_position(&mut self, id: WidgetId, x: i32, y: i32) -> UiResult<()> {
        let node = self.node_mut(id)?;
        node.geometry.x = x;
        node.geometry.y = y;
        self.damage_layout(id)
    }

    /// Returns the flag bits of a widget.
    #[must_use]
    pub fn flags(&self, id: WidgetId) -> Option<WidgetFlags> {
        self.nodes.get(&id).map(|n| n.flags)
    }

    /// Replaces a widget's layout strategy and schedules a relayout.
    pub fn set_layout(&mut self, id: WidgetId, layout: Layout) -> UiResult<()> {
        self.node_mut(id)?.layout = layout;
        self.damage_layout(id)
    }

    /// Gives mutable access to a widget's layout and schedules a relayout.
    pub fn with_layout<R>(&mut self, id: WidgetId, f: impl FnOnce(&mut Layout) -> R) -> UiResult<R> {
        let result = f(&mut self.node_mut(id)?.layout);
        self.damage_layout(id)?;
        Ok(result)
    }

    /// Returns true if `ancestor` is `id` or one of its owners.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Appends `child` to `parent`, detaching it from any previous owner.
    ///
    /// Re-adding a widget to its current owner leaves the tree unchanged.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<()> {
        self.node(parent)?;
        let old_owner = self.node(child)?.parent;
        if old_owner == Some(parent) {
            return Ok(());
        }
        if self.is_ancestor(child, parent) {
            tracing::warn!("rejected attaching {:?} under its own descendant {:?}", child, parent);
            return Err(UiError::WouldCycle { parent, child });
        }

        if let Some(old) = old_owner {
            self.remove_child(old, child)?;
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.damage_layout(parent)
    }

    /// Detaches `child` from `parent`. The child and its subtree stay alive.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> UiResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(UiError::NotAChild { parent, child });
        }

        self.node_mut(child)?.parent = None;
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.damage_layout(parent)
    }

    /// Detaches a widget if attached, then drops it and its whole subtree.
    pub fn destroy(&mut self, id: WidgetId) -> UiResult<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.remove(&cur) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Lays out `id` and its subtree, children before owners.
    ///
    /// # Panics
    ///
    /// Panics if a fixed-size widget has children.
    pub fn run_layout(&mut self, id: WidgetId) -> UiResult<()> {
        let children = self.node(id)?.children.clone();
        for &child in &children {
            self.run_layout(child)?;
        }

        let mut rects = children
            .iter()
            .map(|c| self.node(*c).map(|n| n.geometry))
            .collect::<UiResult<Vec<_>>>()?;

        let node = self.node_mut(id)?;
        let (width, height) = node.layout.arrange(&mut rects);
        node.geometry.width = width;
        node.geometry.height = height;

        for (child, rect) in children.iter().zip(rects) {
            self.node_mut(*child)?.geometry = rect;
        }
        Ok(())
    }

    /// Marks a widget's own content as changed.
    ///
    /// The matching child-damaged flag is raised on the widget and every
    /// owner up to the root, stopping at the first one that already has it.
    pub fn damage(&mut self, id: WidgetId) -> UiResult<()> {
        let node = self.node_mut(id)?;
        if node.flags.has(WidgetFlags::DAMAGED) {
            return Ok(());
        }
        node.flags.set(WidgetFlags::DAMAGED);
        let flag = if node.flags.has(WidgetFlags::DYNAMIC) {
            WidgetFlags::DYNAMIC_CHILD_DAMAGED
        } else {
            WidgetFlags::STATIC_CHILD_DAMAGED
        };
        self.propagate(id, flag);
        Ok(())
    }

    /// Marks the geometry of a widget (and so of every owner) as stale.
    pub fn damage_layout(&mut self, id: WidgetId) -> UiResult<()> {
        self.node(id)?;
        self.propagate(id, WidgetFlags::LAYOUT_DAMAGED);
        Ok(())
    }

    fn propagate(&mut self, id: WidgetId, flag: u32) {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(node) = self.nodes.get_mut(&c) else {
                break;
            };
            if node.flags.has(flag) {
                break;
            }
            node.flags.set(flag);
            cur = node.parent;
        }
    }

    fn damage_both_passes(&mut self, id: WidgetId) {
        self.propagate(id, WidgetFlags::STATIC_CHILD_DAMAGED);
        self.propagate(id, WidgetFlags::DYNAMIC_CHILD_DAMAGED);
    }

    /// Shows or hides a widget and its subtree.
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) -> UiResult<()> {
        let node = self.node_mut(id)?;
        if node.flags.has(WidgetFlags::HIDDEN) == hidden {
            return Ok(());
        }
        node.flags.assign(WidgetFlags::HIDDEN, hidden);
        self.damage_both_passes(id);
        Ok(())
    }

    /// Returns true if the widget itself carries the hidden flag.
    #[must_use]
    pub fn is_hidden(&self, id: WidgetId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.flags.has(WidgetFlags::HIDDEN))
    }

    /// Returns true if the widget is drawn in the dynamic pass.
    #[must_use]
    pub fn is_dynamic(&self, id: WidgetId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.flags.has(WidgetFlags::DYNAMIC))
    }

    /// Moves a widget between the static and dynamic buffers.
    ///
    /// Both passes are rebuilt so the widget never appears in both.
    pub fn set_dynamic(&mut self, id: WidgetId, dynamic: bool) -> UiResult<()> {
        let node = self.node_mut(id)?;
        if node.flags.has(WidgetFlags::DYNAMIC) == dynamic {
            return Ok(());
        }
        node.flags.assign(WidgetFlags::DYNAMIC, dynamic);
        self.damage_both_passes(id);
        Ok(())
    }

    /// Clears `LAYOUT_DAMAGED` on a whole subtree.
    pub(crate) fn clear_layout_damage(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&cur) {
                node.flags.clear(WidgetFlags::LAYOUT_DAMAGED);
                stack.extend(node.children.iter().copied());
            }
        }
    }

    pub(crate) fn force_flags(&mut self, id: WidgetId, flag: u32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.flags.set(flag);
        }
    }

    /// Borrows a widget as its concrete type.
    pub fn widget<T: Widget>(&self, id: WidgetId) -> UiResult<&T> {
        let widget: &dyn Widget = &*self.node(id)?.widget;
        widget.as_any().downcast_ref::<T>().ok_or(UiError::WrongWidgetType {
            id,
            expected: std::any::type_name::<T>(),
        })
    }

    /// Mutably borrows a widget as its concrete type without damaging it.
    pub fn widget_mut<T: Widget>(&mut self, id: WidgetId) -> UiResult<&mut T> {
        let widget: &mut dyn Widget = &mut *self.node_mut(id)?.widget;
        widget
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(UiError::WrongWidgetType {
                id,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Runs `f` on a widget and damages it if `f` reports a change.
    pub fn update<T: Widget>(&mut self, id: WidgetId, f: impl FnOnce(&mut T) -> bool) -> UiResult<bool> {
        let changed = f(self.widget_mut::<T>(id)?);
        if changed {
            self.damage(id)?;
        }
        Ok(changed)
    }

    /// Registers a listener for `name` on a widget.
    pub fn add_listener<F>(&mut self, id: WidgetId, name: EventName, f: F) -> UiResult<ListenerHandle>
    where
        F: FnMut(&mut EventCx<'_>, &Event<'_>) -> bool + 'static,
    {
        let handle = ListenerHandle(self.next_listener);
        self.next_listener += 1;
        self.node_mut(id)?
            .listeners
            .entry(name)
            .or_default()
            .push((handle, Box::new(f)));
        Ok(handle)
    }

    /// Unregisters a listener. Returns false if it was not registered.
    ///
    /// A listener cannot remove itself (or siblings under the same name)
    /// while that name is being dispatched.
    pub fn remove_listener(&mut self, id: WidgetId, name: &EventName, handle: ListenerHandle) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let Some(list) = node.listeners.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(h, _)| *h != handle);
        let removed = list.len() != before;
        if list.is_empty() {
            node.listeners.remove(name);
        }
        removed
    }

    /// Returns true if the widget has at least one listener for `name`.
    #[must_use]
    pub fn has_listener(&self, id: WidgetId, name: &EventName) -> bool {
        self.nodes
            .get(&id)
            .and_then(|n| n.listeners.get(name))
            .is_some_and(|l| !l.is_empty())
    }

    /// Runs every listener for `name` on `id` in registration order.
    ///
    /// Returns the last listener's result, or `None` if there were none.
    pub fn dispatch(&mut self, id: WidgetId, name: &EventName, event: &Event<'_>) -> Option<bool> {
        let mut list = self.nodes.get_mut(&id)?.listeners.remove(name)?;

        let mut result = None;
        {
            let mut cx = EventCx { tree: self, target: id };
            for (_, listener) in &mut list {
                result = Some(listener(&mut cx, event));
            }
        }

        // Listeners added during dispatch go after the original ones.
        if let Some(node) = self.nodes.get_mut(&id) {
            if let Some(added) = node.listeners.remove(name) {
                list.extend(added);
            }
            node.listeners.insert(name.clone(), list);
        }
        result
    }

    pub(crate) fn push_request(&mut self, request: UiRequest) {
        self.requests.push(request);
    }

    /// Takes every request raised by listeners since the last call.
    pub fn take_requests(&mut self) -> Vec<UiRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Absolute position of a widget: the sum of its own and all owners'
    /// offsets, the root's included.
    #[must_use]
    pub fn absolute_position(&self, id: WidgetId) -> Option<(i32, i32)> {
        let mut node = self.nodes.get(&id)?;
        let (mut x, mut y) = (node.geometry.x, node.geometry.y);
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            x += node.geometry.x;
            y += node.geometry.y;
        }
        Some((x, y))
    }

    /// Returns all widget IDs under `root` in depth-first order.
    pub fn iter_dfs(&self, root: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        WidgetDfsIterator {
            tree: self,
            stack: if self.contains(root) { vec![root] } else { Vec::new() },
        }
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over widget tree.
struct WidgetDfsIterator<'a> {
    tree: &'a WidgetTree,
    stack: Vec<WidgetId>,
}

impl Iterator for WidgetDfsIterator<'_> {
    type Item = WidgetId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;

        // Push children in reverse order so they're processed left-to-right
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push(child);
        }

        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Spacer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn clean(tree: &mut WidgetTree, root: WidgetId) {
        let ids: Vec<_> = tree.iter_dfs(root).collect();
        for id in ids {
            tree.node_mut(id).unwrap().flags = WidgetFlags::default();
        }
    }

    #[test]
    fn test_tree_hierarchy() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let a = tree.create(Spacer, Layout::fixed(1, 1));
        let b = tree.create(Spacer, Layout::fixed(1, 1));

        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.iter_dfs(root).collect::<Vec<_>>(), vec![root, a, b]);
    }

    #[test]
    fn test_reparent_detaches_from_old_owner() {
        let mut tree = WidgetTree::new();
        let p1 = tree.create(Spacer, Layout::column(0));
        let p2 = tree.create(Spacer, Layout::column(0));
        let c = tree.create(Spacer, Layout::fixed(1, 1));

        tree.add_child(p1, c).unwrap();
        tree.add_child(p2, c).unwrap();

        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.children(p2), &[c]);
        assert_eq!(tree.parent(c), Some(p2));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut tree = WidgetTree::new();
        let p = tree.create(Spacer, Layout::column(0));
        let c = tree.create(Spacer, Layout::fixed(1, 1));

        tree.add_child(p, c).unwrap();
        tree.add_child(p, c).unwrap();

        assert_eq!(tree.children(p), &[c]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = WidgetTree::new();
        let a = tree.create(Spacer, Layout::column(0));
        let b = tree.create(Spacer, Layout::column(0));
        tree.add_child(a, b).unwrap();

        assert_eq!(tree.add_child(b, a), Err(UiError::WouldCycle { parent: b, child: a }));
        assert_eq!(tree.add_child(a, a), Err(UiError::WouldCycle { parent: a, child: a }));
    }

    #[test]
    fn test_remove_non_child_is_error() {
        let mut tree = WidgetTree::new();
        let p = tree.create(Spacer, Layout::column(0));
        let other = tree.create(Spacer, Layout::column(0));
        let c = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(p, c).unwrap();

        assert_eq!(
            tree.remove_child(other, c),
            Err(UiError::NotAChild { parent: other, child: c })
        );
        assert_eq!(tree.children(p), &[c]);

        tree.remove_child(p, c).unwrap();
        assert_eq!(tree.parent(c), None);
        assert!(tree.contains(c));
    }

    #[test]
    fn test_destroy_drops_subtree() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let mid = tree.create(Spacer, Layout::column(0));
        let leaf = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();

        tree.destroy(mid).unwrap();

        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_run_layout_column_example() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(2));
        let kids: Vec<_> = [10, 20, 15]
            .iter()
            .map(|&h| tree.create(Spacer, Layout::fixed(8, h)))
            .collect();
        for &k in &kids {
            tree.add_child(root, k).unwrap();
        }

        tree.run_layout(root).unwrap();

        assert_eq!(tree.geometry(root).unwrap().height, 49);
        let ys: Vec<_> = kids.iter().map(|&k| tree.geometry(k).unwrap().y).collect();
        assert_eq!(ys, vec![0, 12, 34]);
    }

    #[test]
    fn test_damage_propagates_to_root() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let mid = tree.create(Spacer, Layout::column(0));
        let leaf = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        clean(&mut tree, root);

        tree.damage(leaf).unwrap();

        assert!(tree.flags(leaf).unwrap().has(WidgetFlags::DAMAGED));
        assert!(tree.flags(mid).unwrap().has(WidgetFlags::STATIC_CHILD_DAMAGED));
        assert!(tree.flags(root).unwrap().has(WidgetFlags::STATIC_CHILD_DAMAGED));
        assert!(!tree.flags(root).unwrap().has(WidgetFlags::DYNAMIC_CHILD_DAMAGED));
        assert!(!tree.flags(mid).unwrap().has(WidgetFlags::DAMAGED));
    }

    #[test]
    fn test_dynamic_damage_uses_dynamic_flag() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let leaf = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(root, leaf).unwrap();
        clean(&mut tree, root);
        tree.node_mut(leaf).unwrap().flags.set(WidgetFlags::DYNAMIC);

        tree.damage(leaf).unwrap();

        let flags = tree.flags(root).unwrap();
        assert!(flags.has(WidgetFlags::DYNAMIC_CHILD_DAMAGED));
        assert!(!flags.has(WidgetFlags::STATIC_CHILD_DAMAGED));
    }

    #[test]
    fn test_set_hidden_damages_both_passes() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let leaf = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(root, leaf).unwrap();
        clean(&mut tree, root);

        tree.set_hidden(leaf, true).unwrap();

        let flags = tree.flags(root).unwrap();
        assert!(flags.has(WidgetFlags::STATIC_CHILD_DAMAGED));
        assert!(flags.has(WidgetFlags::DYNAMIC_CHILD_DAMAGED));
        assert!(tree.is_hidden(leaf));
    }

    #[test]
    fn test_dispatch_returns_last_result() {
        let mut tree = WidgetTree::new();
        let w = tree.create(Spacer, Layout::fixed(1, 1));
        let calls = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&calls);
        tree.add_listener(w, EventName::MouseDown, move |_, _| {
            log.borrow_mut().push(1);
            true
        })
        .unwrap();
        let log = Rc::clone(&calls);
        let second = tree
            .add_listener(w, EventName::MouseDown, move |_, _| {
                log.borrow_mut().push(2);
                false
            })
            .unwrap();

        assert!(tree.has_listener(w, &EventName::MouseDown));
        assert_eq!(tree.dispatch(w, &EventName::MouseDown, &Event::Signal), Some(false));
        assert_eq!(*calls.borrow(), vec![1, 2]);

        assert!(tree.remove_listener(w, &EventName::MouseDown, second));
        assert_eq!(tree.dispatch(w, &EventName::MouseDown, &Event::Signal), Some(true));
        assert_eq!(tree.dispatch(w, &EventName::MouseUp, &Event::Signal), None);
    }

    #[test]
    fn test_listener_can_mutate_tree() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let w = tree.create(Spacer, Layout::fixed(1, 1));
        tree.add_child(root, w).unwrap();
        clean(&mut tree, root);

        tree.add_listener(w, EventName::MouseOver, |cx, _| {
            cx.tree.damage(cx.target).is_ok()
        })
        .unwrap();

        assert_eq!(tree.dispatch(w, &EventName::MouseOver, &Event::Signal), Some(true));
        assert!(tree.flags(root).unwrap().has(WidgetFlags::STATIC_CHILD_DAMAGED));
        assert!(tree.has_listener(w, &EventName::MouseOver));
    }

    #[test]
    fn test_absolute_position() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::padded(3));
        let child = tree.create(Spacer, Layout::fixed(4, 4));
        tree.add_child(root, child).unwrap();
        tree.set_position(root, 10, 20).unwrap();
        tree.run_layout(root).unwrap();

        assert_eq!(tree.absolute_position(child), Some((13, 23)));
    }
}
