//! Input routing for UI.
//!
//! The router keeps the *mouse stack*: the root-to-leaf chain of widgets under
//! the cursor, each with its absolute position. Hover changes fire
//! `mouseover` / `mouseout`; button and key events go to exactly one widget,
//! the deepest one on the stack that listens for them. Drag sessions are
//! driven from here as well.

use crate::config::UiConfig;
use crate::drag::{CursorState, DragController, DragOutcome, DragPayload, DragState};
use crate::error::{UiError, UiResult};
use crate::widget::{Event, EventName, UiRequest, WidgetId, WidgetTree};
use std::collections::{BTreeMap, HashMap};

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button.
    #[default]
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

impl Modifiers {
    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        super_key: false,
    };

    /// Returns true if a chord modifier (ctrl, alt, super) is held.
    #[must_use]
    pub const fn is_chord(&self) -> bool {
        self.ctrl || self.alt || self.super_key
    }
}

/// Pointer event in UI pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerEvent {
    /// Cursor X.
    pub x: i32,
    /// Cursor Y.
    pub y: i32,
    /// Button involved, for press and release.
    pub button: MouseButton,
    /// Modifier keys.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Left-button event at `(x, y)` without modifiers.
    #[must_use]
    pub const fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            button: MouseButton::Left,
            modifiers: Modifiers {
                shift: false,
                ctrl: false,
                alt: false,
                super_key: false,
            },
        }
    }
}

/// Key event with its bound action names resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// Raw key code.
    pub code: u32,
    /// Modifier keys.
    pub modifiers: Modifiers,
    game_action: Option<String>,
    ui_action: Option<String>,
}

impl KeyEvent {
    /// In-game action bound to this key. `None` for ctrl/alt/super chords,
    /// which belong to the host.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        if self.modifiers.is_chord() {
            return None;
        }
        self.game_action.as_deref()
    }

    /// Dialog action bound to this key, with the same chord rule.
    #[must_use]
    pub fn ui_key_name(&self) -> Option<&str> {
        if self.modifiers.is_chord() {
            return None;
        }
        self.ui_action.as_deref()
    }
}

/// Key code to action name tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindings {
    game: HashMap<u32, String>,
    ui: HashMap<u32, String>,
}

fn parse_bindings(table: &BTreeMap<String, String>) -> UiResult<HashMap<u32, String>> {
    table
        .iter()
        .map(|(code, action)| {
            code.parse::<u32>()
                .map(|c| (c, action.clone()))
                .map_err(|_| UiError::InvalidConfig(format!("key binding code {code:?} is not a number")))
        })
        .collect()
}

impl KeyBindings {
    /// Builds the tables from the config document.
    pub fn from_config(config: &UiConfig) -> UiResult<Self> {
        Ok(Self {
            game: parse_bindings(&config.keybindings)?,
            ui: parse_bindings(&config.ui_keybindings)?,
        })
    }

    /// Binds `code` to an in-game action.
    pub fn bind_game(&mut self, code: u32, action: impl Into<String>) {
        self.game.insert(code, action.into());
    }

    /// Binds `code` to a dialog action.
    pub fn bind_ui(&mut self, code: u32, action: impl Into<String>) {
        self.ui.insert(code, action.into());
    }

    /// Wraps a raw key press.
    #[must_use]
    pub fn event(&self, code: u32, modifiers: Modifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            game_action: self.game.get(&code).cloned(),
            ui_action: self.ui.get(&code).cloned(),
        }
    }
}

/// One hovered widget and its absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseStackEntry {
    /// Hovered widget.
    pub widget: WidgetId,
    /// Absolute X of the widget's origin.
    pub abs_x: i32,
    /// Absolute Y of the widget's origin.
    pub abs_y: i32,
}

/// Routes raw input into the widget tree under one root.
pub struct InputRouter {
    root: WidgetId,
    mouse_stack: Vec<MouseStackEntry>,
    /// Cursor position the stack was last built for.
    cursor_pos: Option<(i32, i32)>,
    drag: DragController,
}

impl InputRouter {
    /// Action name that cancels a drag.
    pub const CANCEL_ACTION: &'static str = "cancel";

    /// Creates a router for the tree under `root`.
    #[must_use]
    pub fn new(root: WidgetId) -> Self {
        Self {
            root,
            mouse_stack: Vec::with_capacity(16),
            cursor_pos: None,
            drag: DragController::new(),
        }
    }

    /// Root widget.
    #[must_use]
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Hover chain, root first.
    #[must_use]
    pub fn mouse_stack(&self) -> &[MouseStackEntry] {
        &self.mouse_stack
    }

    /// Deepest hovered widget.
    #[must_use]
    pub fn hovered(&self) -> Option<WidgetId> {
        self.mouse_stack.last().map(|e| e.widget)
    }

    /// Drag state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    /// Payload of the current drag, if any.
    #[must_use]
    pub fn drag_payload(&self) -> Option<&DragPayload> {
        self.drag.payload()
    }

    /// Cursor feedback for the host to display.
    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.drag.cursor()
    }

    fn stack_ids(&self) -> Vec<WidgetId> {
        self.mouse_stack.iter().map(|e| e.widget).collect()
    }

    /// Cursor entered the window.
    pub fn handle_mouse_over(&mut self, tree: &mut WidgetTree, evt: &PointerEvent) -> bool {
        self.update_mouse_stack(tree, evt.x, evt.y, evt);
        self.refresh_cursor(tree);
        true
    }

    /// Cursor left the window: every hovered widget is exited.
    pub fn handle_mouse_out(&mut self, tree: &mut WidgetTree, evt: &PointerEvent) -> bool {
        self.update_mouse_stack(tree, -1, -1, evt);
        self.refresh_cursor(tree);
        true
    }

    /// Cursor moved.
    pub fn handle_mouse_move(&mut self, tree: &mut WidgetTree, evt: &PointerEvent) -> bool {
        self.update_mouse_stack(tree, evt.x, evt.y, evt);
        self.drag.activate();
        self.refresh_cursor(tree);
        true
    }

    /// Button pressed. Swallowed while a drag is in progress.
    pub fn handle_mouse_down(&mut self, tree: &mut WidgetTree, evt: &PointerEvent) -> bool {
        if self.drag.is_dragging() {
            return true;
        }
        self.update_mouse_stack(tree, evt.x, evt.y, evt);
        let handled = self.dispatch_deepest(tree, &EventName::MouseDown, &Event::Pointer(evt));
        self.process_requests(tree);
        handled
    }

    /// Button released. Resolves an active drag instead of reaching widgets.
    pub fn handle_mouse_up(&mut self, tree: &mut WidgetTree, evt: &PointerEvent) -> bool {
        self.update_mouse_stack(tree, evt.x, evt.y, evt);
        match self.drag.state() {
            DragState::Started => {
                self.drag.activate();
                return true;
            }
            DragState::Active => {
                let stack = self.stack_ids();
                self.drag.finish(tree, self.root, &stack);
                return true;
            }
            DragState::Idle => {}
        }
        let handled = self.dispatch_deepest(tree, &EventName::MouseUp, &Event::Pointer(evt));
        self.process_requests(tree);
        handled
    }

    /// Key pressed. The cancel action aborts a drag.
    pub fn handle_key_down(&mut self, tree: &mut WidgetTree, evt: &KeyEvent) -> bool {
        if self.drag.is_dragging() && evt.ui_key_name() == Some(Self::CANCEL_ACTION) {
            self.drag.cancel(tree, self.root);
            return true;
        }
        self.refresh_stack(tree);
        let handled = self.dispatch_key(tree, &EventName::KeyDown, evt);
        self.process_requests(tree);
        handled
    }

    /// Key released.
    pub fn handle_key_up(&mut self, tree: &mut WidgetTree, evt: &KeyEvent) -> bool {
        self.refresh_stack(tree);
        let handled = self.dispatch_key(tree, &EventName::KeyUp, evt);
        self.process_requests(tree);
        handled
    }

    /// Starts a drag from `source`. Ignored (but reported handled) while
    /// another drag is in progress.
    pub fn start_drag(&mut self, tree: &mut WidgetTree, source: WidgetId, payload: DragPayload) -> bool {
        let handled = self.drag.begin(tree, self.root, source, payload);
        self.refresh_cursor(tree);
        handled
    }

    /// Cancels the current drag, if any.
    pub fn cancel_drag(&mut self, tree: &mut WidgetTree) -> Option<DragOutcome> {
        self.drag.cancel(tree, self.root)
    }

    /// Re-checks the stack at the last cursor position, so widgets hidden,
    /// moved or detached since then stop receiving events.
    fn refresh_stack(&mut self, tree: &mut WidgetTree) {
        if let Some((x, y)) = self.cursor_pos {
            self.update_mouse_stack(tree, x, y, &PointerEvent::at(x, y));
        }
    }

    fn refresh_cursor(&mut self, tree: &mut WidgetTree) {
        if self.drag.is_dragging() {
            let stack = self.stack_ids();
            self.drag.update_cursor(tree, &stack);
        }
    }

    fn process_requests(&mut self, tree: &mut WidgetTree) {
        for request in tree.take_requests() {
            match request {
                UiRequest::StartDrag { source, payload } => {
                    self.start_drag(tree, source, payload);
                }
            }
        }
    }

    fn dispatch_deepest(&self, tree: &mut WidgetTree, name: &EventName, event: &Event<'_>) -> bool {
        let target = self
            .mouse_stack
            .iter()
            .rev()
            .map(|e| e.widget)
            .find(|&id| tree.has_listener(id, name));
        target.is_some_and(|id| tree.dispatch(id, name, event).unwrap_or(false))
    }

    fn dispatch_key(&self, tree: &mut WidgetTree, name: &EventName, evt: &KeyEvent) -> bool {
        let event = Event::Key(evt);
        if self.dispatch_deepest(tree, name, &event) {
            return true;
        }
        // With nothing hovered, keys still reach the root.
        if self.mouse_stack.is_empty() {
            return tree.dispatch(self.root, name, &event).unwrap_or(false);
        }
        false
    }

    /// Brings the hover chain in line with a cursor at `(x, y)`.
    ///
    /// Entries that vanished, were re-parented, became hidden or no longer
    /// contain the cursor are popped (with everything above them) and get
    /// `mouseout`. Then the chain is extended downward through the first
    /// child under the cursor at each level, firing `mouseover`.
    pub fn update_mouse_stack(&mut self, tree: &mut WidgetTree, x: i32, y: i32, evt: &PointerEvent) {
        self.cursor_pos = Some((x, y));
        let valid = self.revalidate(tree, x, y);
        while self.mouse_stack.len() > valid {
            let Some(entry) = self.mouse_stack.pop() else {
                break;
            };
            tracing::trace!("exit {}", tree.widget_name(entry.widget));
            tree.dispatch(entry.widget, &EventName::MouseOut, &Event::Pointer(evt));
        }

        if self.mouse_stack.is_empty() {
            let root = self.root;
            let Some(g) = tree.geometry(root) else {
                return;
            };
            if tree.is_hidden(root) || !g.hit_local(x - g.x, y - g.y) {
                return;
            }
            self.enter(tree, root, g.x, g.y, evt);
        }

        while let Some(&top) = self.mouse_stack.last() {
            let next = tree.children(top.widget).iter().copied().find_map(|child| {
                let g = tree.geometry(child)?;
                let (ax, ay) = (top.abs_x + g.x, top.abs_y + g.y);
                (!tree.is_hidden(child) && g.hit_local(x - ax, y - ay)).then_some((child, ax, ay))
            });
            let Some((child, ax, ay)) = next else {
                break;
            };
            self.enter(tree, child, ax, ay, evt);
        }
    }

    fn enter(&mut self, tree: &mut WidgetTree, widget: WidgetId, abs_x: i32, abs_y: i32, evt: &PointerEvent) {
        tracing::trace!("enter {}", tree.widget_name(widget));
        // Pushed first so a listener reading the stack sees the new entry.
        self.mouse_stack.push(MouseStackEntry { widget, abs_x, abs_y });
        tree.dispatch(widget, &EventName::MouseOver, &Event::Pointer(evt));
    }

    /// Refreshes absolute positions and returns how many leading entries
    /// still form a visible root-to-leaf path containing `(x, y)`.
    fn revalidate(&mut self, tree: &WidgetTree, x: i32, y: i32) -> usize {
        let mut parent: Option<MouseStackEntry> = None;
        for i in 0..self.mouse_stack.len() {
            let id = self.mouse_stack[i].widget;
            let Some(g) = tree.geometry(id) else {
                return i;
            };
            let linked = match parent {
                None => id == self.root,
                Some(p) => tree.parent(id) == Some(p.widget),
            };
            if !linked || tree.is_hidden(id) {
                return i;
            }

            let (ax, ay) = parent.map_or((g.x, g.y), |p| (p.abs_x + g.x, p.abs_y + g.y));
            if !g.hit_local(x - ax, y - ay) {
                return i;
            }
            let entry = &mut self.mouse_stack[i];
            entry.abs_x = ax;
            entry.abs_y = ay;
            parent = Some(*entry);
        }
        self.mouse_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Layout, Rect};
    use crate::widget::Spacer;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        tree: WidgetTree,
        root: WidgetId,
        panel: WidgetId,
        button: WidgetId,
        log: Rc<RefCell<Vec<(String, WidgetId)>>>,
    }

    struct Anchored(Vec<(i32, i32)>);

    impl crate::layout::LayoutStrategy for Anchored {
        fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32) {
            for (child, &(x, y)) in children.iter_mut().zip(&self.0) {
                child.x = x;
                child.y = y;
            }
            (200, 100)
        }
    }

    /// root 200x100; panel 40x40 at (10,10) with 6px padding; button 20x20
    /// inside it at absolute (16,16).
    fn fixture() -> Fixture {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::custom(Anchored(vec![(10, 10)])));
        let panel = tree.create(Spacer, Layout::Padded(crate::layout::Insets::new(6, 14, 14, 6)));
        let button = tree.create(Spacer, Layout::fixed(20, 20));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, button).unwrap();
        tree.run_layout(root).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for id in [root, panel, button] {
            for name in [EventName::MouseOver, EventName::MouseOut] {
                let log = Rc::clone(&log);
                let label = format!("{name:?}");
                tree.add_listener(id, name, move |cx, _| {
                    log.borrow_mut().push((label.clone(), cx.target));
                    true
                })
                .unwrap();
            }
        }
        Fixture { tree, root, panel, button, log }
    }

    fn ids(router: &InputRouter) -> Vec<WidgetId> {
        router.mouse_stack().iter().map(|e| e.widget).collect()
    }

    #[test]
    fn test_descend_into_hovered_chain() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);

        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));

        assert_eq!(ids(&router), vec![f.root, f.panel, f.button]);
        let button = router.mouse_stack()[2];
        assert_eq!((button.abs_x, button.abs_y), (16, 16));
        let overs: Vec<_> = f.log.borrow().iter().map(|(_, id)| *id).collect();
        assert_eq!(overs, vec![f.root, f.panel, f.button]);
    }

    #[test]
    fn test_exit_pops_only_left_widgets() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));
        f.log.borrow_mut().clear();

        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(45, 45));

        assert_eq!(ids(&router), vec![f.root, f.panel]);
        assert_eq!(*f.log.borrow(), vec![("MouseOut".to_owned(), f.button)]);
    }

    #[test]
    fn test_right_edge_is_exclusive() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);

        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(36, 20));
        assert_eq!(ids(&router), vec![f.root, f.panel]);

        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(35, 20));
        assert_eq!(ids(&router), vec![f.root, f.panel, f.button]);
    }

    #[test]
    fn test_mouse_out_clears_stack() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));

        router.handle_mouse_out(&mut f.tree, &PointerEvent::at(20, 20));

        assert!(router.mouse_stack().is_empty());
        let outs: Vec<_> = f.log.borrow().iter().filter(|(n, _)| n == "MouseOut").map(|(_, id)| *id).collect();
        assert_eq!(outs, vec![f.button, f.panel, f.root]);
    }

    #[test]
    fn test_hidden_widget_is_not_hit() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));

        f.tree.set_hidden(f.panel, true).unwrap();
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(21, 21));

        assert_eq!(ids(&router), vec![f.root]);
    }

    #[test]
    fn test_stack_follows_moved_widget() {
        let mut f = fixture();
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));

        f.tree
            .set_layout(f.root, Layout::custom(Anchored(vec![(100, 50)])))
            .unwrap();
        f.tree.run_layout(f.root).unwrap();
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));
        assert_eq!(ids(&router), vec![f.root]);

        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(110, 60));
        assert_eq!(ids(&router), vec![f.root, f.panel, f.button]);
    }

    #[test]
    fn test_mousedown_goes_to_deepest_listener_only() {
        let mut f = fixture();
        let hits = Rc::new(RefCell::new(Vec::new()));
        for id in [f.root, f.panel] {
            let hits = Rc::clone(&hits);
            f.tree
                .add_listener(id, EventName::MouseDown, move |cx, _| {
                    hits.borrow_mut().push(cx.target);
                    true
                })
                .unwrap();
        }
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));

        assert!(router.handle_mouse_down(&mut f.tree, &PointerEvent::at(20, 20)));
        assert_eq!(*hits.borrow(), vec![f.panel]);
        assert!(!router.handle_mouse_up(&mut f.tree, &PointerEvent::at(20, 20)));
    }

    #[test]
    fn test_presses_skip_widgets_hidden_since_last_move() {
        let mut f = fixture();
        let hits = Rc::new(RefCell::new(Vec::new()));
        for id in [f.root, f.panel] {
            for name in [EventName::MouseDown, EventName::KeyDown] {
                let hits = Rc::clone(&hits);
                f.tree
                    .add_listener(id, name, move |cx, _| {
                        hits.borrow_mut().push(cx.target);
                        true
                    })
                    .unwrap();
            }
        }
        let mut router = InputRouter::new(f.root);
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));
        f.tree.set_hidden(f.panel, true).unwrap();

        let bindings = KeyBindings::default();
        assert!(router.handle_key_down(&mut f.tree, &bindings.event(65, Modifiers::default())));
        assert_eq!(ids(&router), vec![f.root]);
        assert!(router.handle_mouse_down(&mut f.tree, &PointerEvent::at(20, 20)));
        assert_eq!(*hits.borrow(), vec![f.root, f.root]);

        // Detached widgets drop out the same way.
        f.tree.set_hidden(f.panel, false).unwrap();
        router.handle_mouse_move(&mut f.tree, &PointerEvent::at(20, 20));
        assert_eq!(ids(&router), vec![f.root, f.panel, f.button]);
        f.tree.remove_child(f.root, f.panel).unwrap();
        hits.borrow_mut().clear();

        router.handle_key_down(&mut f.tree, &bindings.event(65, Modifiers::default()));
        assert_eq!(*hits.borrow(), vec![f.root]);
    }

    #[test]
    fn test_key_names_ignore_chords() {
        let config = UiConfig::default();
        let bindings = KeyBindings::from_config(&config).unwrap();

        let plain = bindings.event(27, Modifiers::default());
        assert_eq!(plain.ui_key_name(), Some("cancel"));
        assert_eq!(plain.key_name(), Some("cancel"));

        let shifted = bindings.event(37, Modifiers::SHIFT);
        assert_eq!(shifted.ui_key_name(), Some("move_left"));

        let chord = bindings.event(37, Modifiers { ctrl: true, ..Modifiers::default() });
        assert_eq!(chord.ui_key_name(), None);
        assert_eq!(chord.key_name(), None);

        assert_eq!(bindings.event(999, Modifiers::default()).key_name(), None);
    }

    #[test]
    fn test_keys_reach_root_when_nothing_hovered() {
        let mut f = fixture();
        f.tree
            .add_listener(f.root, EventName::KeyDown, |_, _| true)
            .unwrap();
        let mut router = InputRouter::new(f.root);
        let bindings = KeyBindings::default();

        assert!(router.handle_key_down(&mut f.tree, &bindings.event(65, Modifiers::default())));
        assert!(!router.handle_key_up(&mut f.tree, &bindings.event(65, Modifiers::default())));
    }
}
