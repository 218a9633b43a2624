//! Drag-and-drop between widgets.
//!
//! A session moves through `Started -> Active` and ends either dropped on a
//! widget that accepted it or cancelled back to its source. Widgets take part
//! through listeners:
//!
//! - `dragstart` / `dragend` on the root bracket every session,
//! - `dropcheck` asks a drop zone whether it accepts the payload,
//! - `drop` hands the payload to the accepting zone,
//! - `dragcancel` returns the payload to the source.

use crate::widget::{Event, EventName, WidgetId, WidgetTree};
use std::any::Any;
use std::fmt;

/// What is being dragged.
pub struct DragPayload {
    tag: String,
    data: Box<dyn Any>,
    ghost: Option<WidgetId>,
}

impl DragPayload {
    /// Creates a payload of type `tag` carrying `data`.
    pub fn new(tag: impl Into<String>, data: impl Any) -> Self {
        Self {
            tag: tag.into(),
            data: Box::new(data),
            ghost: None,
        }
    }

    /// Attaches a detached widget the host may draw under the cursor.
    ///
    /// The session owns the ghost and destroys it when it ends.
    #[must_use]
    pub fn with_ghost(mut self, ghost: WidgetId) -> Self {
        self.ghost = Some(ghost);
        self
    }

    /// Payload type tag, e.g. `inv_items`.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns true if the payload has type tag `tag`.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Borrows the data as `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Ghost visual, if any.
    #[must_use]
    pub fn ghost(&self) -> Option<WidgetId> {
        self.ghost
    }
}

impl fmt::Debug for DragPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragPayload")
            .field("tag", &self.tag)
            .field("ghost", &self.ghost)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of the drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No session.
    #[default]
    Idle,
    /// Session created; the gesture that started it is still in progress.
    Started,
    /// The next pointer-up resolves the session.
    Active,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// A drop zone accepted the payload.
    Dropped {
        /// The accepting widget.
        target: WidgetId,
    },
    /// The payload went back to its source.
    Cancelled,
}

/// Cursor feedback while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// No drag in progress.
    #[default]
    Default,
    /// The widget under the cursor accepts the payload.
    Droppable,
    /// Releasing here would cancel.
    NotAllowed,
}

struct DragSession {
    source: WidgetId,
    payload: DragPayload,
    state: DragState,
}

/// Owns the (at most one) drag session.
#[derive(Default)]
pub struct DragController {
    session: Option<DragSession>,
    cursor: CursorState,
}

impl DragController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.session.as_ref().map_or(DragState::Idle, |s| s.state)
    }

    /// Returns true while a session exists.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Payload of the current session.
    #[must_use]
    pub fn payload(&self) -> Option<&DragPayload> {
        self.session.as_ref().map(|s| &s.payload)
    }

    /// Widget the current payload came from.
    #[must_use]
    pub fn source(&self) -> Option<WidgetId> {
        self.session.as_ref().map(|s| s.source)
    }

    /// Cursor feedback computed by the last [`update_cursor`](Self::update_cursor).
    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Starts a session and announces it to `root` with `dragstart`.
    ///
    /// If a session already exists the request is dropped. Either way the
    /// request counts as handled, so the return value is always true.
    pub fn begin(&mut self, tree: &mut WidgetTree, root: WidgetId, source: WidgetId, payload: DragPayload) -> bool {
        if self.session.is_some() {
            tracing::debug!("drag of {:?} from {:?} ignored: a drag is in progress", payload.tag(), source);
            drop_ghost(tree, &payload);
            return true;
        }

        tracing::debug!("drag started: {:?} from {:?}", payload.tag(), source);
        let session = self.session.insert(DragSession {
            source,
            payload,
            state: DragState::Started,
        });
        tree.dispatch(root, &EventName::DragStart, &Event::Drag(&session.payload));
        true
    }

    /// Moves a started session to `Active`. Returns true on that transition.
    pub fn activate(&mut self) -> bool {
        match &mut self.session {
            Some(session) if session.state == DragState::Started => {
                session.state = DragState::Active;
                true
            }
            _ => false,
        }
    }

    /// Recomputes cursor feedback for the hover chain `stack` (root first).
    pub fn update_cursor(&mut self, tree: &mut WidgetTree, stack: &[WidgetId]) -> CursorState {
        self.cursor = match &self.session {
            None => CursorState::Default,
            Some(session) => match find_drop_zone(tree, stack) {
                Some(zone) => {
                    let accepted = tree
                        .dispatch(zone, &EventName::DropCheck, &Event::Drag(&session.payload))
                        .unwrap_or(false);
                    if accepted {
                        CursorState::Droppable
                    } else {
                        CursorState::NotAllowed
                    }
                }
                None => CursorState::NotAllowed,
            },
        };
        self.cursor
    }

    /// Resolves an active session at the hover chain `stack`.
    ///
    /// The deepest widget with a `dropcheck` listener decides: if it also
    /// listens for `drop` and accepts the payload it receives `drop`,
    /// otherwise the session is cancelled. Returns `None` without a session.
    pub fn finish(&mut self, tree: &mut WidgetTree, root: WidgetId, stack: &[WidgetId]) -> Option<DragOutcome> {
        let session = self.session.take()?;
        let event = Event::Drag(&session.payload);

        let target = find_drop_zone(tree, stack).filter(|&zone| {
            tree.has_listener(zone, &EventName::Drop)
                && tree.dispatch(zone, &EventName::DropCheck, &event) == Some(true)
        });

        let outcome = if let Some(target) = target {
            tree.dispatch(target, &EventName::Drop, &event);
            DragOutcome::Dropped { target }
        } else {
            tree.dispatch(session.source, &EventName::DragCancel, &event);
            DragOutcome::Cancelled
        };

        self.end(tree, root, &session.payload, outcome);
        Some(outcome)
    }

    /// Cancels the session, returning the payload to its source.
    pub fn cancel(&mut self, tree: &mut WidgetTree, root: WidgetId) -> Option<DragOutcome> {
        let session = self.session.take()?;
        tree.dispatch(session.source, &EventName::DragCancel, &Event::Drag(&session.payload));
        self.end(tree, root, &session.payload, DragOutcome::Cancelled);
        Some(DragOutcome::Cancelled)
    }

    fn end(&mut self, tree: &mut WidgetTree, root: WidgetId, payload: &DragPayload, outcome: DragOutcome) {
        let dropped = matches!(outcome, DragOutcome::Dropped { .. });
        tree.dispatch(root, &EventName::DragEnd, &Event::DragEnd { dropped });
        drop_ghost(tree, payload);
        self.cursor = CursorState::Default;
        tracing::debug!("drag ended: {:?}", outcome);
    }
}

fn drop_ghost(tree: &mut WidgetTree, payload: &DragPayload) {
    if let Some(ghost) = payload.ghost() {
        if let Err(e) = tree.destroy(ghost) {
            tracing::warn!("drag ghost already gone: {}", e);
        }
    }
}

fn find_drop_zone(tree: &WidgetTree, stack: &[WidgetId]) -> Option<WidgetId> {
    stack
        .iter()
        .rev()
        .copied()
        .find(|&id| tree.has_listener(id, &EventName::DropCheck))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::widget::Spacer;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(tree: &mut WidgetTree, id: WidgetId, name: EventName, log: &Log, result: bool) {
        let log = Rc::clone(log);
        let label = format!("{name:?}");
        tree.add_listener(id, name, move |cx, _| {
            log.borrow_mut().push(format!("{label}@{}", cx.target.raw()));
            result
        })
        .unwrap();
    }

    fn setup(accept: bool) -> (WidgetTree, WidgetId, WidgetId, WidgetId, Log) {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let source = tree.create(Spacer, Layout::fixed(4, 4));
        let zone = tree.create(Spacer, Layout::fixed(4, 4));
        tree.add_child(root, source).unwrap();
        tree.add_child(root, zone).unwrap();

        let log = Log::default();
        record(&mut tree, root, EventName::DragStart, &log, true);
        record(&mut tree, root, EventName::DragEnd, &log, true);
        record(&mut tree, source, EventName::DragCancel, &log, true);
        record(&mut tree, zone, EventName::DropCheck, &log, accept);
        record(&mut tree, zone, EventName::Drop, &log, true);
        (tree, root, source, zone, log)
    }

    #[test]
    fn test_drop_round_trip() {
        let (mut tree, root, source, zone, log) = setup(true);
        let mut drag = DragController::new();

        assert!(drag.begin(&mut tree, root, source, DragPayload::new("inv_items", 5u32)));
        assert_eq!(drag.state(), DragState::Started);
        assert!(drag.activate());
        assert_eq!(drag.state(), DragState::Active);

        let outcome = drag.finish(&mut tree, root, &[root, zone]);

        assert_eq!(outcome, Some(DragOutcome::Dropped { target: zone }));
        assert_eq!(drag.state(), DragState::Idle);
        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| e.starts_with("Drop@")).count(), 1);
        assert!(!log.iter().any(|e| e.starts_with("DragCancel")));
        assert!(log.first().unwrap().starts_with("DragStart"));
        assert!(log.last().unwrap().starts_with("DragEnd"));
    }

    #[test]
    fn test_rejected_drop_cancels() {
        let (mut tree, root, source, zone, log) = setup(false);
        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()));
        drag.activate();

        assert_eq!(drag.update_cursor(&mut tree, &[root, zone]), CursorState::NotAllowed);
        let outcome = drag.finish(&mut tree, root, &[root, zone]);

        assert_eq!(outcome, Some(DragOutcome::Cancelled));
        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| e.starts_with("DragCancel")).count(), 1);
        assert!(!log.iter().any(|e| e.starts_with("Drop@")));
    }

    #[test]
    fn test_no_drop_zone_cancels() {
        let (mut tree, root, source, _zone, log) = setup(true);
        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()));
        drag.activate();

        assert_eq!(drag.finish(&mut tree, root, &[root]), Some(DragOutcome::Cancelled));
        assert_eq!(drag.cursor(), CursorState::Default);
        assert_eq!(log.borrow().iter().filter(|e| e.starts_with("DragCancel")).count(), 1);
    }

    #[test]
    fn test_dropcheck_without_drop_cancels() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let source = tree.create(Spacer, Layout::fixed(4, 4));
        let zone = tree.create(Spacer, Layout::fixed(4, 4));
        tree.add_child(root, source).unwrap();
        tree.add_child(root, zone).unwrap();
        let log = Log::default();
        record(&mut tree, source, EventName::DragCancel, &log, true);
        record(&mut tree, zone, EventName::DropCheck, &log, true);

        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()));
        drag.activate();

        assert_eq!(drag.update_cursor(&mut tree, &[root, zone]), CursorState::Droppable);
        assert_eq!(drag.finish(&mut tree, root, &[root, zone]), Some(DragOutcome::Cancelled));
        assert_eq!(log.borrow().iter().filter(|e| e.starts_with("DragCancel")).count(), 1);
    }

    #[test]
    fn test_nearest_zone_blocks_outer_zone() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Spacer, Layout::column(0));
        let source = tree.create(Spacer, Layout::fixed(4, 4));
        let outer = tree.create(Spacer, Layout::padded(2));
        let inner = tree.create(Spacer, Layout::fixed(4, 4));
        tree.add_child(root, source).unwrap();
        tree.add_child(root, outer).unwrap();
        tree.add_child(outer, inner).unwrap();

        let log = Log::default();
        record(&mut tree, source, EventName::DragCancel, &log, true);
        record(&mut tree, outer, EventName::DropCheck, &log, true);
        record(&mut tree, outer, EventName::Drop, &log, true);
        record(&mut tree, inner, EventName::DropCheck, &log, false);
        record(&mut tree, inner, EventName::Drop, &log, true);

        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()));
        drag.activate();
        let stack = [root, outer, inner];

        assert_eq!(drag.update_cursor(&mut tree, &stack), CursorState::NotAllowed);
        assert_eq!(drag.finish(&mut tree, root, &stack), Some(DragOutcome::Cancelled));
        let log = log.borrow();
        assert!(!log.iter().any(|e| e.starts_with("Drop@")));
        assert!(!log.contains(&format!("DropCheck@{}", outer.raw())));
        assert_eq!(log.iter().filter(|e| e.starts_with("DragCancel")).count(), 1);
    }

    #[test]
    fn test_second_begin_is_swallowed() {
        let (mut tree, root, source, zone, _log) = setup(true);
        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("a", ()));

        assert!(drag.begin(&mut tree, root, zone, DragPayload::new("b", ())));
        assert_eq!(drag.payload().map(DragPayload::tag), Some("a"));
        assert_eq!(drag.source(), Some(source));
    }

    #[test]
    fn test_cancel() {
        let (mut tree, root, source, _zone, log) = setup(true);
        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()));

        assert_eq!(drag.cancel(&mut tree, root), Some(DragOutcome::Cancelled));
        assert_eq!(drag.cancel(&mut tree, root), None);
        assert_eq!(log.borrow().iter().filter(|e| e.starts_with("DragCancel")).count(), 1);
    }

    #[test]
    fn test_ghost_lives_as_long_as_the_session() {
        let (mut tree, root, source, zone, _log) = setup(true);
        let ghost = tree.create(Spacer, Layout::fixed(16, 16));
        let mut drag = DragController::new();
        drag.begin(&mut tree, root, source, DragPayload::new("inv_items", ()).with_ghost(ghost));
        assert_eq!(drag.payload().and_then(DragPayload::ghost), Some(ghost));

        // A refused second drag takes its ghost with it.
        let refused = tree.create(Spacer, Layout::fixed(16, 16));
        drag.begin(&mut tree, root, zone, DragPayload::new("b", ()).with_ghost(refused));
        assert!(!tree.contains(refused));
        assert!(tree.contains(ghost));

        drag.activate();
        drag.finish(&mut tree, root, &[root, zone]);
        assert!(!tree.contains(ghost));
    }

    #[test]
    fn test_payload_data() {
        let payload = DragPayload::new("inv_items", 42u32);
        assert!(payload.is("inv_items"));
        assert_eq!(payload.data::<u32>(), Some(&42));
        assert!(payload.data::<i64>().is_none());
        assert!(payload.ghost().is_none());
    }
}
