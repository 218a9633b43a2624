//! Named event listeners attached to widgets.
//!
//! A widget declares which events it handles by registering listeners under
//! an [`EventName`]. The input router asks `has_listener` to find the one
//! widget that should receive an event, then dispatches to it.

use super::{WidgetId, WidgetTree};
use crate::drag::DragPayload;
use crate::error::UiResult;
use crate::input::{KeyEvent, PointerEvent};
use crate::items::ItemId;

/// Names under which listeners are registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Cursor entered the widget.
    MouseOver,
    /// Cursor left the widget.
    MouseOut,
    /// Button pressed over the widget.
    MouseDown,
    /// Button released over the widget.
    MouseUp,
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// A drag session began (sent to the root).
    DragStart,
    /// A drag session finished, dropped or cancelled (sent to the root).
    DragEnd,
    /// Asks a drop zone whether it accepts the current payload.
    DropCheck,
    /// Delivers the payload to the accepting drop zone.
    Drop,
    /// The payload came back to its source.
    DragCancel,
    /// Widget-defined signal, e.g. `cancel` or `set_hotbar`.
    Custom(String),
}

impl EventName {
    /// Builds a widget-defined event name.
    #[must_use]
    pub fn custom(name: &str) -> Self {
        Self::Custom(name.to_owned())
    }
}

/// Payload handed to listeners.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Pointer events.
    Pointer(&'a PointerEvent),
    /// Keyboard events.
    Key(&'a KeyEvent),
    /// Drag lifecycle events carrying the payload.
    Drag(&'a DragPayload),
    /// End of a drag session.
    DragEnd {
        /// True if a drop zone took the payload.
        dropped: bool,
    },
    /// Request to put an item into a hotbar slot.
    SetHotbar {
        /// Zero-based hotbar slot.
        index: usize,
        /// Item to assign, if any.
        item: Option<ItemId>,
    },
    /// Signal without data.
    Signal,
}

/// Identifies one registered listener for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub(crate) u64);

/// Listener callback. The return value reports whether the event was handled.
pub type Listener = Box<dyn FnMut(&mut EventCx<'_>, &Event<'_>) -> bool>;

/// Work a listener asks the surrounding input router to perform.
#[derive(Debug)]
pub enum UiRequest {
    /// Begin a drag session sourced at `source`.
    StartDrag {
        /// Widget the payload was lifted from.
        source: WidgetId,
        /// What is being dragged.
        payload: DragPayload,
    },
}

/// Converts a fallible listener body into its handled flag, logging errors.
pub(crate) fn handled(result: UiResult<bool>) -> bool {
    result.unwrap_or_else(|e| {
        tracing::warn!("listener failed: {}", e);
        false
    })
}

/// Context passed to a running listener.
pub struct EventCx<'a> {
    /// The whole tree, for reading and mutating any widget.
    pub tree: &'a mut WidgetTree,
    /// Widget the event was dispatched to.
    pub target: WidgetId,
}

impl EventCx<'_> {
    /// Asks the router to start dragging `payload` from the target widget.
    ///
    /// The router ignores the request if a drag is already in progress.
    pub fn start_drag(&mut self, payload: DragPayload) {
        let source = self.target;
        self.tree.push_request(UiRequest::StartDrag { source, payload });
    }

    /// Dispatches a further event to the target widget's own listeners.
    pub fn emit(&mut self, name: &EventName, event: &Event<'_>) -> Option<bool> {
        self.tree.dispatch(self.target, name, event)
    }
}
