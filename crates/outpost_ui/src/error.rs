//! # UI Error Types
//!
//! Structural misuse of the widget tree and configuration failures.
//! Missing art (atlas parts, item icons, fonts) is never an error: the draw
//! is skipped and a warning is logged.

use crate::widget::WidgetId;
use thiserror::Error;

/// Errors that can occur in the UI core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// No widget with this id exists in the tree.
    #[error("unknown widget: {0:?}")]
    UnknownWidget(WidgetId),

    /// Tried to detach a widget from something that does not own it.
    #[error("widget {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The widget the caller believed was the owner.
        parent: WidgetId,
        /// The widget being removed.
        child: WidgetId,
    },

    /// Attaching the child would make a widget its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Requested owner.
        parent: WidgetId,
        /// Requested child.
        child: WidgetId,
    },

    /// A widget was accessed as the wrong concrete type.
    #[error("widget {id:?} is not a {expected}")]
    WrongWidgetType {
        /// The widget accessed.
        id: WidgetId,
        /// The type the caller asked for.
        expected: &'static str,
    },

    /// An inventory snapshot does not match the grid it is attached to.
    #[error("inventory size mismatch: grid has {expected} slots, inventory has {actual}")]
    InventorySizeMismatch {
        /// Slot count of the grid.
        expected: usize,
        /// Slot count of the inventory.
        actual: usize,
    },

    /// A grid has fewer cells than the slots it was asked to hold.
    #[error("grid of {capacity} cells cannot hold {count} slots")]
    GridOverflow {
        /// Cells in the grid.
        capacity: usize,
        /// Slots requested.
        count: usize,
    },

    /// Invalid configuration document.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read config {path}: {reason}")]
    ConfigIo {
        /// Path that was opened.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
