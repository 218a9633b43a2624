//! Widget system for UI components.
//!
//! The generic machinery (tree, flags, listeners) comes first; the concrete
//! game widgets are built from it.

mod core;
mod listener;
mod tree;

pub mod dialog;
pub mod hotbar;
pub mod hud;
pub mod inventory;
pub mod item;

pub use self::core::{AsAny, Spacer, Widget, WidgetFlags, WidgetId};
pub use self::listener::{Event, EventCx, EventName, Listener, ListenerHandle, UiRequest};
pub(crate) use self::listener::handled;
pub use self::tree::WidgetTree;
