//! # OUTPOST UI
//!
//! Retained-mode interface core for the game client:
//! - Widget tree with damage flags, so an idle frame costs nothing
//! - Pluggable layouts (fixed size, column, padded, custom)
//! - Static and dynamic vertex buffers per material
//! - Mouse-stack input routing and drag-and-drop
//! - A ring-buffer atlas of rasterized name labels
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        UI PIPELINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Raw Input → Mouse Stack → Listeners → Damage → Layout → VBs │
//! │      ↓            ↓            ↓          ↓        ↓      ↓  │
//! │  KeyBindings  Hit Testing  Drag/Drop  Flags   Rects  Upload  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate has no GPU dependency: buffers are plain `bytemuck` vertex
//! data, and the label atlas is handed to a [`TextureProvider`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod drag;
pub mod error;
pub mod font;
pub mod input;
pub mod items;
pub mod label_cache;
pub mod layout;
pub mod render;
pub mod widget;

pub use config::UiConfig;
pub use drag::{CursorState, DragOutcome, DragPayload, DragState};
pub use error::{UiError, UiResult};
pub use font::FontMetrics;
pub use input::{InputRouter, KeyBindings, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use items::{ItemDef, ItemDefs, ItemId};
pub use label_cache::{LabelCache, LabelSlot, RasterSurface, TextureProvider};
pub use layout::{Insets, Layout, LayoutStrategy, Rect};
pub use render::{BuildStats, Painter, RenderBuffers, UiRenderer, UiResources};
pub use widget::{Event, EventName, Widget, WidgetFlags, WidgetId, WidgetTree};
