//! Core widget types and traits.

use crate::layout::Rect;
use crate::render::Painter;
use std::any::Any;

/// Unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

impl WidgetId {
    /// Creates a new widget ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Widget state flags (bitfield).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetFlags(u32);

impl WidgetFlags {
    /// Own content changed since the last buffer build.
    pub const DAMAGED: u32 = 1 << 0;
    /// Some static widget in this subtree (self included) is damaged.
    pub const STATIC_CHILD_DAMAGED: u32 = 1 << 1;
    /// Some dynamic widget in this subtree (self included) is damaged.
    pub const DYNAMIC_CHILD_DAMAGED: u32 = 1 << 2;
    /// Content changes every frame; rendered into the dynamic buffers.
    pub const DYNAMIC: u32 = 1 << 3;
    /// Geometry of this subtree must be recomputed.
    pub const LAYOUT_DAMAGED: u32 = 1 << 4;
    /// Neither drawn nor hit-tested, together with its whole subtree.
    pub const HIDDEN: u32 = 1 << 5;

    /// Any of the render damage bits.
    pub const ANY_DAMAGED: u32 =
        Self::DAMAGED | Self::STATIC_CHILD_DAMAGED | Self::DYNAMIC_CHILD_DAMAGED;

    /// A freshly created widget: needs layout and a static redraw.
    pub const NEW: Self = Self(Self::DAMAGED | Self::STATIC_CHILD_DAMAGED | Self::LAYOUT_DAMAGED);

    /// Creates flags with the given raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&mut self, flag: u32, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

/// Downcasting support for widget trait objects.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-widget content: what a node draws.
///
/// Structure (children, layout, flags, listeners) lives in the
/// [`WidgetTree`](super::WidgetTree); implementors only hold the state their
/// own drawing needs.
pub trait Widget: AsAny {
    /// Emits draw calls for this widget at absolute position `(x, y)`.
    ///
    /// Children are drawn by the tree walk, not here.
    fn render(&self, geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        let _ = (geometry, painter, x, y);
    }

    /// Short name used in trace output.
    fn name(&self) -> &'static str {
        "widget"
    }
}

/// Content-free widget. Used for containers and fixed gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spacer;

impl Widget for Spacer {
    fn name(&self) -> &'static str {
        "spacer"
    }
}
