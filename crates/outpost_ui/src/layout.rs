//! Layout system for UI positioning.
//!
//! Every widget owns one [`Layout`]. Layout runs bottom-up: children are sized
//! first, then the owner's strategy reads their sizes, places them relative to
//! the owner and reports the owner's own size.

/// A rectangle in pixels, positioned relative to the owning widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// X position (left edge).
    pub x: i32,
    /// Y position (top edge).
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns true if a point relative to this rect's origin lies inside.
    ///
    /// Left/top edges are inclusive, right/bottom edges exclusive.
    #[inline]
    #[must_use]
    pub const fn hit_local(&self, rx: i32, ry: i32) -> bool {
        rx >= 0 && rx < self.width && ry >= 0 && ry < self.height
    }

    /// Returns true if the point is inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.hit_local(x - self.x, y - self.y)
    }
}

/// Fixed insets around a padded widget's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    /// Top inset.
    pub top: i32,
    /// Right inset.
    pub right: i32,
    /// Bottom inset.
    pub bottom: i32,
    /// Left inset.
    pub left: i32,
}

impl Insets {
    /// Creates insets in top, right, bottom, left order.
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same inset on all four sides.
    #[must_use]
    pub const fn uniform(amount: i32) -> Self {
        Self::new(amount, amount, amount, amount)
    }
}

/// A custom sizing and positioning strategy.
///
/// `children` carries each child's computed size and current position, in
/// child order. Implementations write positions (and may override child
/// sizes) and return the owner's `(width, height)`.
pub trait LayoutStrategy {
    /// Arranges `children` and returns the owner's size.
    fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32);
}

/// Layout strategy attached to a widget.
pub enum Layout {
    /// Constant size. Widgets with this layout must not have children.
    FixedSize {
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
    },
    /// Stacks children top to bottom, centering each horizontally.
    Column {
        /// Vertical gap between consecutive children.
        spacing: i32,
    },
    /// Offsets content by fixed insets and grows to fit it.
    Padded(Insets),
    /// Any other strategy.
    Custom(Box<dyn LayoutStrategy>),
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedSize { width, height } => f
                .debug_struct("FixedSize")
                .field("width", width)
                .field("height", height)
                .finish(),
            Self::Column { spacing } => f.debug_struct("Column").field("spacing", spacing).finish(),
            Self::Padded(insets) => f.debug_tuple("Padded").field(insets).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl Layout {
    /// Fixed-size layout.
    #[must_use]
    pub const fn fixed(width: i32, height: i32) -> Self {
        Self::FixedSize { width, height }
    }

    /// Column layout with the given spacing.
    #[must_use]
    pub const fn column(spacing: i32) -> Self {
        Self::Column { spacing }
    }

    /// Padded layout with the same inset on every side.
    #[must_use]
    pub const fn padded(amount: i32) -> Self {
        Self::Padded(Insets::uniform(amount))
    }

    /// Wraps a custom strategy.
    #[must_use]
    pub fn custom(strategy: impl LayoutStrategy + 'static) -> Self {
        Self::Custom(Box::new(strategy))
    }

    /// Places `children` and returns the owner's size.
    ///
    /// # Panics
    ///
    /// Panics if a [`Layout::FixedSize`] owner has children.
    pub fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32) {
        match self {
            Self::FixedSize { width, height } => {
                assert!(children.is_empty(), "FixedSize layout does not support children");
                (*width, *height)
            }
            Self::Column { spacing } => arrange_column(*spacing, children),
            Self::Padded(insets) => arrange_padded(*insets, children),
            Self::Custom(strategy) => strategy.arrange(children),
        }
    }
}

fn arrange_column(spacing: i32, children: &mut [Rect]) -> (i32, i32) {
    let width = children.iter().map(|c| c.width).max().unwrap_or(0);

    let mut y = 0;
    for child in children.iter_mut() {
        child.x = (width - child.width) / 2;
        child.y = y;
        y += child.height + spacing;
    }
    if !children.is_empty() {
        y -= spacing;
    }

    (width, y)
}

fn arrange_padded(insets: Insets, children: &mut [Rect]) -> (i32, i32) {
    let mut content_w = 0;
    let mut content_h = 0;
    for child in children.iter_mut() {
        child.x = insets.left;
        child.y = insets.top;
        content_w = content_w.max(child.width);
        content_h = content_h.max(child.height);
    }

    (
        content_w + insets.left + insets.right,
        content_h + insets.top + insets.bottom,
    )
}
