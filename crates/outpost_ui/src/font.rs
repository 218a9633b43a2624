//! Bitmap font metrics and string shaping.
//!
//! Glyphs sit side by side on one row of a font sheet. Shaping walks a string
//! and reports, per drawable glyph, where to copy from and where to put it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metrics for one bitmap font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Code point of the first glyph in the tables.
    pub first_char: u32,
    /// Sheet x coordinate of each glyph.
    pub xs: Vec<i32>,
    /// Sheet y coordinate shared by every glyph.
    pub y: i32,
    /// Width of each glyph.
    pub widths: Vec<i32>,
    /// Height shared by every glyph.
    pub height: i32,
    /// Gap between consecutive glyphs.
    pub spacing: i32,
    /// Advance of the space character.
    pub space_width: i32,
}

/// One glyph copy produced by [`FontMetrics::draw_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphQuad {
    /// Source x on the font sheet.
    pub src_x: i32,
    /// Source y on the font sheet.
    pub src_y: i32,
    /// Glyph width.
    pub width: i32,
    /// Glyph height.
    pub height: i32,
    /// Destination x relative to the string origin.
    pub dest_x: i32,
    /// Destination y relative to the string origin.
    pub dest_y: i32,
}

impl FontMetrics {
    const SPACE: u32 = 0x20;

    fn glyph_index(&self, code: u32) -> Option<usize> {
        let idx = usize::try_from(code.checked_sub(self.first_char)?).ok()?;
        (idx < self.widths.len() && idx < self.xs.len()).then_some(idx)
    }

    /// Width of `s` in pixels: every character's width plus one `spacing`
    /// between consecutive characters. Unknown characters count as zero
    /// width.
    #[must_use]
    pub fn measure_width(&self, s: &str) -> i32 {
        let mut total = 0;
        for (i, ch) in s.chars().enumerate() {
            let code = u32::from(ch);
            total += if code == Self::SPACE {
                self.space_width
            } else {
                self.glyph_index(code).map_or(0, |idx| self.widths[idx])
            };
            if i > 0 {
                total += self.spacing;
            }
        }
        total
    }

    /// Shapes `s`, calling `emit` once per drawable glyph.
    ///
    /// A space advances by `space_width`; characters outside the glyph
    /// table are skipped without advancing.
    pub fn draw_string(&self, s: &str, mut emit: impl FnMut(GlyphQuad)) {
        let mut dest_x = 0;
        for ch in s.chars() {
            let code = u32::from(ch);
            if code == Self::SPACE {
                dest_x += self.space_width;
                continue;
            }
            let Some(idx) = self.glyph_index(code) else {
                continue;
            };

            let width = self.widths[idx];
            emit(GlyphQuad {
                src_x: self.xs[idx],
                src_y: self.y,
                width,
                height: self.height,
                dest_x,
                dest_y: 0,
            });
            dest_x += width + self.spacing;
        }
    }

    /// Checks that the glyph tables line up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.xs.len() == self.widths.len() && self.height >= 0
    }
}

/// Fonts indexed by name (`name`, `hotbar`, ...).
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: HashMap<String, FontMetrics>,
}

impl FontRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a font.
    pub fn insert(&mut self, name: impl Into<String>, metrics: FontMetrics) {
        self.fonts.insert(name.into(), metrics);
    }

    /// Looks up a font.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FontMetrics> {
        self.fonts.get(name)
    }
}
