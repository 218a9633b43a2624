//! Name-label cache.
//!
//! Player names above characters are rendered once into cells of a shared
//! RGBA atlas and then drawn from there. The atlas holds a fixed number of
//! cells; once full, the oldest label is overwritten (insertion order, not
//! least-recently-used).

use crate::config::LabelCacheConfig;
use crate::font::FontMetrics;
use crate::layout::Rect;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Ring-buffer map from string to slot index.
#[derive(Debug, Clone)]
pub struct StringCache {
    index: HashMap<String, usize>,
    slots: Vec<Option<String>>,
    next: usize,
}

impl StringCache {
    /// Creates a cache with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "string cache needs at least one slot");
        Self {
            index: HashMap::with_capacity(capacity),
            slots: vec![None; capacity],
            next: 0,
        }
    }

    /// Slot holding `s`, if cached.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<usize> {
        self.index.get(s).copied()
    }

    /// Stores `s` in the next slot, evicting whatever was there.
    pub fn put(&mut self, s: &str) -> usize {
        let slot = self.next;
        self.next = (self.next + 1) % self.slots.len();

        if let Some(old) = self.slots[slot].take() {
            self.index.remove(&old);
        }
        self.slots[slot] = Some(s.to_owned());
        self.index.insert(s.to_owned(), slot);
        slot
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of cached strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// An RGBA8 image in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl RasterSurface {
    /// Creates a transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width as usize) * (height as usize)],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some((y as usize) * (self.width as usize) + x as usize)
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Writes one pixel; out-of-bounds writes are dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = rgba;
        }
    }

    /// Makes `rect` fully transparent.
    pub fn clear_rect(&mut self, rect: Rect) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set_pixel(x, y, [0; 4]);
            }
        }
    }

    /// Copies a `w` x `h` block from `src` at `(sx, sy)` to `(dx, dy)`.
    /// Transparent source pixels are skipped; nothing is written outside
    /// `clip`.
    #[allow(clippy::too_many_arguments)]
    pub fn blit(&mut self, src: &Self, sx: i32, sy: i32, w: i32, h: i32, dx: i32, dy: i32, clip: Rect) {
        for row in 0..h {
            for col in 0..w {
                let (tx, ty) = (dx + col, dy + row);
                if !clip.contains(tx, ty) {
                    continue;
                }
                match src.pixel(sx + col, sy + row) {
                    Some(p) if p[3] != 0 => self.set_pixel(tx, ty, p),
                    _ => {}
                }
            }
        }
    }
}

/// GPU texture the label atlas is uploaded into.
pub trait TextureProvider {
    /// Makes the texture current.
    fn bind(&mut self);
    /// Replaces the texture contents.
    fn load_image(&mut self, image: &RasterSurface);
    /// Releases the binding.
    fn unbind(&mut self);
}

/// Where a label lives in the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSlot {
    /// Left edge of the cell.
    pub x: u32,
    /// Top edge of the cell.
    pub y: u32,
    /// True if the label was rasterized by this call, meaning the atlas
    /// must be re-uploaded.
    pub created: bool,
}

/// String-to-cell cache over a shared label atlas.
pub struct LabelCache {
    cell_width: u32,
    cell_height: u32,
    columns: u32,
    strings: StringCache,
    surface: Arc<RwLock<RasterSurface>>,
    font: FontMetrics,
    glyphs: RasterSurface,
}

impl LabelCache {
    /// Creates an empty cache drawing with `font` from the sheet `glyphs`.
    ///
    /// # Panics
    ///
    /// Panics if a single cell does not fit the atlas; validated configs
    /// never do that.
    #[must_use]
    pub fn new(config: &LabelCacheConfig, font: FontMetrics, glyphs: RasterSurface) -> Self {
        Self {
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            columns: config.columns(),
            strings: StringCache::new(config.capacity()),
            surface: Arc::new(RwLock::new(RasterSurface::new(config.atlas_width, config.atlas_height))),
            font,
            glyphs,
        }
    }

    /// Number of labels the atlas holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.strings.capacity()
    }

    /// Shared handle to the atlas surface.
    #[must_use]
    pub fn surface(&self) -> Arc<RwLock<RasterSurface>> {
        Arc::clone(&self.surface)
    }

    fn cell_origin(&self, slot: usize) -> (u32, u32) {
        let slot = slot as u32;
        (
            self.cell_width * (slot % self.columns),
            self.cell_height * (slot / self.columns),
        )
    }

    /// Cell holding `s`, rasterizing it into the next ring slot on a miss.
    pub fn offset(&mut self, s: &str) -> LabelSlot {
        if let Some(slot) = self.strings.get(s) {
            let (x, y) = self.cell_origin(slot);
            return LabelSlot { x, y, created: false };
        }

        let slot = self.strings.put(s);
        let (x, y) = self.cell_origin(slot);
        self.rasterize(s, x, y);
        tracing::trace!("label {:?} rasterized into slot {}", s, slot);
        LabelSlot { x, y, created: true }
    }

    fn rasterize(&self, s: &str, x: u32, y: u32) {
        let cell = Rect::new(x as i32, y as i32, self.cell_width as i32, self.cell_height as i32);
        let offset_x = (cell.width - self.font.measure_width(s)).div_euclid(2);

        let mut surface = self.surface.write();
        surface.clear_rect(cell);
        self.font.draw_string(s, |g| {
            surface.blit(
                &self.glyphs,
                g.src_x,
                g.src_y,
                g.width,
                g.height,
                cell.x + offset_x + g.dest_x,
                cell.y + g.dest_y,
                cell,
            );
        });
    }

    /// Uploads the atlas: bind, load, unbind.
    pub fn refresh_texture(&self, provider: &mut dyn TextureProvider) {
        let surface = self.surface.read();
        provider.bind();
        provider.load_image(&surface);
        provider.unbind();
    }
}
