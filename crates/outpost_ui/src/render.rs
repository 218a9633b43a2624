//! UI buffer building.
//!
//! Walks the widget tree and fills one vertex stream per material (UI atlas,
//! item icons, text glyphs) for each of two passes. Static chrome lands in
//! the static pass, widgets flagged `DYNAMIC` in the dynamic pass, and only
//! passes with damage below the root are rebuilt.

use crate::config::UiConfig;
use crate::error::{UiError, UiResult};
use crate::font::{FontMetrics, FontRegistry};
use crate::items::{ItemDefs, ItemId};
use crate::layout::{Insets, Rect};
use crate::widget::{WidgetFlags, WidgetId, WidgetTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vertices emitted per quad (two triangles).
pub const VERTICES_PER_QUAD: usize = 6;

/// A named sub-rectangle of the UI atlas sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasPart {
    /// Left edge on the sheet.
    pub x: i32,
    /// Top edge on the sheet.
    pub y: i32,
    /// Width on the sheet.
    pub w: i32,
    /// Height on the sheet.
    pub h: i32,
}

/// Vertex for the UI atlas stream.
///
/// Carries the whole source rectangle plus a per-corner step so the shader
/// can tile the part across a destination larger than the part itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TiledVertex {
    /// Source position on the sheet.
    pub src_pos: [i16; 2],
    /// Source size on the sheet.
    pub src_size: [i16; 2],
    /// Distance of this corner from the destination origin.
    pub src_step: [i16; 2],
    /// Destination position on screen.
    pub dest: [i16; 2],
}

/// Vertex for the item and text streams: a plain source-to-dest blit.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlitVertex {
    /// Source position on the sheet.
    pub src: [i16; 2],
    /// Destination position on screen.
    pub dest: [i16; 2],
}

impl BlitVertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(sx: i32, sy: i32, dx: i32, dy: i32) -> Self {
        Self {
            src: [sx as i16, sy as i16],
            dest: [dx as i16, dy as i16],
        }
    }
}

/// Growable vertex stream for one material.
#[derive(Debug, Clone, Default)]
pub struct QuadBuffer<V> {
    vertices: Vec<V>,
}

impl<V: bytemuck::Pod> QuadBuffer<V> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { vertices: Vec::new() }
    }

    /// Appends one quad.
    pub fn push_quad(&mut self, quad: [V; VERTICES_PER_QUAD]) {
        self.vertices.extend_from_slice(&quad);
    }

    /// Vertices in upload order.
    #[must_use]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of quads.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Removes every quad, keeping the allocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

/// Two triangles covering `(sx,sy,sw,sh)` on the sheet and `(dx,dy,dw,dh)`
/// on screen.
fn blit_quad(sx: i32, sy: i32, sw: i32, sh: i32, dx: i32, dy: i32, dw: i32, dh: i32) -> [BlitVertex; 6] {
    [
        BlitVertex::new(sx, sy, dx, dy),
        BlitVertex::new(sx, sy + sh, dx, dy + dh),
        BlitVertex::new(sx + sw, sy, dx + dw, dy),
        BlitVertex::new(sx + sw, sy, dx + dw, dy),
        BlitVertex::new(sx, sy + sh, dx, dy + dh),
        BlitVertex::new(sx + sw, sy + sh, dx + dw, dy + dh),
    ]
}

/// Output of one pass: a stream per material.
#[derive(Debug, Clone, Default)]
pub struct MaterialBuffers {
    /// UI chrome from the atlas sheet.
    pub ui_atlas: QuadBuffer<TiledVertex>,
    /// Item icons.
    pub items: QuadBuffer<BlitVertex>,
    /// Text glyphs.
    pub text: QuadBuffer<BlitVertex>,
    /// Bumped every time this pass is rebuilt.
    pub generation: u64,
}

impl MaterialBuffers {
    /// Clears every stream and bumps the generation.
    pub fn reset(&mut self) {
        self.ui_atlas.clear();
        self.items.clear();
        self.text.clear();
        self.generation += 1;
    }

    /// Total quads across all materials.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.ui_atlas.quad_count() + self.items.quad_count() + self.text.quad_count()
    }
}

/// Both passes' outputs.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffers {
    /// Rebuilt when static content is damaged.
    pub static_pass: MaterialBuffers,
    /// Rebuilt when dynamic content is damaged.
    pub dynamic_pass: MaterialBuffers,
}

/// Art and metrics the painter draws from.
#[derive(Debug, Clone)]
pub struct UiResources {
    /// Named atlas parts.
    pub atlas: HashMap<String, AtlasPart>,
    /// Item icon locations.
    pub items: ItemDefs,
    /// Fonts by name.
    pub fonts: FontRegistry,
    /// Size of one icon tile on the item sheet.
    pub icon_tile_size: i32,
    /// On-screen icon size.
    pub icon_display_size: i32,
}

impl Default for UiResources {
    fn default() -> Self {
        Self {
            atlas: HashMap::new(),
            items: ItemDefs::new(),
            fonts: FontRegistry::new(),
            icon_tile_size: 32,
            icon_display_size: 16,
        }
    }
}

impl UiResources {
    /// Builds the resource tables described by a config document.
    #[must_use]
    pub fn from_config(config: &UiConfig) -> Self {
        let mut fonts = FontRegistry::new();
        for (name, metrics) in &config.fonts {
            fonts.insert(name.clone(), metrics.clone());
        }
        Self {
            atlas: config.atlas.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            items: config.items.iter().cloned().collect(),
            fonts,
            icon_tile_size: config.render.icon_tile_size,
            icon_display_size: config.render.icon_display_size,
        }
    }
}

/// Draw-call sink handed to [`Widget::render`](crate::widget::Widget::render).
pub struct Painter<'a> {
    buffers: &'a mut MaterialBuffers,
    resources: &'a UiResources,
}

impl<'a> Painter<'a> {
    /// Creates a painter writing into `buffers`.
    pub fn new(buffers: &'a mut MaterialBuffers, resources: &'a UiResources) -> Self {
        Self { buffers, resources }
    }

    /// Looks up a font, logging if it is missing.
    #[must_use]
    pub fn font(&self, name: &str) -> Option<&'a FontMetrics> {
        let font = self.resources.fonts.get(name);
        if font.is_none() {
            tracing::warn!("missing font: {}", name);
        }
        font
    }

    /// Draws an atlas part at its native size.
    pub fn draw_ui(&mut self, key: &str, x: i32, y: i32) {
        self.draw_ui_sized(key, x, y, None, None);
    }

    /// Draws an atlas part, tiling it over `w` x `h` when given.
    pub fn draw_ui_sized(&mut self, key: &str, dx: i32, dy: i32, w: Option<i32>, h: Option<i32>) {
        let Some(part) = self.resources.atlas.get(key) else {
            tracing::warn!("missing ui atlas part: {}", key);
            return;
        };
        let dw = w.unwrap_or(part.w);
        let dh = h.unwrap_or(part.h);

        let vertex = |step_x: i32, step_y: i32| TiledVertex {
            src_pos: [part.x as i16, part.y as i16],
            src_size: [part.w as i16, part.h as i16],
            src_step: [step_x as i16, step_y as i16],
            dest: [(dx + step_x) as i16, (dy + step_y) as i16],
        };
        self.buffers.ui_atlas.push_quad([
            vertex(0, 0),
            vertex(0, dh),
            vertex(dw, 0),
            vertex(dw, 0),
            vertex(0, dh),
            vertex(dw, dh),
        ]);
    }

    /// Draws a 9-slice frame filling `rect`, from the parts
    /// `{prefix}-center`, `{prefix}-n`, ..., `{prefix}-sw`. `border` holds
    /// the edge parts' thickness.
    pub fn draw_ui_frame(&mut self, prefix: &str, rect: Rect, border: Insets) {
        let Rect { x, y, width: w, height: h } = rect;
        let b = border;
        let inner_w = w - b.left - b.right;
        let inner_h = h - b.top - b.bottom;

        let mut part = |suffix: &str, px, py, pw, ph| {
            self.draw_ui_sized(&format!("{prefix}-{suffix}"), px, py, Some(pw), Some(ph));
        };
        part("center", x + b.left, y + b.top, inner_w, inner_h);

        part("n", x + b.left, y, inner_w, b.top);
        part("s", x + b.left, y + h - b.bottom, inner_w, b.bottom);
        part("w", x, y + b.top, b.left, inner_h);
        part("e", x + w - b.right, y + b.top, b.right, inner_h);

        part("nw", x, y, b.left, b.top);
        part("ne", x + w - b.right, y, b.right, b.top);
        part("se", x + w - b.right, y + h - b.bottom, b.right, b.bottom);
        part("sw", x, y + h - b.bottom, b.left, b.bottom);
    }

    /// Draws an item icon.
    pub fn draw_item(&mut self, id: ItemId, dx: i32, dy: i32) {
        let Some(def) = self.resources.items.by_id(id) else {
            tracing::warn!("missing item definition: {:?}", id);
            return;
        };
        let tile = self.resources.icon_tile_size;
        let size = self.resources.icon_display_size;
        self.buffers.items.push_quad(blit_quad(
            i32::from(def.tile_x) * tile,
            i32::from(def.tile_y) * tile,
            tile,
            tile,
            dx,
            dy,
            size,
            size,
        ));
    }

    /// Copies one glyph from the font sheet at 1:1 scale.
    pub fn draw_char(&mut self, sx: i32, sy: i32, w: i32, h: i32, dx: i32, dy: i32) {
        self.buffers.text.push_quad(blit_quad(sx, sy, w, h, dx, dy, w, h));
    }

    /// Shapes `s` with `font` and draws it with its origin at `(x, y)`.
    pub fn draw_text(&mut self, font: &FontMetrics, s: &str, x: i32, y: i32) {
        font.draw_string(s, |g| {
            self.draw_char(g.src_x, g.src_y, g.width, g.height, x + g.dest_x, y + g.dest_y);
        });
    }
}

/// What a call to [`UiRenderer::update_buffers`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Layout was recomputed.
    pub layout_ran: bool,
    /// The static pass was rebuilt.
    pub static_rebuilt: bool,
    /// The dynamic pass was rebuilt.
    pub dynamic_rebuilt: bool,
    /// Widgets whose `render` was called.
    pub widgets_drawn: usize,
    /// Quads emitted by this build.
    pub quads: usize,
}

#[derive(Debug, Clone, Copy)]
struct Passes {
    static_pass: bool,
    dynamic_pass: bool,
}

/// Keeps the UI vertex streams in sync with the widget tree.
pub struct UiRenderer {
    buffers: RenderBuffers,
    resources: UiResources,
}

impl UiRenderer {
    /// Creates a renderer drawing from `resources`.
    #[must_use]
    pub fn new(resources: UiResources) -> Self {
        Self {
            buffers: RenderBuffers::default(),
            resources,
        }
    }

    /// Current output.
    #[must_use]
    pub fn buffers(&self) -> &RenderBuffers {
        &self.buffers
    }

    /// Art and metrics in use.
    #[must_use]
    pub fn resources(&self) -> &UiResources {
        &self.resources
    }

    /// Rebuilds whatever the damage flags under `root` call for.
    ///
    /// Pending layout damage runs layout once on the root and forces both
    /// passes. Without damage nothing is touched.
    pub fn update_buffers(&mut self, tree: &mut WidgetTree, root: WidgetId) -> UiResult<BuildStats> {
        let mut stats = BuildStats::default();

        let flags = tree.flags(root).ok_or(UiError::UnknownWidget(root))?;
        if flags.has(WidgetFlags::LAYOUT_DAMAGED) {
            tree.run_layout(root)?;
            tree.clear_layout_damage(root);
            tree.force_flags(
                root,
                WidgetFlags::STATIC_CHILD_DAMAGED | WidgetFlags::DYNAMIC_CHILD_DAMAGED,
            );
            stats.layout_ran = true;
        }

        let flags = tree.flags(root).ok_or(UiError::UnknownWidget(root))?;
        let passes = Passes {
            static_pass: flags.has(WidgetFlags::STATIC_CHILD_DAMAGED),
            dynamic_pass: flags.has(WidgetFlags::DYNAMIC_CHILD_DAMAGED),
        };
        if !passes.static_pass && !passes.dynamic_pass {
            return Ok(stats);
        }

        if passes.static_pass {
            self.buffers.static_pass.reset();
        }
        if passes.dynamic_pass {
            self.buffers.dynamic_pass.reset();
        }

        let origin = tree.node(root)?.geometry;
        self.walk(tree, root, origin.x, origin.y, false, passes, &mut stats)?;

        stats.static_rebuilt = passes.static_pass;
        stats.dynamic_rebuilt = passes.dynamic_pass;
        if passes.static_pass {
            stats.quads += self.buffers.static_pass.quad_count();
        }
        if passes.dynamic_pass {
            stats.quads += self.buffers.dynamic_pass.quad_count();
        }
        tracing::debug!(
            "ui buffers rebuilt: static={} dynamic={} widgets={} quads={}",
            stats.static_rebuilt,
            stats.dynamic_rebuilt,
            stats.widgets_drawn,
            stats.quads
        );
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &mut self,
        tree: &mut WidgetTree,
        id: WidgetId,
        x: i32,
        y: i32,
        hidden_above: bool,
        passes: Passes,
        stats: &mut BuildStats,
    ) -> UiResult<()> {
        let node = tree.node_mut(id)?;
        let hidden = hidden_above || node.flags.has(WidgetFlags::HIDDEN);
        let dynamic = node.flags.has(WidgetFlags::DYNAMIC);

        let target = if dynamic && passes.dynamic_pass {
            Some(&mut self.buffers.dynamic_pass)
        } else if !dynamic && passes.static_pass {
            Some(&mut self.buffers.static_pass)
        } else {
            None
        };
        if let Some(buffers) = target {
            if !hidden {
                let mut painter = Painter::new(buffers, &self.resources);
                node.widget.render(&node.geometry, &mut painter, x, y);
                stats.widgets_drawn += 1;
            }
            node.flags.clear(WidgetFlags::DAMAGED);
        }
        if passes.static_pass {
            node.flags.clear(WidgetFlags::STATIC_CHILD_DAMAGED);
        }
        if passes.dynamic_pass {
            node.flags.clear(WidgetFlags::DYNAMIC_CHILD_DAMAGED);
        }

        let children = node.children.clone();
        for child in children {
            let offset = tree.node(child)?.geometry;
            self.walk(tree, child, x + offset.x, y + offset.y, hidden, passes, stats)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemDef;
    use crate::layout::Layout;
    use crate::widget::Widget;

    struct Block;

    impl Widget for Block {
        fn render(&self, _geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
            painter.draw_ui("block", x, y);
        }
    }

    fn resources() -> UiResources {
        let mut res = UiResources::default();
        res.atlas.insert("block".into(), AtlasPart { x: 8, y: 16, w: 4, h: 4 });
        res.items.insert(ItemDef {
            id: ItemId(3),
            name: "rock".into(),
            tile_x: 2,
            tile_y: 1,
        });
        res
    }

    #[test]
    fn test_draw_ui_tiles() {
        let res = resources();
        let mut out = MaterialBuffers::default();
        Painter::new(&mut out, &res).draw_ui_sized("block", 10, 20, Some(12), None);

        let v = out.ui_atlas.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].src_pos, [8, 16]);
        assert_eq!(v[0].src_size, [4, 4]);
        assert_eq!(v[5].src_step, [12, 4]);
        assert_eq!(v[5].dest, [22, 24]);
        assert_eq!(out.ui_atlas.as_bytes().len(), 6 * 16);
    }

    #[test]
    fn test_missing_part_is_skipped() {
        let res = resources();
        let mut out = MaterialBuffers::default();
        let mut painter = Painter::new(&mut out, &res);
        painter.draw_ui("nope", 0, 0);
        painter.draw_item(ItemId(99), 0, 0);
        assert_eq!(out.quad_count(), 0);
    }

    #[test]
    fn test_draw_item_scales_tile() {
        let res = resources();
        let mut out = MaterialBuffers::default();
        Painter::new(&mut out, &res).draw_item(ItemId(3), 5, 6);

        let v = out.items.vertices();
        assert_eq!(v[0], BlitVertex::new(64, 32, 5, 6));
        assert_eq!(v[5], BlitVertex::new(96, 64, 21, 22));
    }

    #[test]
    fn test_frame_emits_nine_parts() {
        let mut res = resources();
        for suffix in ["center", "n", "s", "w", "e", "nw", "ne", "se", "sw"] {
            res.atlas
                .insert(format!("frame-{suffix}"), AtlasPart { x: 0, y: 0, w: 2, h: 2 });
        }
        let mut out = MaterialBuffers::default();
        Painter::new(&mut out, &res).draw_ui_frame(
            "frame",
            Rect::new(0, 0, 40, 30),
            Insets::new(8, 10, 8, 11),
        );
        assert_eq!(out.ui_atlas.quad_count(), 9);
        // `se` corner
        assert_eq!(out.ui_atlas.vertices()[7 * 6].dest, [30, 22]);
    }

    #[test]
    fn test_second_build_is_noop() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Block, Layout::column(0));
        let child = tree.create(Block, Layout::fixed(4, 4));
        tree.add_child(root, child).unwrap();

        let mut renderer = UiRenderer::new(resources());
        let first = renderer.update_buffers(&mut tree, root).unwrap();
        assert!(first.layout_ran);
        assert_eq!(first.quads, 2);

        let generation = renderer.buffers().static_pass.generation;
        let second = renderer.update_buffers(&mut tree, root).unwrap();
        assert_eq!(second, BuildStats::default());
        assert_eq!(renderer.buffers().static_pass.generation, generation);
        assert_eq!(renderer.buffers().static_pass.quad_count(), 2);
    }

    #[test]
    fn test_dynamic_damage_leaves_static_pass() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Block, Layout::column(0));
        let fps = tree.create(Block, Layout::fixed(4, 4));
        tree.add_child(root, fps).unwrap();
        tree.set_dynamic(fps, true).unwrap();

        let mut renderer = UiRenderer::new(resources());
        renderer.update_buffers(&mut tree, root).unwrap();
        assert_eq!(renderer.buffers().static_pass.quad_count(), 1);
        assert_eq!(renderer.buffers().dynamic_pass.quad_count(), 1);
        let static_gen = renderer.buffers().static_pass.generation;

        tree.damage(fps).unwrap();
        let stats = renderer.update_buffers(&mut tree, root).unwrap();

        assert!(stats.dynamic_rebuilt);
        assert!(!stats.static_rebuilt);
        assert_eq!(stats.quads, 1);
        assert_eq!(renderer.buffers().static_pass.generation, static_gen);
    }

    #[test]
    fn test_hidden_subtree_draws_nothing_but_is_cleaned() {
        let mut tree = WidgetTree::new();
        let root = tree.create(Block, Layout::column(0));
        let panel = tree.create(Block, Layout::column(0));
        let leaf = tree.create(Block, Layout::fixed(4, 4));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, leaf).unwrap();
        tree.set_hidden(panel, true).unwrap();

        let mut renderer = UiRenderer::new(resources());
        let stats = renderer.update_buffers(&mut tree, root).unwrap();

        assert_eq!(stats.widgets_drawn, 1);
        assert!(!tree.flags(leaf).unwrap().has(WidgetFlags::ANY_DAMAGED));

        tree.damage(leaf).unwrap();
        assert!(tree.flags(root).unwrap().has(WidgetFlags::STATIC_CHILD_DAMAGED));
    }
}
