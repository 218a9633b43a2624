//! In-game HUD root: hotbar, FPS readout and one dialog.

use super::dialog::Dialog;
use super::hotbar::Hotbar;
use super::{handled, Event, EventCx, EventName, Widget, WidgetId, WidgetTree};
use crate::error::UiResult;
use crate::input::KeyEvent;
use crate::layout::{Layout, LayoutStrategy, Rect};
use crate::render::Painter;

/// Where a root child is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Offset from the top-left corner.
    TopLeft(i32, i32),
    /// Offset from the top-right corner (x measured leftward).
    TopRight(i32, i32),
}

/// Screen-sized layout pinning children by index.
struct RootLayout {
    width: i32,
    height: i32,
}

impl RootLayout {
    /// Hotbar, FPS readout, dialog.
    const ANCHORS: [Anchor; 3] = [Anchor::TopLeft(1, 1), Anchor::TopRight(1, 1), Anchor::TopLeft(100, 50)];
}

impl LayoutStrategy for RootLayout {
    fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32) {
        for (child, anchor) in children.iter_mut().zip(Self::ANCHORS) {
            let (x, y) = match anchor {
                Anchor::TopLeft(x, y) => (x, y),
                Anchor::TopRight(x, y) => (self.width - x, y),
            };
            child.x = x;
            child.y = y;
        }
        (self.width, self.height)
    }
}

/// Frames-per-second readout, right-aligned at its position.
///
/// Redrawn every time the count changes, so it lives in the dynamic pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FpsDisplay {
    fps: u32,
}

impl Widget for FpsDisplay {
    fn render(&self, _geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        let Some(font) = painter.font("name") else {
            return;
        };
        let s = format!("{} FPS", self.fps);
        painter.draw_text(font, &s, x - font.measure_width(&s), y);
    }

    fn name(&self) -> &'static str {
        "fps"
    }
}

impl FpsDisplay {
    /// Creates a hidden readout.
    pub fn create(tree: &mut WidgetTree) -> UiResult<WidgetId> {
        let id = tree.create(Self::default(), Layout::fixed(0, 0));
        tree.set_dynamic(id, true)?;
        tree.set_hidden(id, true)?;
        Ok(id)
    }

    /// Value shown.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Updates the value shown.
    pub fn set_fps(tree: &mut WidgetTree, id: WidgetId, fps: u32) -> UiResult<bool> {
        tree.update::<Self>(id, |d| std::mem::replace(&mut d.fps, fps) != fps)
    }

    /// Shows or hides the readout.
    pub fn toggle(tree: &mut WidgetTree, id: WidgetId, visible: bool) -> UiResult<()> {
        tree.set_hidden(id, !visible)
    }
}

/// Root of the in-game UI.
#[derive(Debug, Clone)]
pub struct GameRoot {
    width: i32,
    height: i32,
    hotbar: WidgetId,
    fps: WidgetId,
    dialog: WidgetId,
    focus: Option<WidgetId>,
}

impl Widget for GameRoot {
    fn name(&self) -> &'static str {
        "game-root"
    }
}

impl GameRoot {
    /// Builds the HUD for a `width` x `height` screen. The FPS readout and
    /// the dialog start hidden.
    ///
    /// Key presses reaching the root go to the open dialog's content first;
    /// otherwise `hotbar_1` to `hotbar_9` select hotbar slots.
    pub fn create(tree: &mut WidgetTree, width: i32, height: i32) -> UiResult<WidgetId> {
        let hotbar = Hotbar::create(tree)?;
        let fps = FpsDisplay::create(tree)?;
        let dialog = Dialog::create(tree)?;
        tree.set_hidden(dialog, true)?;

        let root = tree.create(
            Self {
                width,
                height,
                hotbar,
                fps,
                dialog,
                focus: None,
            },
            Layout::custom(RootLayout { width, height }),
        );
        for child in [hotbar, fps, dialog] {
            tree.add_child(root, child)?;
        }

        tree.add_listener(root, EventName::KeyDown, |cx, event| {
            let Event::Key(key) = event else {
                return false;
            };
            handled(Self::on_key(cx, key))
        })?;
        tracing::info!("game ui created at {}x{}", width, height);
        Ok(root)
    }

    /// Hotbar widget.
    #[must_use]
    pub fn hotbar(&self) -> WidgetId {
        self.hotbar
    }

    /// FPS readout widget.
    #[must_use]
    pub fn fps(&self) -> WidgetId {
        self.fps
    }

    /// Dialog widget.
    #[must_use]
    pub fn dialog(&self) -> WidgetId {
        self.dialog
    }

    /// Content of the open dialog, which receives keys first.
    #[must_use]
    pub fn focus(&self) -> Option<WidgetId> {
        self.focus
    }

    /// Screen size.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Adapts to a new screen size. Returns false if the size is unchanged.
    pub fn resize(tree: &mut WidgetTree, root: WidgetId, width: i32, height: i32) -> UiResult<bool> {
        let this = tree.widget_mut::<Self>(root)?;
        if (this.width, this.height) == (width, height) {
            return Ok(false);
        }
        this.width = width;
        this.height = height;
        tree.set_layout(root, Layout::custom(RootLayout { width, height }))?;
        Ok(true)
    }

    /// Shows `content` in the dialog and gives it key focus.
    ///
    /// The dialog takes ownership: content it replaces is destroyed, and so
    /// is `content` once the dialog closes. While open, a `cancel` signal
    /// from the content closes the dialog and `set_hotbar` puts the carried
    /// item into the hotbar.
    pub fn open_dialog(tree: &mut WidgetTree, root: WidgetId, title: &str, content: WidgetId) -> UiResult<()> {
        let this = tree.widget_mut::<Self>(root)?;
        this.focus = Some(content);
        let (dialog, hotbar) = (this.dialog, this.hotbar);
        let previous = Dialog::content(tree, dialog)?;

        Dialog::set_title(tree, dialog, title)?;
        Dialog::set_content(tree, dialog, Some(content))?;
        tree.set_hidden(dialog, false)?;
        if previous == Some(content) {
            return Ok(());
        }
        if let Some(old) = previous {
            tree.destroy(old)?;
        }

        tree.add_listener(content, EventName::custom("cancel"), move |cx, _| {
            handled(Self::close_if_showing(cx, root))
        })?;
        tree.add_listener(content, EventName::custom("set_hotbar"), move |cx, event| {
            let Event::SetHotbar { index, item: Some(item) } = *event else {
                return false;
            };
            handled(Hotbar::set_slot(cx.tree, hotbar, index, item, true))
        })?;
        tracing::debug!("dialog opened: {:?}", title);
        Ok(())
    }

    /// Hides the dialog and destroys its content.
    pub fn close_dialog(tree: &mut WidgetTree, root: WidgetId) -> UiResult<()> {
        let this = tree.widget_mut::<Self>(root)?;
        this.focus = None;
        let dialog = this.dialog;
        if let Some(content) = Dialog::content(tree, dialog)? {
            Dialog::set_content(tree, dialog, None)?;
            tree.destroy(content)?;
        }
        tree.set_hidden(dialog, true)
    }

    fn close_if_showing(cx: &mut EventCx<'_>, root: WidgetId) -> UiResult<bool> {
        let dialog = cx.tree.widget::<Self>(root)?.dialog;
        if Dialog::content(cx.tree, dialog)? != Some(cx.target) {
            return Ok(false);
        }
        Self::close_dialog(cx.tree, root)?;
        Ok(true)
    }

    fn on_key(cx: &mut EventCx<'_>, key: &KeyEvent) -> UiResult<bool> {
        let this = cx.tree.widget::<Self>(cx.target)?;
        let (focus, hotbar) = (this.focus, this.hotbar);

        if let Some(focus) = focus.filter(|&f| f != cx.target) {
            if cx.tree.dispatch(focus, &EventName::KeyDown, &Event::Key(key)) == Some(true) {
                return Ok(true);
            }
        }

        let Some(n) = key
            .key_name()
            .and_then(|name| name.strip_prefix("hotbar_"))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=Hotbar::SLOTS).contains(n))
        else {
            return Ok(false);
        };
        Hotbar::select_slot(cx.tree, hotbar, n - 1)
    }
}
