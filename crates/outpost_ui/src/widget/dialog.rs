//! Framed dialog window: a title bar over a bordered body.

use super::{Widget, WidgetId, WidgetTree};
use crate::error::UiResult;
use crate::layout::{Insets, Layout, LayoutStrategy, Rect};
use crate::render::Painter;

const TITLE_HEIGHT: i32 = 30;
const TITLE_SIDE_WIDTH: i32 = 17;
const BODY_PADDING: i32 = 6;
const BODY_BORDER: Insets = Insets::new(8, 10, 8, 11);
const BODY_EXTRA_WIDTH: i32 = 60;
const TITLE_GAP: i32 = 3;

// The spacer art has 8 transparent pixels per side, and the title's outer
// 7 pixels sit too high for it to connect.
const SPACER_INSET: i32 = 7 - 8;
const SPACER_UNIT: i32 = 20;

/// Text strip across the top of a dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogTitle {
    text: String,
}

impl DialogTitle {
    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Widget for DialogTitle {
    fn render(&self, geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        let w = geometry.width;
        painter.draw_ui("dialog-title-left", x, y);
        painter.draw_ui("dialog-title-right", x + w - TITLE_SIDE_WIDTH, y);
        painter.draw_ui_sized(
            "dialog-title-center",
            x + TITLE_SIDE_WIDTH,
            y,
            Some(w - 2 * TITLE_SIDE_WIDTH),
            None,
        );

        let Some(font) = painter.font("name") else {
            return;
        };
        let out_x = x + (w - font.measure_width(&self.text)).div_euclid(2);
        let out_y = y + (geometry.height - font.height).div_euclid(2);
        painter.draw_text(font, &self.text, out_x, out_y);
    }

    fn name(&self) -> &'static str {
        "dialog-title"
    }
}

/// Bordered pane holding the dialog's content widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogBody {
    content: Option<WidgetId>,
}

impl DialogBody {
    /// Content widget, if any.
    #[must_use]
    pub fn content(&self) -> Option<WidgetId> {
        self.content
    }
}

impl Widget for DialogBody {
    fn render(&self, geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        if self.content.is_none() {
            return;
        }
        let frame = Rect::new(x, y, geometry.width, geometry.height);
        painter.draw_ui_frame("dialog-body", frame, BODY_BORDER);
    }

    fn name(&self) -> &'static str {
        "dialog-body"
    }
}

/// Title on top, body below it; the title spans the (widened) body.
struct DialogLayout;

impl LayoutStrategy for DialogLayout {
    fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32) {
        let [title, body] = children else {
            return (0, 0);
        };
        body.width += BODY_EXTRA_WIDTH;
        title.width = body.width;
        title.height = TITLE_HEIGHT;

        title.x = 0;
        title.y = 0;
        body.x = 0;
        body.y = title.height + TITLE_GAP;

        (body.width, title.height + body.height + TITLE_GAP)
    }
}

/// A dialog window.
#[derive(Debug, Clone, Copy)]
pub struct Dialog {
    title: WidgetId,
    body: WidgetId,
}

impl Widget for Dialog {
    fn render(&self, geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        let max_width = geometry.width - 2 * SPACER_INSET;
        let width = max_width.div_euclid(SPACER_UNIT) * SPACER_UNIT;
        let spacer_x = (geometry.width - width).div_euclid(2);
        painter.draw_ui_sized("dialog-spacer", x + spacer_x, y + TITLE_HEIGHT - 2, Some(width), None);
    }

    fn name(&self) -> &'static str {
        "dialog"
    }
}

impl Dialog {
    /// Builds an empty, untitled dialog.
    pub fn create(tree: &mut WidgetTree) -> UiResult<WidgetId> {
        let title = tree.create(DialogTitle::default(), Layout::fixed(0, TITLE_HEIGHT));
        let body = tree.create(DialogBody::default(), Layout::padded(BODY_PADDING));
        let dialog = tree.create(Self { title, body }, Layout::custom(DialogLayout));
        tree.add_child(dialog, title)?;
        tree.add_child(dialog, body)?;
        Ok(dialog)
    }

    /// Title widget.
    #[must_use]
    pub fn title(&self) -> WidgetId {
        self.title
    }

    /// Body widget.
    #[must_use]
    pub fn body(&self) -> WidgetId {
        self.body
    }

    /// Current content widget.
    pub fn content(tree: &WidgetTree, dialog: WidgetId) -> UiResult<Option<WidgetId>> {
        let body = tree.widget::<Self>(dialog)?.body;
        Ok(tree.widget::<DialogBody>(body)?.content)
    }

    /// Replaces the content. The previous content is detached, not
    /// destroyed.
    pub fn set_content(tree: &mut WidgetTree, dialog: WidgetId, content: Option<WidgetId>) -> UiResult<()> {
        let body = tree.widget::<Self>(dialog)?.body;
        let old = tree.widget::<DialogBody>(body)?.content;
        if old == content {
            return Ok(());
        }

        if let Some(old) = old.filter(|&o| tree.parent(o) == Some(body)) {
            tree.remove_child(body, old)?;
        }
        if let Some(new) = content {
            tree.add_child(body, new)?;
        }
        tree.update::<DialogBody>(body, |b| {
            b.content = content;
            true
        })?;
        Ok(())
    }

    /// Changes the title text.
    pub fn set_title(tree: &mut WidgetTree, dialog: WidgetId, text: &str) -> UiResult<bool> {
        let title = tree.widget::<Self>(dialog)?.title;
        tree.update::<DialogTitle>(title, |t| {
            if t.text == text {
                return false;
            }
            text.clone_into(&mut t.text);
            true
        })
    }
}
