//! Item icons and the slots that frame them.

use super::{Widget, WidgetId, WidgetTree};
use crate::error::UiResult;
use crate::items::ItemId;
use crate::layout::{Layout, Rect};
use crate::render::Painter;

/// On-screen size of an item icon.
pub const ITEM_DISPLAY_SIZE: i32 = 16;

/// Short form of a stack count: `999`, `1.2k`, `12k`.
///
/// Thousands below ten thousand keep one truncated decimal.
#[must_use]
pub fn quantity_string(qty: u32) -> String {
    if qty < 1000 {
        qty.to_string()
    } else if qty < 10_000 {
        let hundreds = qty / 100;
        format!("{}.{}k", hundreds / 10, hundreds % 10)
    } else {
        format!("{}k", qty / 1000)
    }
}

/// Draws an icon with its quantity badge in the bottom-right corner.
///
/// The badge is skipped without a quantity or for the empty item.
pub(crate) fn draw_stack(painter: &mut Painter<'_>, item: Option<ItemId>, qty: Option<u32>, x: i32, y: i32) {
    let Some(item) = item else {
        return;
    };
    if item != ItemId::NONE {
        painter.draw_item(item, x, y);
    }

    let Some(qty) = qty else {
        return;
    };
    if item == ItemId::NONE {
        return;
    }
    let Some(font) = painter.font("hotbar") else {
        return;
    };
    let s = quantity_string(qty);
    let qx = x + ITEM_DISPLAY_SIZE - font.measure_width(&s) + 1;
    let qy = y + ITEM_DISPLAY_SIZE - font.height + 1;
    painter.draw_text(font, &s, qx, qy);
}

/// A 16x16 item icon with an optional stack count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemDisplay {
    item: Option<ItemId>,
    quantity: Option<u32>,
}

impl Widget for ItemDisplay {
    fn render(&self, _geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        draw_stack(painter, self.item, self.quantity, x, y);
    }

    fn name(&self) -> &'static str {
        "item-display"
    }
}

impl ItemDisplay {
    /// Creates an empty display.
    pub fn create(tree: &mut WidgetTree) -> WidgetId {
        tree.create(Self::default(), Layout::fixed(ITEM_DISPLAY_SIZE, ITEM_DISPLAY_SIZE))
    }

    /// Item shown, if any.
    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// Stack count shown, if any.
    #[must_use]
    pub fn quantity(&self) -> Option<u32> {
        self.quantity
    }

    /// Changes the icon. Returns true if it differed.
    pub fn set_item(tree: &mut WidgetTree, id: WidgetId, item: Option<ItemId>) -> UiResult<bool> {
        tree.update::<Self>(id, |d| std::mem::replace(&mut d.item, item) != item)
    }

    /// Changes the stack count. Returns true if it differed.
    pub fn set_quantity(tree: &mut WidgetTree, id: WidgetId, quantity: Option<u32>) -> UiResult<bool> {
        tree.update::<Self>(id, |d| std::mem::replace(&mut d.quantity, quantity) != quantity)
    }
}

/// Highlight level of an [`ItemSlot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SlotActivity {
    /// Not selected.
    #[default]
    Inactive,
    /// Selected in a grid that does not have focus.
    SemiActive,
    /// Selected in the focused grid.
    Active,
}

impl SlotActivity {
    /// Atlas part drawn behind the icon.
    #[must_use]
    pub const fn atlas_key(self) -> &'static str {
        match self {
            Self::Inactive => "item-slot-square-inactive",
            Self::SemiActive => "item-slot-square-semiactive",
            Self::Active => "item-slot-square-active",
        }
    }
}

/// A framed slot holding one [`ItemDisplay`] with a 2 px border.
#[derive(Debug, Clone, Copy)]
pub struct ItemSlot {
    activity: SlotActivity,
    display: WidgetId,
}

impl Widget for ItemSlot {
    fn render(&self, _geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        painter.draw_ui(self.activity.atlas_key(), x, y);
    }

    fn name(&self) -> &'static str {
        "item-slot"
    }
}

impl ItemSlot {
    /// Border between the frame and the icon.
    pub const PADDING: i32 = 2;

    /// Creates an empty, inactive slot.
    pub fn create(tree: &mut WidgetTree) -> UiResult<WidgetId> {
        let display = ItemDisplay::create(tree);
        let slot = tree.create(
            Self {
                activity: SlotActivity::Inactive,
                display,
            },
            Layout::padded(Self::PADDING),
        );
        tree.add_child(slot, display)?;
        Ok(slot)
    }

    /// The inner icon widget.
    #[must_use]
    pub fn display(&self) -> WidgetId {
        self.display
    }

    /// Current highlight level.
    #[must_use]
    pub fn activity(&self) -> SlotActivity {
        self.activity
    }

    /// Changes the highlight level. Returns true if it differed.
    pub fn set_activity(tree: &mut WidgetTree, slot: WidgetId, activity: SlotActivity) -> UiResult<bool> {
        tree.update::<Self>(slot, |s| std::mem::replace(&mut s.activity, activity) != activity)
    }

    /// Item shown in the slot.
    pub fn item(tree: &WidgetTree, slot: WidgetId) -> UiResult<Option<ItemId>> {
        let display = tree.widget::<Self>(slot)?.display;
        Ok(tree.widget::<ItemDisplay>(display)?.item())
    }

    /// Stack count shown in the slot.
    pub fn quantity(tree: &WidgetTree, slot: WidgetId) -> UiResult<Option<u32>> {
        let display = tree.widget::<Self>(slot)?.display;
        Ok(tree.widget::<ItemDisplay>(display)?.quantity())
    }

    /// Changes the item shown in the slot.
    pub fn set_item(tree: &mut WidgetTree, slot: WidgetId, item: Option<ItemId>) -> UiResult<bool> {
        let display = tree.widget::<Self>(slot)?.display;
        ItemDisplay::set_item(tree, display, item)
    }

    /// Changes the stack count shown in the slot.
    pub fn set_quantity(tree: &mut WidgetTree, slot: WidgetId, quantity: Option<u32>) -> UiResult<bool> {
        let display = tree.widget::<Self>(slot)?.display;
        ItemDisplay::set_quantity(tree, display, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::digit_font;
    use crate::items::ItemDef;
    use crate::render::{AtlasPart, BlitVertex, MaterialBuffers, UiResources};
    use crate::widget::WidgetFlags;

    fn resources() -> UiResources {
        let mut res = UiResources::default();
        res.fonts.insert("hotbar", digit_font());
        res.items.insert(ItemDef {
            id: ItemId(4),
            name: "stone".into(),
            tile_x: 1,
            tile_y: 0,
        });
        res.atlas
            .insert("item-slot-square-active".into(), AtlasPart { x: 0, y: 0, w: 20, h: 20 });
        res
    }

    #[test]
    fn test_quantity_string() {
        assert_eq!(quantity_string(0), "0");
        assert_eq!(quantity_string(999), "999");
        assert_eq!(quantity_string(1000), "1.0k");
        assert_eq!(quantity_string(1299), "1.2k");
        assert_eq!(quantity_string(9999), "9.9k");
        assert_eq!(quantity_string(10_000), "10k");
        assert_eq!(quantity_string(123_456), "123k");
    }

    #[test]
    fn test_badge_bottom_right() {
        let res = resources();
        let mut out = MaterialBuffers::default();
        let display = ItemDisplay {
            item: Some(ItemId(4)),
            quantity: Some(42),
        };
        display.render(&Rect::ZERO, &mut Painter::new(&mut out, &res), 10, 10);

        assert_eq!(out.items.quad_count(), 1);
        assert_eq!(out.text.quad_count(), 2);
        // "42" is 7 px wide: qx = 10 + 16 - 7 + 1, qy = 10 + 16 - 5 + 1.
        assert_eq!(out.text.vertices()[0], BlitVertex::new(12, 20, 20, 22));
    }

    #[test]
    fn test_no_badge_without_item() {
        let res = resources();
        let mut out = MaterialBuffers::default();
        for display in [
            ItemDisplay {
                item: None,
                quantity: Some(3),
            },
            ItemDisplay {
                item: Some(ItemId::NONE),
                quantity: Some(3),
            },
            ItemDisplay {
                item: Some(ItemId(4)),
                quantity: None,
            },
        ] {
            display.render(&Rect::ZERO, &mut Painter::new(&mut out, &res), 0, 0);
        }
        assert_eq!(out.text.quad_count(), 0);
        assert_eq!(out.items.quad_count(), 1);
    }

    #[test]
    fn test_slot_wraps_display() {
        let mut tree = WidgetTree::new();
        let slot = ItemSlot::create(&mut tree).unwrap();
        tree.run_layout(slot).unwrap();

        assert_eq!(tree.geometry(slot).unwrap(), Rect::new(0, 0, 20, 20));
        let display = tree.widget::<ItemSlot>(slot).unwrap().display();
        assert_eq!(tree.geometry(display).unwrap(), Rect::new(2, 2, 16, 16));
    }

    #[test]
    fn test_setters_damage_only_on_change() {
        let mut tree = WidgetTree::new();
        let slot = ItemSlot::create(&mut tree).unwrap();
        let display = tree.widget::<ItemSlot>(slot).unwrap().display();
        tree.node_mut(display).unwrap().flags = WidgetFlags::default();
        tree.node_mut(slot).unwrap().flags = WidgetFlags::default();

        assert!(ItemSlot::set_item(&mut tree, slot, Some(ItemId(4))).unwrap());
        assert!(tree.flags(display).unwrap().has(WidgetFlags::DAMAGED));
        assert!(tree.flags(slot).unwrap().has(WidgetFlags::STATIC_CHILD_DAMAGED));
        assert!(!ItemSlot::set_item(&mut tree, slot, Some(ItemId(4))).unwrap());

        assert!(ItemSlot::set_activity(&mut tree, slot, SlotActivity::Active).unwrap());
        assert!(!ItemSlot::set_activity(&mut tree, slot, SlotActivity::Active).unwrap());
        assert_eq!(ItemSlot::item(&tree, slot).unwrap(), Some(ItemId(4)));
        assert_eq!(ItemSlot::quantity(&tree, slot).unwrap(), None);
    }
}
