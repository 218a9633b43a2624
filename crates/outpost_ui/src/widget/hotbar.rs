//! Hotbar: nine quick-access boxes holding items or abilities.
//!
//! One item slot and one ability slot can be active at a time. The active
//! boxes are highlighted; the rest are tinted by what they hold.

use super::item::draw_stack;
use super::{Spacer, Widget, WidgetId, WidgetTree};
use crate::error::UiResult;
use crate::items::{ItemDefs, ItemId};
use crate::layout::{Layout, Rect};
use crate::render::Painter;
use serde::{Deserialize, Serialize};

/// Persisted hotbar contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotbarConfig {
    /// Item or ability name per slot; empty or unknown names leave the slot
    /// empty.
    pub names: Vec<String>,
    /// Per slot: true for an item, false for an ability.
    pub is_item: Vec<bool>,
    /// Slot of the active item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_item: Option<usize>,
    /// Slot of the active ability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_ability: Option<usize>,
}

/// Background tint of an [`ItemBox`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BoxColor {
    /// The active item or ability.
    Active,
    /// An inactive item (or an empty box).
    #[default]
    Item,
    /// An inactive ability.
    Ability,
}

impl BoxColor {
    /// Atlas part drawn as the box background.
    #[must_use]
    pub const fn atlas_key(self) -> &'static str {
        match self {
            Self::Active => "hotbar-box-active",
            Self::Item => "hotbar-box-item",
            Self::Ability => "hotbar-box-ability",
        }
    }
}

/// One 24x24 hotbar box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemBox {
    item: Option<ItemId>,
    quantity: Option<u32>,
    color: BoxColor,
}

impl ItemBox {
    /// Box edge length.
    pub const SIZE: i32 = 24;
    /// Icon inset from the box edge.
    pub const INSET: i32 = 4;

    /// Current tint.
    #[must_use]
    pub fn color(&self) -> BoxColor {
        self.color
    }

    /// Icon shown.
    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// Stack count shown.
    #[must_use]
    pub fn quantity(&self) -> Option<u32> {
        self.quantity
    }
}

impl Widget for ItemBox {
    fn render(&self, _geometry: &Rect, painter: &mut Painter<'_>, x: i32, y: i32) {
        painter.draw_ui(self.color.atlas_key(), x, y);
        draw_stack(painter, self.item, self.quantity, x + Self::INSET, y + Self::INSET);
    }

    fn name(&self) -> &'static str {
        "item-box"
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotInfo {
    item: Option<ItemId>,
    is_item: bool,
}

/// The hotbar column.
#[derive(Debug, Clone)]
pub struct Hotbar {
    slots: Vec<SlotInfo>,
    boxes: Vec<WidgetId>,
    active_item: Option<usize>,
    active_ability: Option<usize>,
}

impl Widget for Hotbar {
    fn name(&self) -> &'static str {
        "hotbar"
    }
}

impl Hotbar {
    /// Number of boxes.
    pub const SLOTS: usize = 9;
    /// Gap above the first and below the last box.
    const END_GAP: i32 = 7;

    /// Builds an empty hotbar: a 7 px gap, nine boxes and another gap,
    /// stacked 1 px apart.
    pub fn create(tree: &mut WidgetTree) -> UiResult<WidgetId> {
        let boxes: Vec<_> = (0..Self::SLOTS)
            .map(|_| tree.create(ItemBox::default(), Layout::fixed(ItemBox::SIZE, ItemBox::SIZE)))
            .collect();
        let hotbar = tree.create(
            Self {
                slots: vec![SlotInfo::default(); Self::SLOTS],
                boxes: boxes.clone(),
                active_item: None,
                active_ability: None,
            },
            Layout::column(1),
        );

        let top = tree.create(Spacer, Layout::fixed(0, Self::END_GAP));
        tree.add_child(hotbar, top)?;
        for b in boxes {
            tree.add_child(hotbar, b)?;
        }
        let bottom = tree.create(Spacer, Layout::fixed(0, Self::END_GAP));
        tree.add_child(hotbar, bottom)?;
        Ok(hotbar)
    }

    /// Box widget for slot `idx`.
    #[must_use]
    pub fn item_box(&self, idx: usize) -> Option<WidgetId> {
        self.boxes.get(idx).copied()
    }

    /// Item or ability in slot `idx`.
    #[must_use]
    pub fn slot(&self, idx: usize) -> Option<(ItemId, bool)> {
        let info = self.slots.get(idx)?;
        info.item.map(|item| (item, info.is_item))
    }

    /// Active item slot.
    #[must_use]
    pub fn active_item_slot(&self) -> Option<usize> {
        self.active_item
    }

    /// Active ability slot.
    #[must_use]
    pub fn active_ability_slot(&self) -> Option<usize> {
        self.active_ability
    }

    /// Item in the active item slot.
    #[must_use]
    pub fn active_item(&self) -> Option<ItemId> {
        self.active_item.and_then(|i| self.slots[i].item)
    }

    /// Ability in the active ability slot.
    #[must_use]
    pub fn active_ability(&self) -> Option<ItemId> {
        self.active_ability.and_then(|i| self.slots[i].item)
    }

    fn color_of(&self, idx: usize) -> BoxColor {
        if self.active_item == Some(idx) || self.active_ability == Some(idx) {
            BoxColor::Active
        } else if self.slots[idx].is_item || self.slots[idx].item.is_none() {
            BoxColor::Item
        } else {
            BoxColor::Ability
        }
    }

    fn set_active_item(&mut self, idx: Option<usize>) -> bool {
        if let Some(i) = idx {
            if !self.slots.get(i).is_some_and(|s| s.is_item) {
                return false;
            }
        }
        self.active_item = idx;
        true
    }

    fn set_active_ability(&mut self, idx: Option<usize>) -> bool {
        if let Some(i) = idx {
            if !self.slots.get(i).is_some_and(|s| !s.is_item) {
                return false;
            }
        }
        self.active_ability = idx;
        true
    }

    fn set_slot_info(&mut self, idx: usize, item: ItemId, is_item: bool) {
        if is_item && self.active_ability == Some(idx) {
            self.active_ability = None;
        }
        if !is_item && self.active_item == Some(idx) {
            self.active_item = None;
        }
        self.slots[idx] = SlotInfo {
            item: Some(item),
            is_item,
        };
    }

    /// Pushes slot contents and tints from the hotbar state to its boxes.
    fn sync_boxes(tree: &mut WidgetTree, id: WidgetId) -> UiResult<()> {
        let hotbar = tree.widget::<Self>(id)?;
        let updates: Vec<_> = (0..Self::SLOTS)
            .map(|i| (hotbar.boxes[i], hotbar.slots[i], hotbar.color_of(i)))
            .collect();

        for (b, info, color) in updates {
            tree.update::<ItemBox>(b, |ib| {
                let quantity = if info.is_item { ib.quantity.or(Some(0)) } else { None };
                let next = ItemBox {
                    item: info.item,
                    quantity: if info.item.is_some() { quantity } else { None },
                    color,
                };
                std::mem::replace(ib, next) != next
            })?;
        }
        Ok(())
    }

    /// Fills the hotbar from persisted state. Names missing from `defs` are
    /// skipped.
    pub fn init(tree: &mut WidgetTree, id: WidgetId, config: &HotbarConfig, defs: &ItemDefs) -> UiResult<()> {
        let hotbar = tree.widget_mut::<Self>(id)?;
        for (i, name) in config.names.iter().enumerate().take(Self::SLOTS) {
            let Some(def) = defs.by_name(name) else {
                if !name.is_empty() {
                    tracing::debug!("hotbar slot {} names unknown item {:?}", i, name);
                }
                continue;
            };
            let is_item = config.is_item.get(i).copied().unwrap_or(false);
            hotbar.set_slot_info(i, def.id, is_item);
        }
        if config.active_item.is_some() {
            hotbar.set_active_item(config.active_item);
        }
        if config.active_ability.is_some() {
            hotbar.set_active_ability(config.active_ability);
        }
        Self::sync_boxes(tree, id)
    }

    /// Puts `item` into slot `idx` as an item or an ability.
    ///
    /// Clears the active selection of the other kind if it pointed at this
    /// slot. Returns false for an out-of-range slot.
    pub fn set_slot(tree: &mut WidgetTree, id: WidgetId, idx: usize, item: ItemId, is_item: bool) -> UiResult<bool> {
        if idx >= Self::SLOTS {
            return Ok(false);
        }
        tree.widget_mut::<Self>(id)?.set_slot_info(idx, item, is_item);
        Self::sync_boxes(tree, id)?;
        Ok(true)
    }

    /// Makes slot `idx` the active item or ability, depending on what it
    /// holds. Empty and out-of-range slots are ignored.
    pub fn select_slot(tree: &mut WidgetTree, id: WidgetId, idx: usize) -> UiResult<bool> {
        let hotbar = tree.widget_mut::<Self>(id)?;
        let Some(info) = hotbar.slots.get(idx).copied() else {
            return Ok(false);
        };
        if info.item.is_none() {
            return Ok(false);
        }
        let changed = if info.is_item {
            hotbar.active_item != Some(idx) && hotbar.set_active_item(Some(idx))
        } else {
            hotbar.active_ability != Some(idx) && hotbar.set_active_ability(Some(idx))
        };
        if changed {
            Self::sync_boxes(tree, id)?;
        }
        Ok(changed)
    }

    /// Refreshes item stack counts from `count`.
    pub fn update_counts(tree: &mut WidgetTree, id: WidgetId, count: impl Fn(ItemId) -> u32) -> UiResult<()> {
        let hotbar = tree.widget::<Self>(id)?;
        let updates: Vec<_> = hotbar
            .slots
            .iter()
            .zip(&hotbar.boxes)
            .filter(|(s, _)| s.is_item)
            .filter_map(|(s, &b)| s.item.map(|item| (b, count(item))))
            .collect();

        for (b, qty) in updates {
            tree.update::<ItemBox>(b, |ib| std::mem::replace(&mut ib.quantity, Some(qty)) != Some(qty))?;
        }
        Ok(())
    }

    /// Current state in persisted form.
    #[must_use]
    pub fn to_config(&self, defs: &ItemDefs) -> HotbarConfig {
        HotbarConfig {
            names: self
                .slots
                .iter()
                .map(|s| {
                    s.item
                        .and_then(|id| defs.by_id(id))
                        .map(|d| d.name.clone())
                        .unwrap_or_default()
                })
                .collect(),
            is_item: self.slots.iter().map(|s| s.is_item).collect(),
            active_item: self.active_item,
            active_ability: self.active_ability,
        }
    }
}
