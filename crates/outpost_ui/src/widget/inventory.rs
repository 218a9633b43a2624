//! Inventory grid and the panel that hosts it.
//!
//! The grid mirrors a server-side inventory. Every slot is a drag source and
//! a drop zone for `inv_items` payloads; drops are shown immediately and
//! queued as [`InventoryMove`]s for the networking layer to send.

use super::item::{ItemDisplay, ItemSlot, SlotActivity};
use super::{handled, Event, EventCx, EventName, Widget, WidgetId, WidgetTree};
use crate::drag::DragPayload;
use crate::error::{UiError, UiResult};
use crate::input::KeyEvent;
use crate::items::ItemId;
use crate::layout::{Layout, LayoutStrategy, Rect};

/// Drag payload tag for inventory items.
pub const INV_ITEMS: &str = "inv_items";

/// Server-side inventory identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryId(pub u32);

/// Contents of one inventory slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotContents {
    /// Item held, if any.
    pub item: Option<ItemId>,
    /// Stack size.
    pub count: u32,
}

/// Full state of an inventory as pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    /// Inventory identifier.
    pub id: InventoryId,
    /// Every slot, in order.
    pub slots: Vec<SlotContents>,
}

/// Data carried by an `inv_items` drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvItemsDrag {
    /// Inventory the stack was lifted from.
    pub inv_id: InventoryId,
    /// Slot it was lifted from.
    pub index: usize,
    /// Item lifted.
    pub item_id: Option<ItemId>,
    /// Stack size lifted.
    pub quantity: Option<u32>,
}

/// A drop the server has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryMove {
    /// Source inventory.
    pub from_inventory: InventoryId,
    /// Source slot.
    pub from_index: usize,
    /// Destination inventory.
    pub to_inventory: InventoryId,
    /// Destination slot.
    pub to_index: usize,
    /// Stack size moved.
    pub quantity: Option<u32>,
}

/// Places equally sized slots row by row.
struct GridLayout {
    columns: usize,
    rows: usize,
}

impl LayoutStrategy for GridLayout {
    fn arrange(&mut self, children: &mut [Rect]) -> (i32, i32) {
        let Some(first) = children.first().copied() else {
            return (0, 0);
        };
        for (i, child) in children.iter_mut().enumerate() {
            child.x = (i % self.columns) as i32 * child.width;
            child.y = (i / self.columns) as i32 * child.height;
        }
        (
            self.columns as i32 * first.width,
            self.rows as i32 * first.height,
        )
    }
}

/// A `w` x `h` grid of item slots with a keyboard-movable selection.
#[derive(Debug, Clone)]
pub struct InventoryGrid {
    grid_w: usize,
    grid_h: usize,
    slots: Vec<WidgetId>,
    inventory_id: Option<InventoryId>,
    active: bool,
    sel_idx: usize,
    moves: Vec<InventoryMove>,
}

impl Widget for InventoryGrid {
    fn name(&self) -> &'static str {
        "inventory-grid"
    }
}

impl InventoryGrid {
    /// Builds a grid of `count` empty slots laid out `w` wide, `h` high.
    pub fn create(tree: &mut WidgetTree, w: usize, h: usize, count: usize) -> UiResult<WidgetId> {
        if count == 0 || count > w * h {
            return Err(UiError::GridOverflow {
                capacity: w * h,
                count,
            });
        }

        let grid = tree.create(
            Self {
                grid_w: w,
                grid_h: h,
                slots: Vec::with_capacity(count),
                inventory_id: None,
                active: false,
                sel_idx: 0,
                moves: Vec::new(),
            },
            Layout::custom(GridLayout { columns: w, rows: h }),
        );

        for i in 0..count {
            let slot = ItemSlot::create(tree)?;
            Self::wire_slot(tree, grid, slot, i)?;
            tree.add_child(grid, slot)?;
            tree.widget_mut::<Self>(grid)?.slots.push(slot);
        }
        let first = tree.widget::<Self>(grid)?.slots[0];
        ItemSlot::set_activity(tree, first, SlotActivity::SemiActive)?;
        Ok(grid)
    }

    fn wire_slot(tree: &mut WidgetTree, grid: WidgetId, slot: WidgetId, index: usize) -> UiResult<()> {
        tree.add_listener(slot, EventName::MouseOver, move |cx, _| {
            handled(Self::set_selection(cx.tree, grid, index))
        })?;

        tree.add_listener(slot, EventName::MouseDown, move |cx, _| handled(Self::lift(cx, grid, index)))?;

        tree.add_listener(slot, EventName::DropCheck, |_, event| {
            matches!(event, Event::Drag(payload) if payload.is(INV_ITEMS))
        })?;

        tree.add_listener(slot, EventName::DragCancel, |cx, event| {
            let Some(data) = inv_items(event) else {
                return false;
            };
            handled(ItemSlot::set_item(cx.tree, cx.target, data.item_id).map(|_| true))
        })?;

        tree.add_listener(slot, EventName::Drop, move |cx, event| {
            let Some(data) = inv_items(event) else {
                return false;
            };
            handled(Self::land(cx, grid, index, data))
        })?;
        Ok(())
    }

    /// Starts dragging the stack in slot `index` and empties the slot.
    fn lift(cx: &mut EventCx<'_>, grid: WidgetId, index: usize) -> UiResult<bool> {
        let Some(inv_id) = cx.tree.widget::<Self>(grid)?.inventory_id else {
            return Ok(false);
        };
        let slot = cx.target;
        let data = InvItemsDrag {
            inv_id,
            index,
            item_id: ItemSlot::item(cx.tree, slot)?,
            quantity: ItemSlot::quantity(cx.tree, slot)?,
        };
        let ghost = ItemDisplay::create(cx.tree);
        ItemDisplay::set_item(cx.tree, ghost, data.item_id)?;
        ItemDisplay::set_quantity(cx.tree, ghost, data.quantity)?;
        cx.start_drag(DragPayload::new(INV_ITEMS, data).with_ghost(ghost));
        ItemSlot::set_item(cx.tree, slot, None)?;
        Ok(true)
    }

    /// Shows a dropped stack in slot `index` and queues the move.
    fn land(cx: &mut EventCx<'_>, grid: WidgetId, index: usize, data: InvItemsDrag) -> UiResult<bool> {
        let slot = cx.target;
        ItemSlot::set_item(cx.tree, slot, data.item_id)?;
        ItemSlot::set_quantity(cx.tree, slot, data.quantity)?;

        let this = cx.tree.widget_mut::<Self>(grid)?;
        if let Some(to_inventory) = this.inventory_id {
            if (data.inv_id, data.index) != (to_inventory, index) {
                this.moves.push(InventoryMove {
                    from_inventory: data.inv_id,
                    from_index: data.index,
                    to_inventory,
                    to_index: index,
                    quantity: data.quantity,
                });
            }
        }
        Ok(true)
    }

    /// Slot widgets in index order.
    #[must_use]
    pub fn slots(&self) -> &[WidgetId] {
        &self.slots
    }

    /// Index of the selected slot.
    #[must_use]
    pub fn selection(&self) -> usize {
        self.sel_idx
    }

    /// Whether the grid has keyboard focus.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Attached inventory, if any.
    #[must_use]
    pub fn inventory_id(&self) -> Option<InventoryId> {
        self.inventory_id
    }

    fn selected_level(&self) -> SlotActivity {
        if self.active {
            SlotActivity::Active
        } else {
            SlotActivity::SemiActive
        }
    }

    /// Mirrors `inventory` into the slots. The slot counts must match.
    pub fn attach(tree: &mut WidgetTree, grid: WidgetId, inventory: &InventorySnapshot) -> UiResult<()> {
        let this = tree.widget::<Self>(grid)?;
        if this.slots.len() != inventory.slots.len() {
            return Err(UiError::InventorySizeMismatch {
                expected: this.slots.len(),
                actual: inventory.slots.len(),
            });
        }

        let slots = this.slots.clone();
        for (slot, contents) in slots.into_iter().zip(&inventory.slots) {
            ItemSlot::set_item(tree, slot, contents.item)?;
            ItemSlot::set_quantity(tree, slot, Some(contents.count))?;
        }
        tree.widget_mut::<Self>(grid)?.inventory_id = Some(inventory.id);
        tracing::debug!("inventory {:?} attached to grid {:?}", inventory.id, grid);
        Ok(())
    }

    /// Applies a server-pushed change to slot `idx`.
    pub fn apply_update(tree: &mut WidgetTree, grid: WidgetId, idx: usize, contents: SlotContents) -> UiResult<bool> {
        let Some(slot) = tree.widget::<Self>(grid)?.slots.get(idx).copied() else {
            return Ok(false);
        };
        let item_changed = ItemSlot::set_item(tree, slot, contents.item)?;
        let qty_changed = ItemSlot::set_quantity(tree, slot, Some(contents.count))?;
        Ok(item_changed || qty_changed)
    }

    /// Takes the drops recorded since the last call.
    pub fn take_moves(tree: &mut WidgetTree, grid: WidgetId) -> UiResult<Vec<InventoryMove>> {
        Ok(std::mem::take(&mut tree.widget_mut::<Self>(grid)?.moves))
    }

    /// Item in the selected slot.
    pub fn selected_item(tree: &WidgetTree, grid: WidgetId) -> UiResult<Option<ItemId>> {
        let this = tree.widget::<Self>(grid)?;
        ItemSlot::item(tree, this.slots[this.sel_idx])
    }

    /// Gives or takes keyboard focus, re-highlighting the selection.
    pub fn set_active(tree: &mut WidgetTree, grid: WidgetId, active: bool) -> UiResult<bool> {
        let this = tree.widget_mut::<Self>(grid)?;
        if this.active == active {
            return Ok(false);
        }
        this.active = active;
        let (slot, level) = (this.slots[this.sel_idx], this.selected_level());
        ItemSlot::set_activity(tree, slot, level)?;
        Ok(true)
    }

    /// Selects slot `idx`. Returns true if the selection moved.
    pub fn set_selection(tree: &mut WidgetTree, grid: WidgetId, idx: usize) -> UiResult<bool> {
        let this = tree.widget_mut::<Self>(grid)?;
        if this.sel_idx == idx || idx >= this.slots.len() {
            return Ok(false);
        }
        let old = this.slots[this.sel_idx];
        this.sel_idx = idx;
        let (new, level) = (this.slots[idx], this.selected_level());

        ItemSlot::set_activity(tree, old, SlotActivity::Inactive)?;
        ItemSlot::set_activity(tree, new, level)?;
        Ok(true)
    }

    /// Moves the selection by `(dx, dy)` cells times `mag`, clamped to the
    /// grid and to the last slot.
    pub fn move_selection(tree: &mut WidgetTree, grid: WidgetId, dx: i64, dy: i64, mag: i64) -> UiResult<bool> {
        let this = tree.widget::<Self>(grid)?;
        let (w, h) = (this.grid_w as i64, this.grid_h as i64);
        let sel = this.sel_idx as i64;
        let x = (sel % w + dx * mag).clamp(0, w - 1);
        let y = (sel / w + dy * mag).clamp(0, h - 1);
        let idx = (x + y * w).min(this.slots.len() as i64 - 1);
        Self::set_selection(tree, grid, idx as usize)
    }

    /// Handles the `move_*` dialog keys. Shift moves ten cells at a time.
    pub fn handle_key(tree: &mut WidgetTree, grid: WidgetId, key: &KeyEvent) -> UiResult<bool> {
        let mag = if key.modifiers.shift { 10 } else { 1 };
        match key.ui_key_name() {
            Some("move_left") => Self::move_selection(tree, grid, -1, 0, mag),
            Some("move_right") => Self::move_selection(tree, grid, 1, 0, mag),
            Some("move_up") => Self::move_selection(tree, grid, 0, -1, mag),
            Some("move_down") => Self::move_selection(tree, grid, 0, 1, mag),
            _ => Ok(false),
        }
    }
}

fn inv_items(event: &Event<'_>) -> Option<InvItemsDrag> {
    match event {
        Event::Drag(payload) if payload.is(INV_ITEMS) => payload.data::<InvItemsDrag>().copied(),
        _ => None,
    }
}

/// Dialog content showing one inventory, six slots wide.
#[derive(Debug, Clone, Copy)]
pub struct InventoryPanel {
    grid: WidgetId,
}

impl Widget for InventoryPanel {
    fn name(&self) -> &'static str {
        "inventory-panel"
    }
}

impl InventoryPanel {
    /// Grid width in slots.
    pub const COLUMNS: usize = 6;

    /// Builds a focused panel mirroring `inventory`.
    ///
    /// On `keydown` the panel moves the grid selection, emits `cancel` for
    /// the cancel and select keys, and emits `set_hotbar` with the selected
    /// item for `set_hotbar_1` to `set_hotbar_9`.
    pub fn create(tree: &mut WidgetTree, inventory: &InventorySnapshot) -> UiResult<WidgetId> {
        let count = inventory.slots.len();
        let rows = count.div_ceil(Self::COLUMNS);
        let grid = InventoryGrid::create(tree, Self::COLUMNS, rows, count)?;
        InventoryGrid::attach(tree, grid, inventory)?;
        InventoryGrid::set_active(tree, grid, true)?;

        let panel = tree.create(Self { grid }, Layout::padded(1));
        tree.add_child(panel, grid)?;
        tree.add_listener(panel, EventName::KeyDown, move |cx, event| {
            let Event::Key(key) = event else {
                return false;
            };
            handled(Self::on_key(cx, grid, key))
        })?;
        Ok(panel)
    }

    /// The hosted grid.
    #[must_use]
    pub fn grid(&self) -> WidgetId {
        self.grid
    }

    fn on_key(cx: &mut EventCx<'_>, grid: WidgetId, key: &KeyEvent) -> UiResult<bool> {
        if InventoryGrid::handle_key(cx.tree, grid, key)? {
            return Ok(true);
        }

        match key.ui_key_name() {
            Some("cancel" | "select") => {
                cx.emit(&EventName::custom("cancel"), &Event::Signal);
                Ok(true)
            }
            Some(name) => {
                let Some(n) = name
                    .strip_prefix("set_hotbar_")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| (1..=9).contains(n))
                else {
                    return Ok(false);
                };
                let item = InventoryGrid::selected_item(cx.tree, grid)?;
                cx.emit(
                    &EventName::custom("set_hotbar"),
                    &Event::SetHotbar { index: n - 1, item },
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
