//! Item definition table.
//!
//! The UI only needs to know where each item's icon sits on the item sheet
//! and what it is called (hotbar config refers to items by name).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item type identifier as used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u16);

impl ItemId {
    /// The "no item" id. Slots holding it show no quantity badge.
    pub const NONE: Self = Self(0);
}

/// Static data for one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Identifier.
    pub id: ItemId,
    /// Unique name.
    pub name: String,
    /// Icon column on the item sheet, in tiles.
    pub tile_x: u16,
    /// Icon row on the item sheet, in tiles.
    pub tile_y: u16,
}

/// Item definitions indexed by id and by name.
#[derive(Debug, Clone, Default)]
pub struct ItemDefs {
    by_id: HashMap<ItemId, ItemDef>,
    by_name: HashMap<String, ItemId>,
}

impl ItemDefs {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, def: ItemDef) {
        if let Some(old) = self.by_id.get(&def.id) {
            self.by_name.remove(&old.name);
        }
        self.by_name.insert(def.name.clone(), def.id);
        self.by_id.insert(def.id, def);
    }

    /// Looks up a definition by id.
    #[must_use]
    pub fn by_id(&self, id: ItemId) -> Option<&ItemDef> {
        self.by_id.get(&id)
    }

    /// Looks up a definition by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ItemDef> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if no items are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<ItemDef> for ItemDefs {
    fn from_iter<I: IntoIterator<Item = ItemDef>>(iter: I) -> Self {
        let mut defs = Self::new();
        for def in iter {
            defs.insert(def);
        }
        defs
    }
}
