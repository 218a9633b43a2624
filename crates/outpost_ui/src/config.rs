//! # UI Configuration
//!
//! One TOML document describes key bindings, label cache geometry, icon
//! sizes, the initial hotbar and the art tables (atlas parts, fonts, items).
//! Every section has defaults, so an empty document is valid.
//!
//! ```toml
//! [keybindings]
//! 37 = "move_left"
//!
//! [label_cache]
//! cell_width = 96
//! cell_height = 12
//!
//! [atlas.item-slot-square-active]
//! x = 0
//! y = 0
//! w = 20
//! h = 20
//!
//! [[items]]
//! id = 1
//! name = "wood"
//! tile_x = 0
//! tile_y = 0
//! ```

use crate::error::{UiError, UiResult};
use crate::font::FontMetrics;
use crate::items::ItemDef;
use crate::render::AtlasPart;
use crate::widget::hotbar::HotbarConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Geometry of the shared name-label atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCacheConfig {
    /// Width of one label cell.
    pub cell_width: u32,
    /// Height of one label cell.
    pub cell_height: u32,
    /// Atlas surface width.
    pub atlas_width: u32,
    /// Atlas surface height.
    pub atlas_height: u32,
    /// Font used to rasterize labels.
    pub font: String,
}

impl Default for LabelCacheConfig {
    fn default() -> Self {
        Self {
            cell_width: 96,
            cell_height: 12,
            atlas_width: 512,
            atlas_height: 512,
            font: "name".to_owned(),
        }
    }
}

impl LabelCacheConfig {
    /// Cells per atlas row.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.atlas_width / self.cell_width.max(1)
    }

    /// Cells per atlas column.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.atlas_height / self.cell_height.max(1)
    }

    /// Number of labels the atlas holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }
}

/// Item icon sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Size of one icon tile on the item sheet.
    pub icon_tile_size: i32,
    /// On-screen icon size.
    pub icon_display_size: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            icon_tile_size: 32,
            icon_display_size: 16,
        }
    }
}

/// The whole UI configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// In-game key code to action name.
    pub keybindings: BTreeMap<String, String>,
    /// Key code to action name while a dialog has focus.
    pub ui_keybindings: BTreeMap<String, String>,
    /// Name-label atlas.
    pub label_cache: LabelCacheConfig,
    /// Icon sizes.
    pub render: RenderConfig,
    /// Initial hotbar contents.
    pub hotbar: HotbarConfig,
    /// Named UI atlas parts.
    pub atlas: BTreeMap<String, AtlasPart>,
    /// Fonts by name.
    pub fonts: BTreeMap<String, FontMetrics>,
    /// Item definitions.
    pub items: Vec<ItemDef>,
}

fn bindings(pairs: &[(u32, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(code, name)| (code.to_string(), (*name).to_owned()))
        .collect()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            keybindings: bindings(&[
                (37, "move_left"),
                (39, "move_right"),
                (38, "move_up"),
                (40, "move_down"),
                (16, "run"),
                (65, "interact"),
                (83, "use_ability"),
                (87, "abilities"),
                (68, "use_item"),
                (69, "inventory"),
                (112, "show_controls"),
                (113, "show_menu"),
                (114, "debug_show_panel"),
                (67, "toggle_cursor"),
                (27, "cancel"),
                (32, "cancel"),
                (13, "chat"),
                (191, "chat_command"),
                (49, "hotbar_1"),
                (50, "hotbar_2"),
                (51, "hotbar_3"),
                (52, "hotbar_4"),
                (53, "hotbar_5"),
                (54, "hotbar_6"),
                (55, "hotbar_7"),
                (56, "hotbar_8"),
                (57, "hotbar_9"),
            ]),
            ui_keybindings: bindings(&[
                (37, "move_left"),
                (39, "move_right"),
                (38, "move_up"),
                (40, "move_down"),
                (27, "cancel"),
                (32, "cancel"),
                (13, "select"),
                (65, "select"),
                (49, "set_hotbar_1"),
                (50, "set_hotbar_2"),
                (51, "set_hotbar_3"),
                (52, "set_hotbar_4"),
                (53, "set_hotbar_5"),
                (54, "set_hotbar_6"),
                (55, "set_hotbar_7"),
                (56, "set_hotbar_8"),
                (57, "set_hotbar_9"),
            ]),
            label_cache: LabelCacheConfig::default(),
            render: RenderConfig::default(),
            hotbar: HotbarConfig::default(),
            atlas: BTreeMap::new(),
            fonts: BTreeMap::new(),
            items: Vec::new(),
        }
    }
}

impl UiConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> UiResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| UiError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> UiResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| UiError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "loaded ui config from {}: {} atlas parts, {} fonts, {} items",
            path.display(),
            config.atlas.len(),
            config.fonts.len(),
            config.items.len()
        );
        Ok(config)
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> UiResult<()> {
        for code in self.keybindings.keys().chain(self.ui_keybindings.keys()) {
            if code.parse::<u32>().is_err() {
                return Err(UiError::InvalidConfig(format!(
                    "key binding code {code:?} is not a number"
                )));
            }
        }

        let lc = &self.label_cache;
        if lc.cell_width == 0 || lc.cell_height == 0 {
            return Err(UiError::InvalidConfig("label cells must be non-empty".into()));
        }
        if lc.cell_width > lc.atlas_width || lc.cell_height > lc.atlas_height {
            return Err(UiError::InvalidConfig(format!(
                "label cell {}x{} does not fit the {}x{} atlas",
                lc.cell_width, lc.cell_height, lc.atlas_width, lc.atlas_height
            )));
        }

        for (name, font) in &self.fonts {
            if !font.is_consistent() {
                return Err(UiError::InvalidConfig(format!(
                    "font {name:?}: glyph position and width tables differ in length"
                )));
            }
        }

        if self.render.icon_tile_size <= 0 || self.render.icon_display_size <= 0 {
            return Err(UiError::InvalidConfig("icon sizes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemId;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = UiConfig::from_toml_str("").unwrap();
        assert_eq!(config, UiConfig::default());
        assert_eq!(config.label_cache.capacity(), 5 * 42);
        assert_eq!(config.ui_keybindings.get("27").map(String::as_str), Some("cancel"));
    }

    #[test]
    fn test_full_document() {
        let source = r#"
            [keybindings]
            70 = "inventory"

            [label_cache]
            cell_width = 64

            [render]
            icon_tile_size = 16

            [hotbar]
            names = ["wood", "fireball"]
            is_item = [true, false]
            active_item = 0

            [atlas.item-slot-square-active]
            x = 1
            y = 2
            w = 20
            h = 20

            [fonts.hotbar]
            first_char = 48
            xs = [0, 4]
            y = 0
            widths = [3, 3]
            height = 5
            spacing = 1
            space_width = 2

            [[items]]
            id = 7
            name = "wood"
            tile_x = 3
            tile_y = 1
        "#;

        let config = UiConfig::from_toml_str(source).unwrap();

        assert_eq!(config.keybindings.len(), 1);
        assert_eq!(config.label_cache.cell_width, 64);
        assert_eq!(config.label_cache.cell_height, 12);
        assert_eq!(config.render.icon_tile_size, 16);
        assert_eq!(config.render.icon_display_size, 16);
        assert_eq!(config.hotbar.active_item, Some(0));
        assert_eq!(config.hotbar.active_ability, None);
        assert_eq!(config.atlas["item-slot-square-active"].w, 20);
        assert_eq!(config.fonts["hotbar"].widths, vec![3, 3]);
        assert_eq!(config.items[0].id, ItemId(7));
    }

    #[test]
    fn test_rejects_non_numeric_key_code() {
        let err = UiConfig::from_toml_str("[keybindings]\nleft = \"move_left\"\n").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_oversized_label_cell() {
        let err = UiConfig::from_toml_str("[label_cache]\ncell_width = 1024\n").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_syntax() {
        assert!(matches!(
            UiConfig::from_toml_str("[render\n"),
            Err(UiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = UiConfig::from_file("/nonexistent/outpost-ui.toml").unwrap_err();
        assert!(matches!(err, UiError::ConfigIo { .. }));
    }
}
