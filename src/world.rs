//! What the atlas is told about the game world
//!
//! The atlas does not track entities itself. Each refresh it reads the
//! current map, the visible characters, NPCs, ground items and map tiles from
//! an [`EntitySource`], and looks up graphic ids through a [`RecordLookup`].
//! [`Scene`] is a serialisable snapshot implementing both.

use crate::bitmap::GfxCategory;
use crate::character::Appearance;
use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Catalogue id of the currency item; its ground sprite depends on amount.
pub const CURRENCY_ITEM_ID: u32 = 1;

/// Ground sprites of the currency item by amount: (amount below, sprite)
const CURRENCY_SPRITES: [(u32, u32); 4] = [(2, 269), (100, 271), (10_000, 273), (100_000, 275)];
const CURRENCY_SPRITE_MAX: u32 = 277;

/// A visible character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterView {
    pub id: u32,
    #[serde(flatten)]
    pub appearance: Appearance,
}

/// An item lying on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItem {
    pub id: u32,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

fn default_amount() -> u32 {
    1
}

/// A graphic used by one of the map's graphic layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapTile {
    pub category: GfxCategory,
    pub graphic: u32,
}

/// Metadata of an equippable weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeaponMeta {
    /// Attacks use the ranged pose instead of the melee one
    #[serde(default)]
    pub ranged: bool,
}

/// Current state of the world as far as the atlas cares.
pub trait EntitySource {
    /// Identity of the current context; a change resets the atlas
    fn map_id(&self) -> u32;
    /// Number of chair tile specs on the current map
    fn chair_spec_count(&self) -> usize;
    fn characters(&self) -> &[CharacterView];
    /// Species ids of visible NPCs (duplicates allowed)
    fn npc_species(&self) -> &[u32];
    fn ground_items(&self) -> &[GroundItem];
    fn map_tiles(&self) -> &[MapTile];
}

/// Static game records.
pub trait RecordLookup {
    /// NPC graphic id for a species
    fn npc_graphic(&self, species: u32) -> Option<u32>;
    /// Catalogue graphic id of an item
    fn item_graphic(&self, item_id: u32) -> Option<u32>;
    /// Metadata of weapon graphic `weapon`
    fn weapon_meta(&self, weapon: u32) -> Option<WeaponMeta>;

    /// Ground sprite id of `amount` of item `item_id`.
    ///
    /// The currency item switches sprite with the size of the pile; every
    /// other item uses the ground image of its catalogue graphic.
    fn item_sprite(&self, item_id: u32, amount: u32) -> Option<u32> {
        if item_id == CURRENCY_ITEM_ID {
            return Some(currency_sprite(amount));
        }
        let graphic = self.item_graphic(item_id)?;
        graphic.checked_mul(2)?.checked_sub(1)
    }
}

/// Ground sprite for a pile of `amount` currency
pub fn currency_sprite(amount: u32) -> u32 {
    CURRENCY_SPRITES
        .iter()
        .find(|&&(below, _)| amount < below)
        .map(|&(_, sprite)| sprite)
        .unwrap_or(CURRENCY_SPRITE_MAX)
}

/// Record tables, keyed by catalogue id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    /// species -> NPC graphic
    pub npcs: HashMap<u32, u32>,
    /// item id -> catalogue graphic
    pub items: HashMap<u32, u32>,
    /// weapon graphic -> metadata
    pub weapons: HashMap<u32, WeaponMeta>,
}

impl RecordLookup for Records {
    fn npc_graphic(&self, species: u32) -> Option<u32> {
        self.npcs.get(&species).copied()
    }

    fn item_graphic(&self, item_id: u32) -> Option<u32> {
        self.items.get(&item_id).copied()
    }

    fn weapon_meta(&self, weapon: u32) -> Option<WeaponMeta> {
        self.weapons.get(&weapon).copied()
    }
}

/// A snapshot of everything visible, plus the records needed to draw it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub map_id: u32,
    pub chair_specs: usize,
    pub characters: Vec<CharacterView>,
    pub npcs: Vec<u32>,
    pub items: Vec<GroundItem>,
    pub tiles: Vec<MapTile>,
    pub records: Records,
}

impl Scene {
    /// Load a scene from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| AtlasError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

impl EntitySource for Scene {
    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn chair_spec_count(&self) -> usize {
        self.chair_specs
    }

    fn characters(&self) -> &[CharacterView] {
        &self.characters
    }

    fn npc_species(&self) -> &[u32] {
        &self.npcs
    }

    fn ground_items(&self) -> &[GroundItem] {
        &self.items
    }

    fn map_tiles(&self) -> &[MapTile] {
        &self.tiles
    }
}

impl RecordLookup for Scene {
    fn npc_graphic(&self, species: u32) -> Option<u32> {
        self.records.npc_graphic(species)
    }

    fn item_graphic(&self, item_id: u32) -> Option<u32> {
        self.records.item_graphic(item_id)
    }

    fn weapon_meta(&self, weapon: u32) -> Option<WeaponMeta> {
        self.records.weapon_meta(weapon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Gender;

    #[test]
    fn test_currency_tiers() {
        assert_eq!(currency_sprite(0), 269);
        assert_eq!(currency_sprite(1), 269);
        assert_eq!(currency_sprite(2), 271);
        assert_eq!(currency_sprite(99), 271);
        assert_eq!(currency_sprite(100), 273);
        assert_eq!(currency_sprite(9_999), 273);
        assert_eq!(currency_sprite(10_000), 275);
        assert_eq!(currency_sprite(100_000), 277);
        assert_eq!(currency_sprite(u32::MAX), 277);
    }

    #[test]
    fn test_item_sprite_uses_ground_image() {
        let records = Records {
            items: HashMap::from([(5, 12), (6, 0)]),
            ..Default::default()
        };
        assert_eq!(records.item_sprite(5, 1), Some(23));
        assert_eq!(records.item_sprite(6, 1), None);
        assert_eq!(records.item_sprite(7, 1), None);
        assert_eq!(records.item_sprite(CURRENCY_ITEM_ID, 500), Some(273));
    }

    #[test]
    fn test_item_sprite_out_of_range_graphic() {
        let records = Records {
            items: HashMap::from([(5, u32::MAX)]),
            ..Default::default()
        };
        assert_eq!(records.item_sprite(5, 1), None);
    }

    #[test]
    fn test_scene_parses() {
        let json = r#"{
            "map_id": 5,
            "chair_specs": 2,
            "characters": [
                { "id": 9, "gender": "male", "skin": 1, "hair_style": 3, "equipment": { "weapon": 4 } }
            ],
            "npcs": [3, 3],
            "items": [{ "id": 1, "amount": 250 }, { "id": 8 }],
            "tiles": [{ "category": 3, "graphic": 12 }],
            "records": { "npcs": { "3": 17 }, "weapons": { "4": { "ranged": true } } }
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();

        assert_eq!(scene.map_id(), 5);
        assert_eq!(scene.chair_spec_count(), 2);
        assert_eq!(scene.characters()[0].appearance.gender, Gender::Male);
        assert_eq!(scene.characters()[0].appearance.equipment.weapon, 4);
        assert_eq!(scene.ground_items()[1].amount, 1);
        assert_eq!(scene.map_tiles()[0].category, GfxCategory::MAP_TILES);
        assert_eq!(scene.npc_graphic(3), Some(17));
        assert_eq!(scene.weapon_meta(4), Some(WeaponMeta { ranged: true }));
        assert_eq!(scene.weapon_meta(5), None);
    }
}
