//! Character appearance, frame slots and the layers drawn for each slot

mod frames;
mod layers;
mod tables;

pub use frames::{slot_info, slot_index, Facing, FrameCategory, SlotInfo, CHARACTER_FRAME_COUNT};
pub use layers::{
    layer_specs, required_bitmaps, resolve_layers, slot_excluded, unaddressable_layers, LayerKind, LayerSpec,
};
pub use tables::{hat_mask, HatMask};

use serde::{Deserialize, Serialize};

/// Body type; selects the male or female graphic families and offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Gender {
    /// Table index (female 0, male 1)
    pub fn index(&self) -> usize {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }
}

/// Equipped graphic ids; `0` means the slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    pub armor: u32,
    pub boots: u32,
    pub hat: u32,
    pub shield: u32,
    pub weapon: u32,
}

/// Everything that decides how a character looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub skin: u8,
    /// Hair style, `0` for bald
    #[serde(default)]
    pub hair_style: u8,
    #[serde(default)]
    pub hair_color: u8,
    #[serde(default)]
    pub equipment: Equipment,
}

impl Appearance {
    /// The comparison key for this appearance.
    pub fn visual_key(&self) -> VisualKey {
        VisualKey::of(self)
    }

    pub fn has_hair(&self) -> bool {
        self.hair_style != 0
    }
}

/// Visual identity of a character.
///
/// Skin, gender, hair and every equipment slot concatenated into one key.
/// Any difference invalidates every composited frame of the character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualKey(String);

impl VisualKey {
    pub fn of(appearance: &Appearance) -> Self {
        let eq = &appearance.equipment;
        Self(format!(
            "{}:{}:{}:{}:{}:{}:{}:{}:{}",
            appearance.skin,
            appearance.gender.index(),
            appearance.hair_style,
            appearance.hair_color,
            eq.armor,
            eq.boots,
            eq.hat,
            eq.shield,
            eq.weapon
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
