//! Entries tracking what each game entity owns in the atlas
//!
//! Characters are keyed by id and carry a visual key; NPC frame sets are
//! shared per NPC graphic; items and tiles own a single frame keyed by
//! graphic.

use crate::bitmap::{BitmapKey, GfxCategory};
use crate::character::{slot_excluded, Appearance, VisualKey, CHARACTER_FRAME_COUNT};
use crate::rect::Frame;
use serde::Serialize;
use std::collections::HashMap;

/// Frames in one NPC graphic set
pub const NPC_FRAME_COUNT: usize = 18;
/// Resource ids reserved per NPC graphic
const NPC_GRAPHIC_SPAN: u32 = 40;

/// A placed character frame and where it sits relative to the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterFrame {
    pub frame: Frame,
    /// Top-left of the trimmed sprite relative to the character anchor
    pub origin: (i32, i32),
}

/// State of one character frame slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Not composed yet (or its skin was not available)
    Pending,
    Placed(CharacterFrame),
    /// Composed to nothing visible
    Blank,
    /// Pose not available to this character
    Excluded,
}

impl SlotState {
    pub fn frame(&self) -> Option<&CharacterFrame> {
        match self {
            SlotState::Placed(frame) => Some(frame),
            _ => None,
        }
    }
}

/// Cached frames of one character.
#[derive(Debug, Clone)]
pub struct CharacterEntry {
    pub id: u32,
    pub appearance: Appearance,
    pub key: VisualKey,
    pub ranged: bool,
    pub dirty: bool,
    pub slots: [SlotState; CHARACTER_FRAME_COUNT],
}

impl CharacterEntry {
    /// A fresh, dirty entry
    pub fn new(id: u32, appearance: Appearance, ranged: bool, has_chairs: bool) -> Self {
        let mut entry = Self {
            id,
            appearance,
            key: appearance.visual_key(),
            ranged,
            dirty: true,
            slots: [SlotState::Pending; CHARACTER_FRAME_COUNT],
        };
        entry.reset_slots(has_chairs);
        entry
    }

    /// Replace the appearance and drop every frame.
    pub fn invalidate(&mut self, appearance: Appearance, ranged: bool, has_chairs: bool) {
        self.appearance = appearance;
        self.key = appearance.visual_key();
        self.ranged = ranged;
        self.dirty = true;
        self.reset_slots(has_chairs);
    }

    fn reset_slots(&mut self, has_chairs: bool) {
        for (slot, state) in self.slots.iter_mut().enumerate() {
            *state = if slot_excluded(slot, has_chairs, self.ranged) {
                SlotState::Excluded
            } else {
                SlotState::Pending
            };
        }
    }

    pub fn pending_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == SlotState::Pending)
            .map(|(slot, _)| slot)
    }

    /// Settle the dirty flag after a composition pass
    pub fn settle(&mut self) {
        let pending = self.pending_slots().next().is_some();
        self.dirty = pending;
    }

    pub fn frame(&self, slot: usize) -> Option<&CharacterFrame> {
        self.slots.get(slot).and_then(SlotState::frame)
    }
}

/// State of one NPC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcSlot {
    Pending,
    Placed(Frame),
    /// Fully transparent or larger than a page; never retried
    Absent,
}

/// Frames of one NPC graphic, shared by every NPC using it.
#[derive(Debug, Clone)]
pub struct NpcEntry {
    pub graphic: u32,
    pub frames: [NpcSlot; NPC_FRAME_COUNT],
}

impl NpcEntry {
    pub fn new(graphic: u32) -> Self {
        Self {
            graphic,
            frames: [NpcSlot::Pending; NPC_FRAME_COUNT],
        }
    }

    /// Bitmap holding frame `index` of NPC graphic `graphic`, or `None` when
    /// the graphic is too large to address.
    pub fn bitmap_key(graphic: u32, index: usize) -> Option<BitmapKey> {
        let index = u32::try_from(index).ok()?;
        let id = graphic
            .saturating_sub(1)
            .checked_mul(NPC_GRAPHIC_SPAN)?
            .checked_add(index)?
            .checked_add(1)?;
        Some(BitmapKey::new(GfxCategory::NPCS, id))
    }

    /// Whether every frame of `graphic` has a resource id
    pub fn addressable(graphic: u32) -> bool {
        Self::bitmap_key(graphic, NPC_FRAME_COUNT - 1).is_some()
    }

    pub fn pending_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == NpcSlot::Pending)
            .map(|(index, _)| index)
    }

    pub fn frame(&self, index: usize) -> Option<Frame> {
        match self.frames.get(index) {
            Some(NpcSlot::Placed(frame)) => Some(*frame),
            _ => None,
        }
    }
}

/// A single-frame entry: ground item or map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteEntry {
    pub key: BitmapKey,
    /// `None` until the bitmap has been loaded and placed
    pub frame: Option<Frame>,
    /// The bitmap is larger than a page and is never retried
    pub oversized: bool,
}

impl SpriteEntry {
    pub fn new(key: BitmapKey) -> Self {
        Self {
            key,
            frame: None,
            oversized: false,
        }
    }

    /// Nothing left to do for this entry until the next context reset
    pub fn settled(&self) -> bool {
        self.frame.is_some() || self.oversized
    }
}

/// The four entry collections.
#[derive(Debug, Clone, Default)]
pub struct EntryCache {
    pub characters: HashMap<u32, CharacterEntry>,
    pub npcs: HashMap<u32, NpcEntry>,
    /// Ground items keyed by sprite id
    pub items: HashMap<u32, SpriteEntry>,
    pub tiles: HashMap<BitmapKey, SpriteEntry>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.characters.clear();
        self.npcs.clear();
        self.items.clear();
        self.tiles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.npcs.is_empty() && self.items.is_empty() && self.tiles.is_empty()
    }
}
