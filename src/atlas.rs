//! Dynamic atlas - keeps every visible sprite placed on a set of pages
//!
//! A refresh runs in three steps:
//!
//! 1. [`DynamicAtlas::plan_refresh`] reads the world, resets on a context
//!    change, creates entries for first sightings, marks characters whose
//!    visual key changed as dirty, and lists the bitmaps still missing.
//! 2. [`resolve_all`] loads those bitmaps concurrently and waits for all.
//! 3. [`DynamicAtlas::complete_refresh`] composes dirty characters and
//!    places new NPC frames, items and tiles.
//!
//! Only one refresh may be in flight. Planning again before the previous plan
//! completed is refused, and [`DynamicAtlas::refresh`] reports it as
//! [`RefreshOutcome::Dropped`].
//!
//! # Example
//!
//! ```
//! use sprite_atlas::atlas::{DynamicAtlas, RefreshOutcome};
//! use sprite_atlas::bitmap::MemoryResolver;
//! use sprite_atlas::world::Scene;
//!
//! let mut atlas = DynamicAtlas::new(256, (100, 100));
//! let scene = Scene::default();
//! let outcome = atlas.refresh(&scene, &scene, &MemoryResolver::new());
//! assert!(matches!(outcome, RefreshOutcome::Completed(_)));
//! ```

use crate::bitmap::{resolve_all, BitmapKey, BitmapResolver, BitmapStore, GfxCategory, PendingLoad};
use crate::cache::{CharacterEntry, CharacterFrame, EntryCache, NpcEntry, NpcSlot, SlotState, SpriteEntry};
use crate::character::{layer_specs, required_bitmaps, resolve_layers, unaddressable_layers, Appearance};
use crate::compositor::{compose, is_fully_transparent, Composed, Scratch};
use crate::config::AtlasSection;
use crate::error::{AtlasError, Result, Warning};
use crate::page::{Page, PageManager};
use crate::rect::Frame;
use crate::world::{EntitySource, RecordLookup};
use image::RgbaImage;
use std::collections::BTreeSet;

/// Refresh life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// Work decided by [`DynamicAtlas::plan_refresh`].
#[derive(Debug, Clone)]
pub struct RefreshPlan {
    epoch: u64,
    context_reset: bool,
    requests: Vec<BitmapKey>,
    characters: Vec<u32>,
    npcs: Vec<u32>,
    items: Vec<u32>,
    tiles: Vec<BitmapKey>,
    warnings: Vec<Warning>,
}

impl RefreshPlan {
    /// Distinct bitmaps to load, sorted
    pub fn requests(&self) -> &[BitmapKey] {
        &self.requests
    }

    /// Whether planning started a new context
    pub fn context_reset(&self) -> bool {
        self.context_reset
    }

    /// Characters that will be composed
    pub fn characters(&self) -> &[u32] {
        &self.characters
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Whether the plan has nothing to compose or place
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.npcs.is_empty() && self.items.is_empty() && self.tiles.is_empty()
    }
}

/// Summary of a completed refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub context_reset: bool,
    /// Bitmaps requested from the resolver
    pub requested: usize,
    /// Requests that settled without an image
    pub failed_loads: usize,
    pub characters_composed: usize,
    pub frames_placed: usize,
    /// Frames that turned out fully transparent
    pub blank_frames: usize,
    /// Frames left for a later refresh because their bitmap is missing
    pub deferred_frames: usize,
    pub warnings: Vec<Warning>,
}

/// Result of a refresh request.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed(RefreshReport),
    /// Another refresh was in flight; this one did nothing
    Dropped,
    /// The atlas was reset while the plan was in flight; its results were
    /// discarded
    Stale,
}

/// Pages, entries and loaded bitmaps of one atlas.
#[derive(Debug, Clone)]
pub struct DynamicAtlas {
    pages: PageManager,
    entries: EntryCache,
    bitmaps: BitmapStore,
    scratch: Scratch,
    state: RefreshState,
    context: Option<u32>,
    epoch: u64,
}

impl Default for DynamicAtlas {
    fn default() -> Self {
        Self::with_parts(PageManager::default(), Scratch::default())
    }
}

impl DynamicAtlas {
    /// Create an atlas with `page_size` pages and a `scratch` composition
    /// surface.
    pub fn new(page_size: u32, scratch: (u32, u32)) -> Self {
        Self::with_parts(PageManager::new(page_size), Scratch::new(scratch.0, scratch.1))
    }

    /// Create an atlas sized by an `[atlas]` config section.
    pub fn from_config(config: &AtlasSection) -> Self {
        Self::new(config.page_size, (config.scratch[0], config.scratch[1]))
    }

    pub fn with_parts(pages: PageManager, scratch: Scratch) -> Self {
        Self {
            pages,
            entries: EntryCache::new(),
            bitmaps: BitmapStore::new(),
            scratch,
            state: RefreshState::Idle,
            context: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Context (map) the entries belong to
    pub fn context(&self) -> Option<u32> {
        self.context
    }

    pub fn pages(&self) -> &PageManager {
        &self.pages
    }

    pub fn entries(&self) -> &EntryCache {
        &self.entries
    }

    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    /// Pixels of page `index`
    pub fn page(&self, index: usize) -> Option<&RgbaImage> {
        self.pages.page(index).map(Page::image)
    }

    pub fn item_frame(&self, sprite: u32) -> Option<Frame> {
        self.entries.items.get(&sprite).and_then(|e| e.frame)
    }

    pub fn tile_frame(&self, category: GfxCategory, graphic: u32) -> Option<Frame> {
        self.entries
            .tiles
            .get(&BitmapKey::new(category, graphic))
            .and_then(|e| e.frame)
    }

    pub fn npc_frame(&self, graphic: u32, index: usize) -> Option<Frame> {
        self.entries.npcs.get(&graphic).and_then(|e| e.frame(index))
    }

    pub fn character_frame(&self, id: u32, slot: usize) -> Option<Frame> {
        self.character_sprite(id, slot).map(|c| c.frame)
    }

    /// Placed frame of a character slot together with its origin offset
    pub fn character_sprite(&self, id: u32, slot: usize) -> Option<CharacterFrame> {
        self.entries
            .characters
            .get(&id)
            .and_then(|e| e.frame(slot))
            .copied()
    }

    /// Drop everything: pixels, entries and loaded bitmaps.
    ///
    /// A plan still in flight is discarded when it completes.
    pub fn reset(&mut self) {
        self.clear_context();
        self.context = None;
        self.state = RefreshState::Idle;
    }

    fn clear_context(&mut self) {
        self.pages.reset();
        self.entries.clear();
        self.bitmaps.clear();
        self.epoch += 1;
    }

    /// Run a whole refresh: plan, resolve every bitmap, complete.
    pub fn refresh<W, L, R>(&mut self, world: &W, records: &L, resolver: &R) -> RefreshOutcome
    where
        W: EntitySource + ?Sized,
        L: RecordLookup + ?Sized,
        R: BitmapResolver + ?Sized,
    {
        let Some(plan) = self.plan_refresh(world, records) else {
            return RefreshOutcome::Dropped;
        };
        let loads = resolve_all(resolver, plan.requests());
        self.complete_refresh(plan, loads)
    }

    /// First half of a refresh: update entries and list missing bitmaps.
    ///
    /// Returns `None` without touching anything while another plan is in
    /// flight.
    pub fn plan_refresh<W, L>(&mut self, world: &W, records: &L) -> Option<RefreshPlan>
    where
        W: EntitySource + ?Sized,
        L: RecordLookup + ?Sized,
    {
        if self.state == RefreshState::Refreshing {
            log::debug!("refresh already in flight, request dropped");
            return None;
        }

        let map = world.map_id();
        let context_reset = self.context != Some(map);
        if context_reset {
            log::info!("context changed to map {}, resetting atlas", map);
            self.clear_context();
            self.context = Some(map);
        }

        let has_chairs = world.chair_spec_count() > 0;
        let mut warnings = Vec::new();
        let mut requests = BTreeSet::new();

        let mut characters = Vec::new();
        for view in world.characters() {
            let key = view.appearance.visual_key();
            let changed = match self.entries.characters.get_mut(&view.id) {
                Some(entry) if entry.key == key => false,
                Some(entry) => {
                    log::debug!("character {} changed appearance", view.id);
                    let ranged = weapon_is_ranged(records, &view.appearance);
                    entry.invalidate(view.appearance, ranged, has_chairs);
                    true
                }
                None => {
                    let ranged = weapon_is_ranged(records, &view.appearance);
                    self.entries
                        .characters
                        .insert(view.id, CharacterEntry::new(view.id, view.appearance, ranged, has_chairs));
                    true
                }
            };
            if changed {
                for kind in unaddressable_layers(&view.appearance) {
                    note(&mut warnings, format!("character {}: {:?} id out of range, layer skipped", view.id, kind));
                }
            }

            let entry = &self.entries.characters[&view.id];
            if !entry.dirty || characters.contains(&view.id) {
                continue;
            }
            for slot in entry.pending_slots() {
                for key in required_bitmaps(&entry.appearance, slot) {
                    if !self.bitmaps.contains(&key) {
                        requests.insert(key);
                    }
                }
            }
            characters.push(view.id);
        }

        let mut npcs = Vec::new();
        for &species in world.npc_species() {
            let Some(graphic) = records.npc_graphic(species) else {
                note(&mut warnings, format!("no NPC record for species {}", species));
                continue;
            };
            if npcs.contains(&graphic) {
                continue;
            }
            if !NpcEntry::addressable(graphic) {
                note(&mut warnings, format!("NPC graphic {} out of range, skipped", graphic));
                continue;
            }
            let entry = self.entries.npcs.entry(graphic).or_insert_with(|| NpcEntry::new(graphic));
            let mut pending = entry.pending_frames().peekable();
            if pending.peek().is_none() {
                continue;
            }
            for key in pending.filter_map(|index| NpcEntry::bitmap_key(graphic, index)) {
                if !self.bitmaps.contains(&key) {
                    requests.insert(key);
                }
            }
            npcs.push(graphic);
        }

        let mut items = Vec::new();
        for item in world.ground_items() {
            let Some(sprite) = records.item_sprite(item.id, item.amount) else {
                note(&mut warnings, format!("no ground sprite for item {}", item.id));
                continue;
            };
            let entry = self
                .entries
                .items
                .entry(sprite)
                .or_insert_with(|| SpriteEntry::new(BitmapKey::new(GfxCategory::ITEMS, sprite)));
            if entry.settled() || items.contains(&sprite) {
                continue;
            }
            if !self.bitmaps.contains(&entry.key) {
                requests.insert(entry.key);
            }
            items.push(sprite);
        }

        let mut tiles = Vec::new();
        for tile in world.map_tiles() {
            let key = BitmapKey::new(tile.category, tile.graphic);
            let entry = self.entries.tiles.entry(key).or_insert_with(|| SpriteEntry::new(key));
            if entry.settled() || tiles.contains(&key) {
                continue;
            }
            if !self.bitmaps.contains(&key) {
                requests.insert(key);
            }
            tiles.push(key);
        }

        let requests: Vec<BitmapKey> = requests.into_iter().collect();
        log::debug!(
            "planned refresh: {} characters, {} npc sets, {} items, {} tiles, {} bitmaps",
            characters.len(),
            npcs.len(),
            items.len(),
            tiles.len(),
            requests.len()
        );

        self.state = RefreshState::Refreshing;
        Some(RefreshPlan {
            epoch: self.epoch,
            context_reset,
            requests,
            characters,
            npcs,
            items,
            tiles,
            warnings,
        })
    }

    /// Second half of a refresh: take the loaded bitmaps, compose and place.
    pub fn complete_refresh(&mut self, plan: RefreshPlan, loads: Vec<PendingLoad>) -> RefreshOutcome {
        if plan.epoch != self.epoch {
            log::debug!("discarding refresh planned before a reset");
            return RefreshOutcome::Stale;
        }

        let mut report = RefreshReport {
            context_reset: plan.context_reset,
            requested: plan.requests.len(),
            warnings: plan.warnings,
            ..Default::default()
        };
        report.failed_loads = self.bitmaps.absorb(loads);

        for id in &plan.characters {
            self.compose_character(*id, &mut report);
        }
        for graphic in &plan.npcs {
            self.place_npc(*graphic, &mut report);
        }
        for sprite in &plan.items {
            if let Some(entry) = self.entries.items.get_mut(sprite) {
                place_sprite(&mut self.pages, &self.bitmaps, entry, &mut report);
            }
        }
        for key in &plan.tiles {
            if let Some(entry) = self.entries.tiles.get_mut(key) {
                place_sprite(&mut self.pages, &self.bitmaps, entry, &mut report);
            }
        }

        self.state = RefreshState::Idle;
        RefreshOutcome::Completed(report)
    }

    /// Recompose every pending slot of a character.
    fn compose_character(&mut self, id: u32, report: &mut RefreshReport) {
        let Self { pages, entries, bitmaps, scratch, .. } = self;
        let Some(entry) = entries.characters.get_mut(&id) else {
            return;
        };

        let pending: Vec<usize> = entry.pending_slots().collect();
        for slot in pending {
            let specs = layer_specs(&entry.appearance, slot);
            let layers = resolve_layers(&specs, bitmaps, &mut report.warnings);

            match compose(scratch, &layers) {
                Composed::NoLayers => report.deferred_frames += 1,
                Composed::Blank => {
                    entry.slots[slot] = SlotState::Blank;
                    report.blank_frames += 1;
                }
                Composed::Sprite(sprite) => match place(pages, &sprite.image) {
                    Ok(frame) => {
                        entry.slots[slot] = SlotState::Placed(CharacterFrame { frame, origin: sprite.origin });
                        report.frames_placed += 1;
                    }
                    Err(e) => {
                        note(&mut report.warnings, format!("character {} frame {}: {}", id, slot, e));
                        report.deferred_frames += 1;
                    }
                },
            }
        }

        entry.settle();
        report.characters_composed += 1;
    }

    /// Place the pending frames of an NPC graphic; blank ones are dropped
    /// for good.
    fn place_npc(&mut self, graphic: u32, report: &mut RefreshReport) {
        let Self { pages, entries, bitmaps, .. } = self;
        let Some(entry) = entries.npcs.get_mut(&graphic) else {
            return;
        };

        let pending: Vec<usize> = entry.pending_frames().collect();
        for index in pending {
            let Some(image) = NpcEntry::bitmap_key(graphic, index).and_then(|key| bitmaps.get(&key)) else {
                report.deferred_frames += 1;
                continue;
            };

            if is_fully_transparent(image) {
                entry.frames[index] = NpcSlot::Absent;
                report.blank_frames += 1;
                continue;
            }

            match place(pages, image) {
                Ok(frame) => {
                    entry.frames[index] = NpcSlot::Placed(frame);
                    report.frames_placed += 1;
                }
                Err(e @ AtlasError::InvalidRegion { .. }) => {
                    note(&mut report.warnings, format!("NPC {} frame {}: {}", graphic, index, e));
                    entry.frames[index] = NpcSlot::Absent;
                }
                Err(e) => {
                    note(&mut report.warnings, format!("NPC {} frame {}: {}", graphic, index, e));
                    report.deferred_frames += 1;
                }
            }
        }
    }
}

fn weapon_is_ranged<L: RecordLookup + ?Sized>(records: &L, appearance: &Appearance) -> bool {
    let weapon = appearance.equipment.weapon;
    weapon != 0 && records.weapon_meta(weapon).map(|m| m.ranged).unwrap_or(false)
}

/// Insert a bitmap and copy its pixels into the page.
fn place(pages: &mut PageManager, image: &RgbaImage) -> Result<Frame> {
    let frame = pages.insert(image.width(), image.height())?;
    pages.blit(&frame, image)?;
    Ok(frame)
}

fn place_sprite(pages: &mut PageManager, bitmaps: &BitmapStore, entry: &mut SpriteEntry, report: &mut RefreshReport) {
    let Some(image) = bitmaps.get(&entry.key) else {
        report.deferred_frames += 1;
        return;
    };
    match place(pages, image) {
        Ok(frame) => {
            entry.frame = Some(frame);
            report.frames_placed += 1;
        }
        Err(e @ AtlasError::InvalidRegion { .. }) => {
            note(&mut report.warnings, format!("{}: {}, never placed", entry.key, e));
            entry.oversized = true;
        }
        Err(e) => {
            note(&mut report.warnings, format!("{}: {}", entry.key, e));
            report.deferred_frames += 1;
        }
    }
}

fn note(warnings: &mut Vec<Warning>, message: String) {
    log::warn!("{}", message);
    warnings.push(Warning::new(message));
}
