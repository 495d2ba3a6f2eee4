//! Bitmap resolution - turning (graphic category, resource id) pairs into images
//!
//! The atlas never loads files itself. It asks a [`BitmapResolver`] for every
//! bitmap a refresh needs, all at once, and waits until each request has
//! settled. A failed request settles to "no image" instead of failing the
//! batch.

mod directory;
mod packed;

pub use directory::DirectoryResolver;
pub use packed::{PackedFrame, PackedResolver, PackedSheet, SourceSize};

use crate::config::{GfxSection, GfxSource};
use crate::error::Result;
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Numbered graphic file family (`gfx001` .. `gfx025`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GfxCategory(pub u16);

impl GfxCategory {
    pub const MAP_TILES: GfxCategory = GfxCategory(3);
    pub const MAP_OBJECTS: GfxCategory = GfxCategory(4);
    pub const MAP_OVERLAY: GfxCategory = GfxCategory(5);
    pub const MAP_WALLS_DOWN: GfxCategory = GfxCategory(6);
    pub const MAP_WALLS_RIGHT: GfxCategory = GfxCategory(7);
    pub const SKIN: GfxCategory = GfxCategory(8);
    pub const MALE_HAIR: GfxCategory = GfxCategory(9);
    pub const FEMALE_HAIR: GfxCategory = GfxCategory(10);
    pub const MALE_BOOTS: GfxCategory = GfxCategory(11);
    pub const FEMALE_BOOTS: GfxCategory = GfxCategory(12);
    pub const MALE_ARMOR: GfxCategory = GfxCategory(13);
    pub const FEMALE_ARMOR: GfxCategory = GfxCategory(14);
    pub const MALE_HAT: GfxCategory = GfxCategory(15);
    pub const FEMALE_HAT: GfxCategory = GfxCategory(16);
    pub const NPCS: GfxCategory = GfxCategory(21);
    pub const ITEMS: GfxCategory = GfxCategory(23);

    /// Directory / file stem for this category, e.g. `gfx008`
    pub fn stem(&self) -> String {
        format!("gfx{:03}", self.0)
    }
}

impl std::fmt::Display for GfxCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gfx{:03}", self.0)
    }
}

/// Identity of one bitmap: its category and resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitmapKey {
    pub category: GfxCategory,
    pub id: u32,
}

impl BitmapKey {
    pub const fn new(category: GfxCategory, id: u32) -> Self {
        Self { category, id }
    }

    /// Conventional relative path of the loose PNG for this bitmap.
    ///
    /// Files are numbered with an offset of 100 over the resource id.
    pub fn relative_path(&self) -> String {
        format!("gfx/{}/{}.png", self.category.stem(), u64::from(self.id) + 100)
    }
}

impl std::fmt::Display for BitmapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.category, self.id)
    }
}

/// Source of bitmaps.
///
/// Implementations must be shareable across threads: a batch of requests is
/// resolved concurrently. Failures are reported as `None`.
pub trait BitmapResolver: Sync {
    fn resolve(&self, key: BitmapKey) -> Option<RgbaImage>;
}

/// A settled bitmap request.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub key: BitmapKey,
    pub image: Option<RgbaImage>,
}

/// Resolve every key concurrently and wait for all of them.
///
/// The output keeps the order of `keys`.
pub fn resolve_all<R: BitmapResolver + ?Sized>(resolver: &R, keys: &[BitmapKey]) -> Vec<PendingLoad> {
    keys.par_iter()
        .map(|&key| PendingLoad {
            key,
            image: resolver.resolve(key),
        })
        .collect()
}

/// Open the resolver described by a `[gfx]` config section.
///
/// Packed sheets are read up front, so a broken sidecar fails here.
pub fn open_resolver(gfx: &GfxSection) -> Result<Box<dyn BitmapResolver>> {
    match gfx.source {
        GfxSource::Loose => Ok(Box::new(DirectoryResolver::new(gfx.root.clone()))),
        GfxSource::Packed => Ok(Box::new(PackedResolver::open(&gfx.root)?)),
    }
}

/// Bitmaps loaded so far in the current context.
#[derive(Debug, Default, Clone)]
pub struct BitmapStore {
    images: HashMap<BitmapKey, RgbaImage>,
}

impl BitmapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &BitmapKey) -> Option<&RgbaImage> {
        self.images.get(key)
    }

    pub fn contains(&self, key: &BitmapKey) -> bool {
        self.images.contains_key(key)
    }

    pub fn insert(&mut self, key: BitmapKey, image: RgbaImage) {
        self.images.insert(key, image);
    }

    /// Keep the successful loads; failed ones stay missing so a later refresh
    /// asks again.
    pub fn absorb(&mut self, loads: Vec<PendingLoad>) -> usize {
        let mut failed = 0;
        for load in loads {
            match load.image {
                Some(image) => self.insert(load.key, image),
                None => failed += 1,
            }
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

/// In-memory resolver.
///
/// Handy for embedding pre-decoded graphics and for tests; it remembers every
/// key it was asked for.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    images: HashMap<BitmapKey, RgbaImage>,
    requests: Mutex<Vec<BitmapKey>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: BitmapKey, image: RgbaImage) {
        self.images.insert(key, image);
    }

    pub fn with(mut self, key: BitmapKey, image: RgbaImage) -> Self {
        self.insert(key, image);
        self
    }

    /// Every key requested so far, sorted
    pub fn requests(&self) -> Vec<BitmapKey> {
        let mut requests = match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        requests.sort();
        requests
    }

    pub fn clear_requests(&self) {
        match self.requests.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl BitmapResolver for MemoryResolver {
    fn resolve(&self, key: BitmapKey) -> Option<RgbaImage> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(key),
            Err(poisoned) => poisoned.into_inner().push(key),
        }
        self.images.get(&key).cloned()
    }
}
