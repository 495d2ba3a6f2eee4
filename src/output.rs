//! PNG output and the frame manifest
//!
//! [`write_atlas`] saves every page as `page_<n>.png` and describes each
//! placed frame in `frames.json`.

use crate::atlas::DynamicAtlas;
use crate::cache::{NpcSlot, SlotState};
use crate::error::{AtlasError, Result};
use crate::rect::Frame;
use image::RgbaImage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the frame manifest
pub const MANIFEST_FILE: &str = "frames.json";

/// A frame's page and position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestFrame {
    pub page: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Top-left of the sprite relative to the character anchor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<[i32; 2]>,
}

impl ManifestFrame {
    fn new(frame: Frame, origin: Option<(i32, i32)>) -> Self {
        Self {
            page: frame.page,
            x: frame.x,
            y: frame.y,
            w: frame.w,
            h: frame.h,
            origin: origin.map(|(x, y)| [x, y]),
        }
    }
}

/// Everything written next to the pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasManifest {
    pub page_size: u32,
    /// Page image file names, by page index
    pub pages: Vec<String>,
    /// Frames keyed `character/<id>/<slot>`, `npc/<graphic>/<frame>`,
    /// `item/<sprite>` or `tile/<gfx>/<graphic>`
    pub frames: BTreeMap<String, ManifestFrame>,
    /// Frames known to draw nothing
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blank: Vec<String>,
}

/// File name of page `index`
pub fn page_file_name(index: usize) -> String {
    format!("page_{}.png", index)
}

/// Describe every placed frame of `atlas`.
pub fn build_manifest(atlas: &DynamicAtlas) -> AtlasManifest {
    let entries = atlas.entries();
    let mut frames = BTreeMap::new();
    let mut blank = Vec::new();

    for (id, entry) in &entries.characters {
        for (slot, state) in entry.slots.iter().enumerate() {
            let name = format!("character/{}/{}", id, slot);
            match state {
                SlotState::Placed(placed) => {
                    frames.insert(name, ManifestFrame::new(placed.frame, Some(placed.origin)));
                }
                SlotState::Blank => blank.push(name),
                SlotState::Pending | SlotState::Excluded => {}
            }
        }
    }

    for (graphic, entry) in &entries.npcs {
        for (index, slot) in entry.frames.iter().enumerate() {
            let name = format!("npc/{}/{}", graphic, index);
            match slot {
                NpcSlot::Placed(frame) => {
                    frames.insert(name, ManifestFrame::new(*frame, None));
                }
                NpcSlot::Absent => blank.push(name),
                NpcSlot::Pending => {}
            }
        }
    }

    for (sprite, entry) in &entries.items {
        if let Some(frame) = entry.frame {
            frames.insert(format!("item/{}", sprite), ManifestFrame::new(frame, None));
        }
    }

    for (key, entry) in &entries.tiles {
        if let Some(frame) = entry.frame {
            let name = format!("tile/{}/{}", key.category.stem(), key.id);
            frames.insert(name, ManifestFrame::new(frame, None));
        }
    }

    blank.sort();
    AtlasManifest {
        page_size: atlas.pages().page_size(),
        pages: (0..atlas.page_count()).map(page_file_name).collect(),
        frames,
        blank,
    }
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Write every page and `frames.json` into `out_dir`.
///
/// Returns the written paths, pages first.
pub fn write_atlas(atlas: &DynamicAtlas, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let manifest = build_manifest(atlas);
    let mut written = Vec::with_capacity(manifest.pages.len() + 1);

    for (index, name) in manifest.pages.iter().enumerate() {
        let Some(image) = atlas.page(index) else {
            return Err(AtlasError::NoSuchPage { index, count: atlas.page_count() });
        };
        let path = out_dir.join(name);
        save_png(image, &path)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }

    let path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).map_err(|source| AtlasError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::create_dir_all(out_dir)?;
    fs::write(&path, json)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::RefreshOutcome;
    use crate::bitmap::{BitmapKey, GfxCategory, MemoryResolver};
    use crate::world::{GroundItem, MapTile, Scene};
    use image::Rgba;
    use tempfile::tempdir;

    fn packed_atlas() -> DynamicAtlas {
        let scene = Scene {
            items: vec![GroundItem { id: 1, amount: 5 }],
            tiles: vec![MapTile { category: GfxCategory::MAP_OBJECTS, graphic: 2 }],
            ..Default::default()
        };
        let resolver = MemoryResolver::new()
            .with(BitmapKey::new(GfxCategory::ITEMS, 271), RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255])))
            .with(BitmapKey::new(GfxCategory::MAP_OBJECTS, 2), RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));

        let mut atlas = DynamicAtlas::new(32, (16, 16));
        assert!(matches!(atlas.refresh(&scene, &scene, &resolver), RefreshOutcome::Completed(_)));
        atlas
    }

    #[test]
    fn test_manifest_lists_placed_frames() {
        let atlas = packed_atlas();
        let manifest = build_manifest(&atlas);

        assert_eq!(manifest.page_size, 32);
        assert_eq!(manifest.pages, vec!["page_0.png".to_string()]);
        assert_eq!(manifest.frames.len(), 2);

        let item = &manifest.frames["item/271"];
        assert_eq!((item.w, item.h, item.origin), (8, 4, None));
        assert!(manifest.frames.contains_key("tile/gfx004/2"));
        assert!(manifest.blank.is_empty());
    }

    #[test]
    fn test_manifest_json_skips_empty_fields() {
        let manifest = build_manifest(&packed_atlas());
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("origin"));
        assert!(!json.contains("blank"));
    }

    #[test]
    fn test_write_atlas() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let atlas = packed_atlas();

        let written = write_atlas(&atlas, &out).unwrap();
        assert_eq!(written, vec![out.join("page_0.png"), out.join("frames.json")]);

        let page = image::open(out.join("page_0.png")).unwrap().to_rgba8();
        assert_eq!(page.dimensions(), (32, 32));

        let frame = atlas.item_frame(271).unwrap();
        assert_eq!(*page.get_pixel(frame.x, frame.y), Rgba([1, 2, 3, 255]));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("frames.json")).unwrap()).unwrap();
        assert_eq!(json["frames"]["item/271"]["w"], 8);
    }

    #[test]
    fn test_save_png_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/test.png");

        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        save_png(&image, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*loaded.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }
}
