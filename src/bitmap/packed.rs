//! Pre-baked category sheets produced by the offline packer
//!
//! Each category ships as `gfx/gfxNNN.png` plus a `gfx/gfxNNN.json` sidecar
//! mapping resource ids to their frame in the sheet:
//!
//! ```json
//! { "1": { "frame": { "x": 0, "y": 0, "w": 18, "h": 58 },
//!          "sourceSize": { "w": 18, "h": 58 } } }
//! ```

use super::{BitmapKey, BitmapResolver, GfxCategory};
use crate::error::{AtlasError, Result};
use crate::rect::Rect;
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Original (pre-packing) size of a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSize {
    pub w: u32,
    pub h: u32,
}

/// Location of one bitmap inside a packed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedFrame {
    pub frame: Rect,
    #[serde(rename = "sourceSize")]
    pub source_size: SourceSize,
}

/// One packed category: the sheet image and its frame table.
#[derive(Debug, Clone)]
pub struct PackedSheet {
    image: RgbaImage,
    frames: HashMap<u32, PackedFrame>,
}

impl PackedSheet {
    pub fn new(image: RgbaImage, frames: HashMap<u32, PackedFrame>) -> Self {
        Self { image, frames }
    }

    /// Load a sheet from its image and sidecar files.
    pub fn load(image_path: &Path, sidecar_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(sidecar_path)?;
        let frames: HashMap<u32, PackedFrame> =
            serde_json::from_str(&contents).map_err(|source| AtlasError::Json {
                path: sidecar_path.display().to_string(),
                source,
            })?;
        let image = image::open(image_path)?.to_rgba8();
        Ok(Self::new(image, frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Cut bitmap `id` out of the sheet.
    ///
    /// The packed frame is placed at the top-left of a canvas of the
    /// bitmap's source size. Frames reaching outside the sheet are rejected.
    pub fn extract(&self, id: u32) -> Option<RgbaImage> {
        let packed = self.frames.get(&id)?;
        let sheet = Rect::new(0, 0, self.image.width(), self.image.height());
        if packed.frame.is_empty() || !sheet.contains(&packed.frame) {
            log::warn!("packed frame {} {:?} lies outside its sheet", id, packed.frame);
            return None;
        }

        let Rect { x, y, w, h } = packed.frame;
        let cropped = imageops::crop_imm(&self.image, x, y, w, h).to_image();
        if packed.source_size.w == w && packed.source_size.h == h {
            return Some(cropped);
        }

        let mut canvas = RgbaImage::new(packed.source_size.w.max(w), packed.source_size.h.max(h));
        imageops::replace(&mut canvas, &cropped, 0, 0);
        Some(canvas)
    }
}

/// Resolves bitmaps from packed category sheets.
#[derive(Debug, Clone, Default)]
pub struct PackedResolver {
    sheets: HashMap<GfxCategory, PackedSheet>,
}

impl PackedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `gfx/gfxNNN.json` sidecar (and its PNG) under `root`.
    ///
    /// A sidecar without its image, or one that does not parse, is an error:
    /// the static asset set is corrupt.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join("gfx");
        let mut resolver = Self::new();

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(category) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix("gfx"))
                .and_then(|n| n.parse::<u16>().ok())
            else {
                continue;
            };

            let image_path = path.with_extension("png");
            let sheet = PackedSheet::load(&image_path, &path)?;
            log::debug!("loaded packed sheet {} ({} frames)", path.display(), sheet.len());
            resolver.insert_sheet(GfxCategory(category), sheet);
        }

        Ok(resolver)
    }

    pub fn insert_sheet(&mut self, category: GfxCategory, sheet: PackedSheet) {
        self.sheets.insert(category, sheet);
    }

    /// Categories with a loaded sheet, sorted
    pub fn categories(&self) -> Vec<GfxCategory> {
        let mut categories: Vec<_> = self.sheets.keys().copied().collect();
        categories.sort();
        categories
    }
}

impl BitmapResolver for PackedResolver {
    fn resolve(&self, key: BitmapKey) -> Option<RgbaImage> {
        let image = self.sheets.get(&key.category).and_then(|sheet| sheet.extract(key.id));
        if image.is_none() {
            log::warn!("no packed frame for {}", key);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn two_tone_sheet() -> RgbaImage {
        let mut sheet = RgbaImage::new(8, 4);
        for y in 0..4 {
            for x in 0..4 {
                sheet.put_pixel(x, y, Rgba([255, 0, 0, 255]));
                sheet.put_pixel(x + 4, y, Rgba([0, 0, 255, 255]));
            }
        }
        sheet
    }

    #[test]
    fn test_sidecar_parses() {
        let json = r#"{ "7": { "frame": { "x": 4, "y": 0, "w": 4, "h": 4 }, "sourceSize": { "w": 4, "h": 4 } } }"#;
        let frames: HashMap<u32, PackedFrame> = serde_json::from_str(json).unwrap();
        assert_eq!(frames[&7].frame, Rect::new(4, 0, 4, 4));
        assert_eq!(frames[&7].source_size, SourceSize { w: 4, h: 4 });
    }

    #[test]
    fn test_extract_crops_frame() {
        let frames = HashMap::from([
            (1, PackedFrame { frame: Rect::new(4, 0, 4, 4), source_size: SourceSize { w: 4, h: 4 } }),
            (2, PackedFrame { frame: Rect::new(0, 0, 2, 2), source_size: SourceSize { w: 3, h: 5 } }),
            (3, PackedFrame { frame: Rect::new(6, 0, 4, 4), source_size: SourceSize { w: 4, h: 4 } }),
        ]);
        let sheet = PackedSheet::new(two_tone_sheet(), frames);

        let blue = sheet.extract(1).unwrap();
        assert_eq!(blue.dimensions(), (4, 4));
        assert_eq!(*blue.get_pixel(0, 0), Rgba([0, 0, 255, 255]));

        let padded = sheet.extract(2).unwrap();
        assert_eq!(padded.dimensions(), (3, 5));
        assert_eq!(*padded.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*padded.get_pixel(2, 4), Rgba([0, 0, 0, 0]));

        assert!(sheet.extract(3).is_none());
        assert!(sheet.extract(99).is_none());
    }

    #[test]
    fn test_open_directory() {
        let temp = TempDir::new().expect("should create temp dir");
        let gfx = temp.path().join("gfx");
        fs::create_dir_all(&gfx).expect("should create gfx dir");
        two_tone_sheet().save(gfx.join("gfx023.png")).expect("should write sheet");
        fs::write(
            gfx.join("gfx023.json"),
            r#"{ "269": { "frame": { "x": 0, "y": 0, "w": 4, "h": 4 }, "sourceSize": { "w": 4, "h": 4 } } }"#,
        )
        .expect("should write sidecar");

        let resolver = PackedResolver::open(temp.path()).expect("should open packed sheets");
        assert_eq!(resolver.categories(), vec![GfxCategory::ITEMS]);
        let gold = resolver.resolve(BitmapKey::new(GfxCategory::ITEMS, 269)).unwrap();
        assert_eq!(*gold.get_pixel(3, 3), Rgba([255, 0, 0, 255]));
        assert!(resolver.resolve(BitmapKey::new(GfxCategory::NPCS, 1)).is_none());
    }

    #[test]
    fn test_open_rejects_bad_sidecar() {
        let temp = TempDir::new().expect("should create temp dir");
        let gfx = temp.path().join("gfx");
        fs::create_dir_all(&gfx).expect("should create gfx dir");
        two_tone_sheet().save(gfx.join("gfx004.png")).expect("should write sheet");
        fs::write(gfx.join("gfx004.json"), "{ not json").expect("should write sidecar");

        let err = PackedResolver::open(temp.path()).unwrap_err();
        assert!(matches!(err, AtlasError::Json { .. }));
    }
}
