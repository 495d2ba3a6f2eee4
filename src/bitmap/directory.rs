//! Loose PNG files laid out as `gfx/gfx<category>/<id + 100>.png`

use super::{BitmapKey, BitmapResolver};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Resolves bitmaps from individual PNG files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file backing `key`
    pub fn path_for(&self, key: BitmapKey) -> PathBuf {
        self.root.join(key.relative_path())
    }
}

impl BitmapResolver for DirectoryResolver {
    fn resolve(&self, key: BitmapKey) -> Option<RgbaImage> {
        let path = self.path_for(key);
        match image::open(&path) {
            Ok(image) => Some(image.to_rgba8()),
            Err(e) => {
                log::warn!("failed to load {} from '{}': {}", key, path.display(), e);
                None
            }
        }
    }
}
