//! Configuration schema types for `atlas.toml`
//!
//! Defines the structure and validation rules for atlas configuration.

use crate::compositor::DEFAULT_SCRATCH_SIZE;
use crate::page::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where bitmaps come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GfxSource {
    /// One PNG per resource under `gfx/gfxNNN/`
    #[default]
    Loose,
    /// One packed sheet plus JSON sidecar per category
    Packed,
}

/// Page and scratch sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSection {
    /// Side length of each square page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Composition surface, width and height
    #[serde(default = "default_scratch")]
    pub scratch: [u32; 2],
}

impl Default for AtlasSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            scratch: default_scratch(),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_scratch() -> [u32; 2] {
    [DEFAULT_SCRATCH_SIZE.0, DEFAULT_SCRATCH_SIZE.1]
}

/// Bitmap source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GfxSection {
    /// Directory holding `gfx/`
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub source: GfxSource,
}

impl Default for GfxSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            source: GfxSource::default(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("assets")
}

/// Where `pack` writes pages and the frame manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_out")]
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self { dir: default_out() }
    }
}

fn default_out() -> PathBuf {
    PathBuf::from("build")
}

/// Complete `atlas.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(default)]
    pub atlas: AtlasSection,
    #[serde(default)]
    pub gfx: GfxSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "atlas.page_size")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atlas.toml: '{}' {}", self.field, self.message)
    }
}

impl AtlasConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let [scratch_w, scratch_h] = self.atlas.scratch;

        if self.atlas.page_size == 0 {
            errors.push(ConfigValidationError {
                field: "atlas.page_size".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if scratch_w == 0 || scratch_h == 0 {
            errors.push(ConfigValidationError {
                field: "atlas.scratch".to_string(),
                message: "dimensions must be positive".to_string(),
            });
        }

        // A trimmed frame is at most the scratch size and must fit on a page
        if scratch_w > self.atlas.page_size || scratch_h > self.atlas.page_size {
            errors.push(ConfigValidationError {
                field: "atlas.scratch".to_string(),
                message: format!("must not exceed the page size ({})", self.atlas.page_size),
            });
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Scratch size as a (width, height) pair
    pub fn scratch_size(&self) -> (u32, u32) {
        (self.atlas.scratch[0], self.atlas.scratch[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AtlasConfig = toml::from_str("").unwrap();
        assert_eq!(config.atlas.page_size, 2048);
        assert_eq!(config.scratch_size(), (100, 100));
        assert_eq!(config.gfx.root, PathBuf::from("assets"));
        assert_eq!(config.gfx.source, GfxSource::Loose);
        assert_eq!(config.output.dir, PathBuf::from("build"));
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[atlas]
page_size = 1024
scratch = [120, 90]

[gfx]
root = "client/public"
source = "packed"

[output]
dir = "dist/atlas"
"#;
        let config: AtlasConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.atlas.page_size, 1024);
        assert_eq!(config.scratch_size(), (120, 90));
        assert_eq!(config.gfx.root, PathBuf::from("client/public"));
        assert_eq!(config.gfx.source, GfxSource::Packed);
        assert_eq!(config.output.dir, PathBuf::from("dist/atlas"));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let toml = r#"
[gfx]
source = "remote"
"#;
        assert!(toml::from_str::<AtlasConfig>(toml).is_err());
    }

    #[test]
    fn test_validation_zero_page_size() {
        let toml = r#"
[atlas]
page_size = 0
"#;
        let config: AtlasConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "atlas.page_size"));
    }

    #[test]
    fn test_validation_scratch_larger_than_page() {
        let toml = r#"
[atlas]
page_size = 64
scratch = [100, 50]
"#;
        let config: AtlasConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "atlas.scratch");
        assert!(errors[0].to_string().contains("page size (64)"));
    }
}
