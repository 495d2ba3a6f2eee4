//! Configuration loading and discovery for `atlas.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::AtlasConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no config path is given
pub const CONFIG_FILE: &str = "atlas.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse atlas.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override page size
    pub page_size: Option<u32>,
    /// Override the bitmap root directory
    pub gfx_root: Option<PathBuf>,
    /// Read packed sheets instead of loose files
    pub packed: Option<bool>,
    /// Override output directory
    pub out: Option<PathBuf>,
}

/// Find atlas.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find atlas.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an atlas.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. If none is found, returns
/// [`default_config`].
///
/// # Example
/// ```ignore
/// let config = load_config(Some(Path::new("game/atlas.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<AtlasConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(default_config()),
    }
}

fn load_config_file(path: &Path) -> Result<AtlasConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: AtlasConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // Relative directories are relative to the file, not the caller
    if let Some(root) = path.parent() {
        config.gfx.root = resolve_path(root, &config.gfx.root);
        config.output.dir = resolve_path(root, &config.output.dir);
    }

    Ok(config)
}

/// Configuration used when no atlas.toml is found.
pub fn default_config() -> AtlasConfig {
    AtlasConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The result is
/// validated again since an override can break the page/scratch relation.
pub fn merge_cli_overrides(config: &mut AtlasConfig, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(page_size) = overrides.page_size {
        config.atlas.page_size = page_size;
    }

    if let Some(ref root) = overrides.gfx_root {
        config.gfx.root = root.clone();
    }

    if let Some(true) = overrides.packed {
        config.gfx.source = super::GfxSource::Packed;
    }

    if let Some(ref out) = overrides.out {
        config.output.dir = out.clone();
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Resolve a path relative to `base` unless it is absolute.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
