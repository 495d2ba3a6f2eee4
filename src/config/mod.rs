//! Configuration for the atlas and its bitmap sources
//!
//! Provides types and parsing for `atlas.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    default_config, find_config, find_config_from, load_config, merge_cli_overrides, CliOverrides, ConfigError,
};
pub use schema::*;
