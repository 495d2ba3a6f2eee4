//! Dynamic sprite atlas - packs game sprites into large texture pages at runtime
//!
//! This library provides functionality to:
//! - Allocate rectangles on fixed-size pages with a best-fit free list
//! - Compose layered character frames and trim them to their visible pixels
//! - Track which entities already own frames and refresh only what changed
//! - Load bitmaps from loose PNG files or packed sheets
//!
//! [`DynamicAtlas`] is the entry point; [`world`] describes what it reads.

pub mod allocator;
pub mod atlas;
pub mod bitmap;
pub mod cache;
pub mod character;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod output;
pub mod page;
pub mod rect;
pub mod world;

pub use atlas::{DynamicAtlas, RefreshOutcome, RefreshPlan, RefreshReport, RefreshState};
pub use error::{AtlasError, Result, Warning};
pub use rect::{Frame, Rect};
