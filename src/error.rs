//! Error and warning types shared across the atlas

use thiserror::Error;

/// A non-fatal problem noticed during a refresh.
///
/// Warnings are logged as they happen and also returned in the refresh
/// report so callers can surface them.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors raised by the atlas and its bitmap sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AtlasError {
    /// A region that can never be placed on any page
    #[error("Region {w}x{h} cannot be placed on a {page_size}x{page_size} page")]
    InvalidRegion { w: u32, h: u32, page_size: u32 },
    /// Page index out of range
    #[error("Page {index} does not exist ({count} pages allocated)")]
    NoSuchPage { index: usize, count: usize },
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// A JSON document (packed sidecar, scene) could not be parsed
    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;
