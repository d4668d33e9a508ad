//! Error types for export operations.

use thiserror::Error;

/// Result type for export operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Export requested for an id that is not in the scene.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Export requested on an element kind that cannot be an export root.
    #[error("Unsupported export root: {0}")]
    UnsupportedRoot(String),

    /// The SVG intermediate failed to parse.
    #[error("SVG error: {0}")]
    Svg(String),

    /// The raster surface could not be allocated.
    #[error("Raster surface error: {0}")]
    Surface(String),

    /// PNG encoding failed.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// An image source failed to load. Recovered per-image with a
    /// placeholder; surfaced only when resolution itself is queried.
    #[error("Failed to load resource: {0}")]
    Resource(String),
}
