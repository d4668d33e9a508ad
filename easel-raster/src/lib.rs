//! # Easel Raster
//!
//! Rasterized export for `easel-core` scenes. A frame subtree is walked in
//! paint order against the [`Painter`] trait, producing an SVG
//! intermediate that is rasterized with resvg onto a tiny-skia surface and
//! encoded as PNG.
//!
//! ```text
//! Scene ──paint_subtree──▶ Painter (SvgPainter) ──▶ SVG
//!                                                    │ resvg + tiny-skia
//!                                                    ▼
//!                                         ExportedImage (PNG bytes)
//! ```
//!
//! The painter seam exists so tests can swap in [`RecordingPainter`] and
//! assert on the traversal without touching a rendering backend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod images;
pub mod painter;
pub mod text;

pub use error::{RenderError, RenderResult};
pub use export::{
    export_element, paint_subtree, rasterize, sanitize_filename, ExportConfig, ExportedImage,
};
pub use images::{encode_data_uri, resolve_images, resolve_source, ResolvedImages};
pub use painter::{PaintOp, Painter, RecordingPainter, Rotation, SvgPainter, TextFont};
pub use text::wrap_text;
