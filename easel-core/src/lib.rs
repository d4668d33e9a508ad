//! # Easel Core
//!
//! Core canvas editor logic: an infinite, panable, zoomable 2D surface on
//! which rectangular, text, image, and frame elements are placed, moved,
//! resized, grouped, and exported.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                easel-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Viewport        │  Scene (element store)   │
//! │  - screen↔world  │  - z-order, reparenting  │
//! │  - zoom-about    │  - typed commands        │
//! ├─────────────────────────────────────────────┤
//! │  EditorEngine    │  Selection               │
//! │  - gesture FSM   │  - marquee hits          │
//! │  - containment   │  - group bounds          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Pointer events flow screen → world through the [`Viewport`], the
//! [`EditorEngine`] state machine decides the action for the active tool,
//! and mutations land in the [`Scene`]. Rasterized export lives in the
//! `easel-raster` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod document;
pub mod element;
pub mod error;
pub mod geom;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod viewport;

pub use command::Command;
pub use document::{SceneDocument, SCENE_DOCUMENT_VERSION};
pub use element::{Element, ElementId, ElementKind, Style, TextAlign};
pub use error::{EditorError, EditorResult};
pub use geom::{Point, Rect};
pub use interaction::{
    CreateKind, EditorEngine, Interaction, Modifiers, ResizeHandle, Tool, MIN_MARQUEE_SIZE,
};
pub use scene::{ReorderDirection, Scene, MIN_CREATE_SIZE, MIN_RESIZE_SIZE};
pub use selection::Selection;
pub use viewport::{Viewport, MAX_ZOOM, MIN_ZOOM};

/// Easel core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
