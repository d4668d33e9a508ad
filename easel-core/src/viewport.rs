//! Viewport transform between screen and world coordinates.

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Default minimum zoom factor.
pub const MIN_ZOOM: f32 = 0.1;

/// Default maximum zoom factor.
pub const MAX_ZOOM: f32 = 5.0;

/// The current visible window onto world space: pan offset plus zoom factor.
///
/// `world = (screen - offset) / zoom`, and the exact inverse for the other
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset X in screen units.
    pub x: f32,
    /// Pan offset Y in screen units.
    pub y: f32,
    /// Zoom factor, always within `[min_zoom, max_zoom]`.
    pub zoom: f32,
    /// Lower zoom clamp.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    /// Upper zoom clamp.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
}

const fn default_min_zoom() -> f32 {
    MIN_ZOOM
}

const fn default_max_zoom() -> f32 {
    MAX_ZOOM
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    /// Create a viewport at the origin with the given zoom (clamped).
    #[must_use]
    pub fn new(zoom: f32) -> Self {
        let mut vp = Self::default();
        vp.set_zoom(zoom);
        vp
    }

    /// Convert a screen-space point to world space.
    #[must_use]
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.zoom, (p.y - self.y) / self.zoom)
    }

    /// Convert a world-space point to screen space. Exact inverse of
    /// [`Self::screen_to_world`].
    #[must_use]
    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.x, p.y * self.zoom + self.y)
    }

    /// Pan by a delta in screen units.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Set the zoom factor, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom to `new_zoom` keeping the world point under `anchor` (a screen
    /// point) stationary.
    ///
    /// The offset is recomputed as
    /// `anchor - (anchor - offset) * (new_zoom / old_zoom)`.
    pub fn zoom_about(&mut self, anchor: Point, new_zoom: f32) {
        let new_zoom = new_zoom.clamp(self.min_zoom, self.max_zoom);
        let ratio = new_zoom / self.zoom;
        self.x = anchor.x - (anchor.x - self.x) * ratio;
        self.y = anchor.y - (anchor.y - self.y) * ratio;
        self.zoom = new_zoom;
    }

    /// Multiply the current zoom by `factor`, anchored at a screen point.
    pub fn zoom_by(&mut self, anchor: Point, factor: f32) {
        self.zoom_about(anchor, self.zoom * factor);
    }

    /// Reset pan and zoom to defaults.
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.zoom = 1.0;
    }
}
