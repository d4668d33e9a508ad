//! Canvas elements - the building blocks of scenes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{Point, Rect};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal alignment for text content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Anchor each line at the left edge.
    #[default]
    Left,
    /// Anchor each line at the horizontal center.
    Center,
    /// Anchor each line at the right edge.
    Right,
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ElementKind {
    /// A plain rectangle.
    Rectangle,

    /// An ellipse inscribed in the element bounds.
    Ellipse,

    /// A text box.
    Text {
        /// Text content. May contain explicit newlines.
        content: String,
        /// Font size in world units.
        font_size: f32,
        /// Font family name.
        font_family: String,
        /// Horizontal alignment of wrapped lines.
        align: TextAlign,
        /// Optional background fill as hex color.
        background: Option<String>,
    },

    /// An image referenced by source URI (file path, URL, or data URI).
    Image {
        /// Image source reference.
        src: String,
    },

    /// A container frame that owns child elements and clips their rendering.
    Frame {
        /// Child element IDs. Kept consistent with the children's `parent`
        /// back-references by [`crate::Scene::reparent`].
        children: Vec<ElementId>,
    },
}

impl ElementKind {
    /// Default text kind used by the text creation tool.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            font_size: 16.0,
            font_family: "sans-serif".to_string(),
            align: TextAlign::Left,
            background: None,
        }
    }

    /// Short lowercase name for display and filenames.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Frame { .. } => "frame",
        }
    }

    /// Whether this is a frame (container) kind.
    #[must_use]
    pub const fn is_frame(&self) -> bool {
        matches!(self, Self::Frame { .. })
    }
}

/// Visual styling shared by all element kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color as hex.
    pub fill: String,
    /// Stroke color as hex.
    pub stroke: String,
    /// Stroke width in world units.
    pub stroke_width: f32,
    /// Corner radius in world units. Capped at half the smaller dimension
    /// when painted.
    pub corner_radius: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: "#ffffff".to_string(),
            stroke: "#1a1a1a".to_string(),
            stroke_width: 1.0,
            corner_radius: 0.0,
        }
    }
}

/// A canvas element.
///
/// When `parent` is set, `x`/`y` are relative to the parent frame's origin;
/// otherwise they are world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Optional user-facing name (used for export filenames).
    pub name: Option<String>,
    /// Element content type.
    pub kind: ElementKind,
    /// X position (parent-relative when parented).
    pub x: f32,
    /// Y position (parent-relative when parented).
    pub y: f32,
    /// Width in world units, non-negative.
    pub width: f32,
    /// Height in world units, non-negative.
    pub height: f32,
    /// Rotation in degrees about the element's own center.
    pub rotation: f32,
    /// Paint and hit-test order within the sibling scope.
    pub z_index: i32,
    /// Visual styling.
    pub style: Style,
    /// Owning frame, if any.
    pub parent: Option<ElementId>,
}

impl Element {
    /// Create a new element with the given kind and default geometry.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            name: None,
            kind,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
            style: Style::default(),
            parent: None,
        }
    }

    /// Set position and size.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Local bounds (parent-relative when parented).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Check if a local-space point is within this element.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Child IDs for frames, empty slice otherwise.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Frame { children } => children,
            _ => &[],
        }
    }
}
