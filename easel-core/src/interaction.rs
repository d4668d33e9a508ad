//! Gesture state machine.
//!
//! One [`EditorEngine`] exists per editor session. Pointer events arrive in
//! screen coordinates, are mapped through the viewport, and drive the scene,
//! selection, and frame containment. Exactly one [`Interaction`] variant is
//! active at any time; each variant owns the data its gesture needs, and all
//! of it is dropped atomically when the gesture resolves to `Idle`.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::element::{Element, ElementId, ElementKind};
use crate::geom::{Point, Rect};
use crate::scene::{Scene, MIN_CREATE_SIZE};
use crate::selection::Selection;
use crate::viewport::Viewport;

/// Marquee rectangles at or below this size leave the selection untouched.
pub const MIN_MARQUEE_SIZE: f32 = 5.0;

/// The active tool. Gates what a pointer-down begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, drag, and marquee.
    #[default]
    Select,
    /// Pan the viewport.
    Hand,
    /// Draw a new rectangle.
    Rectangle,
    /// Draw a new text box.
    Text,
    /// Draw a new frame.
    Frame,
}

/// Element kinds the creation tools produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateKind {
    /// A rectangle element.
    Rectangle,
    /// A text element with default typography.
    Text,
    /// An empty frame.
    Frame,
}

impl CreateKind {
    fn into_element_kind(self) -> ElementKind {
        match self {
            Self::Rectangle => ElementKind::Rectangle,
            Self::Text => ElementKind::text(""),
            Self::Frame => ElementKind::Frame {
                children: Vec::new(),
            },
        }
    }
}

/// Resize handle identifiers. Each handle fixes the opposite edge(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top-left corner.
    NorthWest,
    /// Top edge.
    North,
    /// Top-right corner.
    NorthEast,
    /// Right edge.
    East,
    /// Bottom-right corner.
    SouthEast,
    /// Bottom edge.
    South,
    /// Bottom-left corner.
    SouthWest,
    /// Left edge.
    West,
}

impl ResizeHandle {
    /// Recompute bounds from the current pointer position (in the element's
    /// parent-local space). Corner handles move two dimensions and the
    /// anchor corner; edge handles move one dimension (and the anchor for
    /// north/west).
    #[must_use]
    pub fn apply(self, current: Rect, p: Point) -> Rect {
        let right = current.right();
        let bottom = current.bottom();
        let mut out = current;
        if matches!(self, Self::East | Self::NorthEast | Self::SouthEast) {
            out.width = p.x - current.x;
        }
        if matches!(self, Self::West | Self::NorthWest | Self::SouthWest) {
            out.x = p.x;
            out.width = right - p.x;
        }
        if matches!(self, Self::South | Self::SouthEast | Self::SouthWest) {
            out.height = p.y - current.y;
        }
        if matches!(self, Self::North | Self::NorthEast | Self::NorthWest) {
            out.y = p.y;
            out.height = bottom - p.y;
        }
        out
    }
}

/// Modifier keys accompanying a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift: additive selection.
    pub shift: bool,
    /// Control.
    pub ctrl: bool,
    /// Alt/Option.
    pub alt: bool,
    /// Meta/Command.
    pub meta: bool,
}

impl Modifiers {
    /// Shift-only modifiers.
    #[must_use]
    pub const fn shift() -> Self {
        Self {
            shift: true,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }
}

/// The gesture in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Interaction {
    /// No gesture.
    #[default]
    Idle,
    /// Hand-tool pan.
    Panning {
        /// Screen position at the last move.
        last_screen: Point,
    },
    /// Moving the selected elements.
    Dragging {
        /// World position at the last move. Deltas are incremental so a
        /// mid-drag reparent (which changes the coordinate basis) cannot
        /// introduce drift.
        last_world: Point,
    },
    /// Rubber-band selection.
    MarqueeSelecting {
        /// World position of the pointer-down.
        start: Point,
        /// Current normalized marquee rectangle.
        rect: Rect,
    },
    /// Drawing a new element.
    Creating {
        /// What the gesture will create.
        kind: CreateKind,
        /// World position of the pointer-down.
        start: Point,
        /// Current normalized preview rectangle.
        preview: Rect,
    },
    /// Resizing the single selected element by a handle.
    Resizing {
        /// The element being resized.
        id: ElementId,
        /// The active handle.
        handle: ResizeHandle,
    },
}

impl Interaction {
    /// Whether a gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// The canvas interaction engine: scene, viewport, selection, and the
/// gesture state machine, owned together as one explicitly constructed
/// instance.
#[derive(Debug, Clone, Default)]
pub struct EditorEngine {
    /// The element store.
    pub scene: Scene,
    /// Pan/zoom state.
    pub viewport: Viewport,
    /// Selected element IDs.
    pub selection: Selection,
    tool: Tool,
    interaction: Interaction,
    hover_frame: Option<ElementId>,
}

impl EditorEngine {
    /// Create an engine with an empty scene and default viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down to the initial state: empty scene, default viewport, no
    /// selection, no gesture.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The active tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch the active tool. An in-flight gesture keeps its own data and
    /// finishes under the tool that started it.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// The gesture in progress.
    #[must_use]
    pub const fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Frame currently hovered during a drag, if any.
    #[must_use]
    pub const fn hover_frame(&self) -> Option<ElementId> {
        self.hover_frame
    }

    /// Apply a typed scene command, keeping the selection consistent with
    /// the surviving elements.
    pub fn apply(&mut self, command: Command) -> Option<ElementId> {
        let result = self.scene.apply(command);
        self.selection.retain_existing(&self.scene);
        result
    }

    /// Delete the selected elements.
    pub fn delete_selected(&mut self) {
        let ids = self.selection.ids().to_vec();
        self.scene.remove(&ids);
        self.selection.retain_existing(&self.scene);
    }

    /// Zoom by a multiplicative factor about a screen anchor (mouse wheel).
    pub fn wheel_zoom(&mut self, anchor: Point, factor: f32) {
        self.viewport.zoom_by(anchor, factor);
    }

    /// Begin a pointer gesture. Ignored while another gesture is active: a
    /// second pointer-down resolves only after the first gesture ends.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        if self.interaction.is_active() {
            return;
        }

        match self.tool {
            Tool::Hand => {
                self.interaction = Interaction::Panning {
                    last_screen: screen,
                };
            }
            Tool::Select => {
                let world = self.viewport.screen_to_world(screen);
                if let Some(hit) = self.scene.element_at(world) {
                    if !self.selection.contains(hit) {
                        if modifiers.shift {
                            self.selection.add(hit);
                        } else {
                            self.selection.replace(vec![hit]);
                        }
                    }
                    self.interaction = Interaction::Dragging { last_world: world };
                } else {
                    if !modifiers.shift {
                        self.selection.clear();
                    }
                    self.interaction = Interaction::MarqueeSelecting {
                        start: world,
                        rect: Rect::new(world.x, world.y, 0.0, 0.0),
                    };
                }
            }
            Tool::Rectangle => self.begin_create(CreateKind::Rectangle, screen),
            Tool::Text => self.begin_create(CreateKind::Text, screen),
            Tool::Frame => self.begin_create(CreateKind::Frame, screen),
        }
    }

    fn begin_create(&mut self, kind: CreateKind, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        self.interaction = Interaction::Creating {
            kind,
            start: world,
            preview: Rect::new(world.x, world.y, 0.0, 0.0),
        };
    }

    /// Begin resizing the single selected element by the given handle.
    /// Ignored unless exactly one element is selected and no gesture is
    /// active.
    pub fn begin_resize(&mut self, handle: ResizeHandle) {
        if self.interaction.is_active() || self.selection.len() != 1 {
            return;
        }
        let id = self.selection.ids()[0];
        if self.scene.contains(id) {
            self.interaction = Interaction::Resizing { id, handle };
        }
    }

    /// Advance the active gesture to a new pointer position.
    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        match self.interaction {
            Interaction::Idle => {}
            Interaction::Panning { last_screen } => {
                self.interaction = Interaction::Panning {
                    last_screen: screen,
                };
                self.viewport
                    .pan(screen.x - last_screen.x, screen.y - last_screen.y);
            }
            Interaction::Dragging { last_world } => {
                // Incremental delta: the recorded point advances every move,
                // so reparenting (which rebases x/y) never double-applies.
                let dx = world.x - last_world.x;
                let dy = world.y - last_world.y;
                self.interaction = Interaction::Dragging { last_world: world };
                self.scene.translate(self.selection.ids(), dx, dy);
                self.update_hover_frame(world);
            }
            Interaction::MarqueeSelecting { start, .. } => {
                self.interaction = Interaction::MarqueeSelecting {
                    start,
                    rect: Rect::from_corners(start, world),
                };
            }
            Interaction::Creating { kind, start, .. } => {
                self.interaction = Interaction::Creating {
                    kind,
                    start,
                    preview: Rect::from_corners(start, world),
                };
            }
            Interaction::Resizing { id, handle } => {
                let Some(element) = self.scene.get(id) else {
                    return;
                };
                let parent_origin = element
                    .parent
                    .and_then(|p| self.scene.world_position(p))
                    .unwrap_or(Point::ZERO);
                let local = Point::new(world.x - parent_origin.x, world.y - parent_origin.y);
                let bounds = handle.apply(element.bounds(), local);
                // Below the floor the store drops the update; the gesture
                // continues from the unchanged bounds.
                self.scene.resize(id, bounds);
            }
        }
    }

    /// Frame containment while dragging a single non-frame element: reparent
    /// into the topmost frame under the pointer the moment the hover target
    /// changes, or back to top level when no frame contains the pointer.
    fn update_hover_frame(&mut self, world: Point) {
        if self.selection.len() != 1 {
            return;
        }
        let id = self.selection.ids()[0];
        let is_frame = self.scene.get(id).is_some_and(|e| e.kind.is_frame());
        if is_frame {
            return;
        }

        // Reparent against the element's actual parent, not the last hover
        // target: a drag can start with the pointer already outside the
        // current frame, and the store no-ops when nothing changes.
        let target = self.scene.frame_at(world, &[id]);
        self.scene.reparent(id, target);
        self.hover_frame = target;
    }

    /// Finish the active gesture.
    pub fn pointer_up(&mut self, screen: Point, modifiers: Modifiers) {
        let world = self.viewport.screen_to_world(screen);
        let finished = std::mem::take(&mut self.interaction);
        match finished {
            Interaction::Idle | Interaction::Panning { .. } | Interaction::Resizing { .. } => {}
            Interaction::Dragging { .. } => {
                self.hover_frame = None;
            }
            Interaction::MarqueeSelecting { start, .. } => {
                let rect = Rect::from_corners(start, world);
                if rect.width > MIN_MARQUEE_SIZE && rect.height > MIN_MARQUEE_SIZE {
                    let hits = Selection::marquee_hits(&self.scene, &rect);
                    if modifiers.shift {
                        for hit in hits {
                            self.selection.add(hit);
                        }
                    } else {
                        self.selection.replace(hits);
                    }
                }
            }
            Interaction::Creating { kind, start, .. } => {
                let preview = Rect::from_corners(start, world);
                if preview.width >= MIN_CREATE_SIZE && preview.height >= MIN_CREATE_SIZE {
                    let element =
                        Element::new(kind.into_element_kind()).with_bounds(preview);
                    let id = self.scene.add(element);
                    self.selection.replace(vec![id]);
                    self.tool = Tool::Select;
                    tracing::debug!("Created {kind:?} element {id}");
                }
            }
        }
    }
}
