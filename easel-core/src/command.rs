//! Typed mutation commands.
//!
//! Every store mutation is a named command with a fully typed payload, so
//! the UI layer drives the scene through a closed, serializable surface
//! instead of open-ended partial patches.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, Style};
use crate::geom::Rect;
use crate::scene::{ReorderDirection, Scene};

/// A single scene mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum Command {
    /// Add a new element (z-index assigned by the store).
    AddElement {
        /// The element to add.
        element: Element,
    },
    /// Delete elements and their frame descendants.
    DeleteElements {
        /// The element IDs to delete.
        ids: Vec<ElementId>,
    },
    /// Translate elements by a delta.
    MoveElements {
        /// The element IDs to move.
        ids: Vec<ElementId>,
        /// X delta in world units.
        dx: f32,
        /// Y delta in world units.
        dy: f32,
    },
    /// Replace an element's bounds (subject to the resize floor).
    ResizeElement {
        /// The element ID to resize.
        id: ElementId,
        /// New x/y/width/height.
        bounds: Rect,
    },
    /// Change z-order within the element's sibling scope.
    ReorderElement {
        /// The element ID to reorder.
        id: ElementId,
        /// Which way to move it.
        direction: ReorderDirection,
    },
    /// Move an element into a frame, or to top level with `None`.
    ReparentElement {
        /// The element ID to reparent.
        id: ElementId,
        /// Destination frame, if any.
        parent: Option<ElementId>,
    },
    /// Replace an element's style.
    SetStyle {
        /// The element ID to restyle.
        id: ElementId,
        /// The new style.
        style: Style,
    },
    /// Set or clear an element's display name.
    RenameElement {
        /// The element ID to rename.
        id: ElementId,
        /// New name, or `None` to clear.
        name: Option<String>,
    },
}

impl Scene {
    /// Apply a command. Returns the new element's ID for
    /// [`Command::AddElement`], `None` otherwise.
    ///
    /// Commands referencing nonexistent ids are no-ops, matching the
    /// underlying store operations.
    pub fn apply(&mut self, command: Command) -> Option<ElementId> {
        match command {
            Command::AddElement { element } => Some(self.add(element)),
            Command::DeleteElements { ids } => {
                self.remove(&ids);
                None
            }
            Command::MoveElements { ids, dx, dy } => {
                self.translate(&ids, dx, dy);
                None
            }
            Command::ResizeElement { id, bounds } => {
                self.resize(id, bounds);
                None
            }
            Command::ReorderElement { id, direction } => {
                self.reorder(id, direction);
                None
            }
            Command::ReparentElement { id, parent } => {
                self.reparent(id, parent);
                None
            }
            Command::SetStyle { id, style } => {
                self.set_style(id, style);
                None
            }
            Command::RenameElement { id, name } => {
                self.rename(id, name);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn test_apply_add_then_move() {
        let mut scene = Scene::new();
        let element =
            Element::new(ElementKind::Rectangle).with_bounds(Rect::new(0.0, 0.0, 50.0, 50.0));
        let id = scene
            .apply(Command::AddElement { element })
            .expect("add returns id");

        scene.apply(Command::MoveElements {
            ids: vec![id],
            dx: 15.0,
            dy: -5.0,
        });
        let el = scene.get(id).expect("exists");
        assert!((el.x - 15.0).abs() < f32::EPSILON);
        assert!((el.y + 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_command_json_roundtrip() {
        let command = Command::ResizeElement {
            id: ElementId::new(),
            bounds: Rect::new(1.0, 2.0, 30.0, 40.0),
        };
        let json = serde_json::to_string(&command).expect("serialize");
        let back: Command = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(command, back);
    }

    #[test]
    fn test_apply_delete_clears_elements() {
        let mut scene = Scene::new();
        let id = scene.add(Element::new(ElementKind::Rectangle));
        scene.apply(Command::DeleteElements { ids: vec![id] });
        assert!(scene.is_empty());
    }
}
