//! Scene graph: the authoritative element store.
//!
//! Owns all elements, their z-order, and every mutation (create, move,
//! resize, reorder, reparent, delete). Mutations referencing a nonexistent
//! id are no-ops, never errors; the UI layer may hold stale references for a
//! frame or two.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementKind};
use crate::geom::{Point, Rect};

/// Minimum width/height an interactive resize may produce.
pub const MIN_RESIZE_SIZE: f32 = 20.0;

/// Minimum width/height the creation gesture may commit.
pub const MIN_CREATE_SIZE: f32 = 10.0;

/// Direction for a z-order change within a sibling scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Swap with the next sibling above.
    Forward,
    /// Swap with the next sibling below.
    Backward,
    /// Move above all siblings.
    Front,
    /// Move below all siblings.
    Back,
}

/// A scene containing all canvas elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// All elements, indexed by ID.
    elements: HashMap<ElementId, Element>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a scene from a flat element list (programmatic import).
    ///
    /// Frame child lists are reconciled against the `parent` back-references
    /// so the bidirectional invariant holds even for hand-edited documents:
    /// dangling child ids are dropped, orphaned `parent` references cleared,
    /// and unlisted children appended in z order.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        let mut scene = Self {
            elements: elements.into_iter().map(|e| (e.id, e)).collect(),
        };
        scene.reconcile_links();
        scene
    }

    fn reconcile_links(&mut self) {
        let frame_ids: HashSet<ElementId> = self
            .elements
            .values()
            .filter(|e| e.kind.is_frame())
            .map(|e| e.id)
            .collect();

        // Clear parent references that do not point at a live frame.
        for element in self.elements.values_mut() {
            if let Some(parent) = element.parent {
                if !frame_ids.contains(&parent) {
                    tracing::warn!("Dropping dangling parent reference on {}", element.id);
                    element.parent = None;
                }
            }
        }

        // Membership per frame, derived from the back-references.
        let mut members: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
        for element in self.elements.values() {
            if let Some(parent) = element.parent {
                members.entry(parent).or_default().push(element.id);
            }
        }
        for ids in members.values_mut() {
            ids.sort_by_key(|id| self.elements[id].z_index);
        }

        for frame_id in frame_ids {
            let mut expected = members.remove(&frame_id).unwrap_or_default();
            let Some(frame) = self.elements.get_mut(&frame_id) else {
                continue;
            };
            if let ElementKind::Frame { children } = &mut frame.kind {
                children.retain(|id| expected.contains(id));
                expected.retain(|id| !children.contains(id));
                children.extend(expected);
            }
        }
    }

    /// Add an element, assigning it a z-index above every existing element.
    ///
    /// A preset `parent` is honored when it names a live frame (the element
    /// joins that frame's child list atomically); otherwise it is cleared.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        let id = element.id;
        element.z_index = self.next_z_index();

        let parent = element.parent.take();
        self.elements.insert(id, element);

        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        id
    }

    fn next_z_index(&self) -> i32 {
        self.elements
            .values()
            .map(|e| e.z_index)
            .max()
            .unwrap_or(0)
            .max(0)
            + 1
    }

    /// Delete elements (and, for frames, their descendants), stripping them
    /// from any parent's child list.
    pub fn remove(&mut self, ids: &[ElementId]) {
        let mut doomed: HashSet<ElementId> = HashSet::new();
        let mut stack: Vec<ElementId> = ids.to_vec();
        while let Some(id) = stack.pop() {
            if !doomed.insert(id) {
                continue;
            }
            if let Some(element) = self.elements.get(&id) {
                stack.extend_from_slice(element.children());
            }
        }

        self.elements.retain(|id, _| !doomed.contains(id));
        for element in self.elements.values_mut() {
            if let ElementKind::Frame { children } = &mut element.kind {
                children.retain(|id| !doomed.contains(id));
            }
        }
    }

    /// Translate elements by a delta, independent of their coordinate basis.
    pub fn translate(&mut self, ids: &[ElementId], dx: f32, dy: f32) {
        for id in ids {
            if let Some(element) = self.elements.get_mut(id) {
                element.x += dx;
                element.y += dy;
            }
        }
    }

    /// Replace an element's x/y/width/height.
    ///
    /// Rejected (no-op) when either resulting dimension is below
    /// [`MIN_RESIZE_SIZE`].
    pub fn resize(&mut self, id: ElementId, bounds: Rect) {
        if bounds.width < MIN_RESIZE_SIZE || bounds.height < MIN_RESIZE_SIZE {
            return;
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.x = bounds.x;
            element.y = bounds.y;
            element.width = bounds.width;
            element.height = bounds.height;
        }
    }

    /// Replace an element's style.
    pub fn set_style(&mut self, id: ElementId, style: crate::element::Style) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.style = style;
        }
    }

    /// Set or clear an element's display name.
    pub fn rename(&mut self, id: ElementId, name: Option<String>) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.name = name;
        }
    }

    /// Change an element's z-order within its sibling scope.
    ///
    /// Forward/backward swap z with the adjacent sibling by current z rank;
    /// front/back move past the extremum. Never crosses sibling scopes.
    pub fn reorder(&mut self, id: ElementId, direction: ReorderDirection) {
        let Some(scope) = self.elements.get(&id).map(|e| e.parent) else {
            return;
        };
        let siblings = self.children_sorted(scope);
        let Some(rank) = siblings.iter().position(|sid| *sid == id) else {
            return;
        };

        match direction {
            ReorderDirection::Forward => {
                if rank + 1 < siblings.len() {
                    self.swap_z(id, siblings[rank + 1]);
                }
            }
            ReorderDirection::Backward => {
                if rank > 0 {
                    self.swap_z(id, siblings[rank - 1]);
                }
            }
            ReorderDirection::Front => {
                if rank + 1 < siblings.len() {
                    let top = siblings
                        .last()
                        .and_then(|sid| self.elements.get(sid))
                        .map_or(0, |e| e.z_index);
                    if let Some(element) = self.elements.get_mut(&id) {
                        element.z_index = top + 1;
                    }
                }
            }
            ReorderDirection::Back => {
                if rank > 0 {
                    let bottom = siblings
                        .first()
                        .and_then(|sid| self.elements.get(sid))
                        .map_or(0, |e| e.z_index);
                    if let Some(element) = self.elements.get_mut(&id) {
                        element.z_index = bottom - 1;
                    }
                }
            }
        }
    }

    fn swap_z(&mut self, a: ElementId, b: ElementId) {
        let (Some(za), Some(zb)) = (
            self.elements.get(&a).map(|e| e.z_index),
            self.elements.get(&b).map(|e| e.z_index),
        ) else {
            return;
        };
        if let Some(element) = self.elements.get_mut(&a) {
            element.z_index = zb;
        }
        if let Some(element) = self.elements.get_mut(&b) {
            element.z_index = za;
        }
    }

    /// Move an element into a frame (or to top level with `None`),
    /// atomically updating both the `parent` back-reference and the frames'
    /// child lists.
    ///
    /// The element's world position is preserved by rebasing its x/y, and it
    /// receives the top z-index of its new sibling scope. No-ops: unknown
    /// id, non-frame target, the current parent, the element itself, or any
    /// of its own descendants.
    pub fn reparent(&mut self, id: ElementId, new_parent: Option<ElementId>) {
        let Some(current_parent) = self.elements.get(&id).map(|e| e.parent) else {
            return;
        };
        if new_parent == current_parent {
            return;
        }
        if let Some(parent_id) = new_parent {
            let target_is_frame = self
                .elements
                .get(&parent_id)
                .is_some_and(|e| e.kind.is_frame());
            if !target_is_frame || parent_id == id || self.is_descendant(parent_id, id) {
                return;
            }
        }

        let world = self.world_position(id).unwrap_or(Point::ZERO);
        let parent_origin = new_parent
            .and_then(|p| self.world_position(p))
            .unwrap_or(Point::ZERO);

        if let Some(old) = current_parent {
            if let Some(ElementKind::Frame { children }) =
                self.elements.get_mut(&old).map(|e| &mut e.kind)
            {
                children.retain(|cid| *cid != id);
            }
        }

        let top_z = self
            .children_sorted(new_parent)
            .last()
            .map_or(0, |sid| self.elements[sid].z_index);

        if let Some(element) = self.elements.get_mut(&id) {
            element.parent = new_parent;
            element.x = world.x - parent_origin.x;
            element.y = world.y - parent_origin.y;
            element.z_index = top_z + 1;
        }

        if let Some(parent_id) = new_parent {
            if let Some(ElementKind::Frame { children }) =
                self.elements.get_mut(&parent_id).map(|e| &mut e.kind)
            {
                children.push(id);
            }
        }

        tracing::debug!("Reparented {id} into {new_parent:?}");
    }

    fn attach(&mut self, id: ElementId, parent: ElementId) {
        let parent_is_frame = self
            .elements
            .get(&parent)
            .is_some_and(|e| e.kind.is_frame());
        if !parent_is_frame {
            return;
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.parent = Some(parent);
        }
        if let Some(ElementKind::Frame { children }) =
            self.elements.get_mut(&parent).map(|e| &mut e.kind)
        {
            if !children.contains(&id) {
                children.push(id);
            }
        }
    }

    /// Whether `id` sits below `ancestor` in the frame hierarchy.
    #[must_use]
    pub fn is_descendant(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.elements.get(&id).and_then(|e| e.parent);
        let mut hops = 0;
        while let Some(pid) = current {
            if pid == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.elements.len() {
                break;
            }
            current = self.elements.get(&pid).and_then(|e| e.parent);
        }
        false
    }

    /// Resolved world position: the element's x/y plus all ancestor offsets.
    #[must_use]
    pub fn world_position(&self, id: ElementId) -> Option<Point> {
        let mut element = self.elements.get(&id)?;
        let mut x = element.x;
        let mut y = element.y;
        let mut hops = 0;
        while let Some(parent) = element.parent {
            element = self.elements.get(&parent)?;
            x += element.x;
            y += element.y;
            hops += 1;
            if hops > self.elements.len() {
                break;
            }
        }
        Some(Point::new(x, y))
    }

    /// World-space rectangle of an element.
    #[must_use]
    pub fn world_bounds(&self, id: ElementId) -> Option<Rect> {
        let element = self.elements.get(&id)?;
        let origin = self.world_position(id)?;
        Some(Rect::new(origin.x, origin.y, element.width, element.height))
    }

    /// IDs in the given sibling scope (`None` = top level), ascending z.
    #[must_use]
    pub fn children_sorted(&self, scope: Option<ElementId>) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| e.parent == scope)
            .map(|e| e.id)
            .collect();
        ids.sort_by_key(|id| self.elements[id].z_index);
        ids
    }

    /// All IDs in paint order: siblings ascending z, each frame's children
    /// painted immediately above the frame itself.
    #[must_use]
    pub fn paint_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.elements.len());
        for id in self.children_sorted(None) {
            self.push_subtree(id, &mut out);
        }
        out
    }

    fn push_subtree(&self, id: ElementId, out: &mut Vec<ElementId>) {
        out.push(id);
        for child in self.children_sorted(Some(id)) {
            self.push_subtree(child, out);
        }
    }

    /// Topmost element whose world bounds contain the point.
    #[must_use]
    pub fn element_at(&self, world: Point) -> Option<ElementId> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|id| self.world_bounds(*id).is_some_and(|b| b.contains(world)))
    }

    /// Topmost frame (descending z) containing the point, skipping the
    /// excluded ids. Used for drag containment.
    #[must_use]
    pub fn frame_at(&self, world: Point, excluded: &[ElementId]) -> Option<ElementId> {
        let mut frames: Vec<&Element> = self
            .elements
            .values()
            .filter(|e| e.kind.is_frame() && !excluded.contains(&e.id))
            .collect();
        frames.sort_by_key(|e| std::cmp::Reverse(e.z_index));
        frames
            .into_iter()
            .find(|e| {
                self.world_bounds(e.id)
                    .is_some_and(|bounds| bounds.contains(world))
            })
            .map(|e| e.id)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Whether the element exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Iterate over all elements (arbitrary order).
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the scene has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
