//! Selection tracking and marquee queries.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::geom::Rect;
use crate::scene::Scene;

/// An ordered set of selected element IDs.
///
/// Always a subset of the scene's live ids; callers run
/// [`Selection::retain_existing`] after deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected IDs in selection order.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Whether the ID is selected.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection.
    pub fn replace(&mut self, ids: Vec<ElementId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Add an ID (additive/shift mode). Duplicates are ignored.
    pub fn add(&mut self, id: ElementId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Toggle an ID's membership.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.ids.iter().position(|sid| *sid == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Select every element in the scene, in paint order.
    pub fn select_all(&mut self, scene: &Scene) {
        self.ids = scene.paint_order();
    }

    /// Drop ids that no longer exist in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.ids.retain(|id| scene.contains(*id));
    }

    /// IDs of elements whose world bounds intersect the marquee rectangle
    /// (half-open rule), in paint order.
    #[must_use]
    pub fn marquee_hits(scene: &Scene, marquee: &Rect) -> Vec<ElementId> {
        scene
            .paint_order()
            .into_iter()
            .filter(|id| {
                scene
                    .world_bounds(*id)
                    .is_some_and(|bounds| bounds.intersects(marquee))
            })
            .collect()
    }

    /// Union of the selected elements' world rectangles, for overlay UI.
    /// Derived, never stored.
    #[must_use]
    pub fn group_bounds(&self, scene: &Scene) -> Option<Rect> {
        self.ids
            .iter()
            .filter_map(|id| scene.world_bounds(*id))
            .reduce(|acc, r| acc.union(&r))
    }
}
