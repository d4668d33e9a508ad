//! Versioned scene documents for import/export of the whole editor state.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{EditorError, EditorResult};
use crate::interaction::EditorEngine;
use crate::scene::Scene;
use crate::viewport::Viewport;

/// Current scene document format version.
pub const SCENE_DOCUMENT_VERSION: &str = "1.0";

/// Canonical persisted scene: version tag, viewport, and the flat element
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version. Documents without one are rejected on import.
    pub version: String,
    /// Viewport pan/zoom at capture time.
    pub viewport: Viewport,
    /// Elements sorted by z-index for a stable on-disk order.
    pub elements: Vec<Element>,
}

impl SceneDocument {
    /// Capture a document from a scene and viewport.
    #[must_use]
    pub fn capture(scene: &Scene, viewport: &Viewport) -> Self {
        let mut elements: Vec<Element> = scene.elements().cloned().collect();
        elements.sort_by_key(|e| e.z_index);
        Self {
            version: SCENE_DOCUMENT_VERSION.to_string(),
            viewport: *viewport,
            elements,
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string(self).map_err(EditorError::Serialization)
    }

    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidDocument`] when the `version` field is
    /// absent (callers treat this as an import no-op), or a serialization
    /// error for malformed JSON.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("version").and_then(serde_json::Value::as_str).is_none() {
            return Err(EditorError::InvalidDocument(
                "missing version field".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(EditorError::Serialization)
    }
}

impl EditorEngine {
    /// Export the current scene and viewport as a document.
    #[must_use]
    pub fn export_document(&self) -> SceneDocument {
        SceneDocument::capture(&self.scene, &self.viewport)
    }

    /// Replace the live state wholesale from a document: elements and
    /// viewport are swapped in, the selection is cleared, and any gesture is
    /// reset.
    pub fn import_document(&mut self, document: SceneDocument) {
        let element_count = document.elements.len();
        self.reset();
        self.scene = Scene::from_elements(document.elements);
        self.viewport = document.viewport;
        tracing::info!("Imported scene document with {element_count} elements");
    }
}
