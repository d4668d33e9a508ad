//! Resolution of image element sources into embeddable data URIs.
//!
//! All sources under an export root are resolved up front so the paint
//! traversal itself stays synchronous. A source that fails to load maps to
//! `None` and the traversal paints a placeholder in its place.

use std::collections::HashMap;

use base64::Engine;
use easel_core::{ElementId, ElementKind, Scene};
use tracing::warn;

use crate::error::{RenderError, RenderResult};

/// Resolved image sources keyed by the original `src` string. `None` means
/// the source could not be loaded.
pub type ResolvedImages = HashMap<String, Option<String>>;

/// Resolve every image source in the subtree rooted at `root` to a data
/// URI. Failures are logged and recorded as `None` rather than aborting
/// the export.
pub async fn resolve_images(scene: &Scene, root: ElementId) -> ResolvedImages {
    let mut resolved = ResolvedImages::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(element) = scene.get(id) else {
            continue;
        };
        if let ElementKind::Image { src } = &element.kind {
            if !resolved.contains_key(src) {
                let uri = match resolve_source(src).await {
                    Ok(uri) => Some(uri),
                    Err(err) => {
                        warn!(src = %src, error = %err, "image source failed to resolve");
                        None
                    }
                };
                resolved.insert(src.clone(), uri);
            }
        }
        stack.extend(element.children());
    }
    resolved
}

/// Resolve one source to a data URI. Data URIs pass through unchanged,
/// `http(s)` sources are fetched, anything else is read as a local path.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] when the fetch or read fails, or the
/// bytes are not a recognized image format.
pub async fn resolve_source(src: &str) -> RenderResult<String> {
    if src.starts_with("data:") {
        return Ok(src.to_string());
    }
    let bytes = if src.starts_with("http://") || src.starts_with("https://") {
        let response = reqwest::get(src)
            .await
            .map_err(|e| RenderError::Resource(format!("{src}: {e}")))?;
        if !response.status().is_success() {
            return Err(RenderError::Resource(format!(
                "{src}: HTTP {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| RenderError::Resource(format!("{src}: {e}")))?
            .to_vec()
    } else {
        std::fs::read(src).map_err(|e| RenderError::Resource(format!("{src}: {e}")))?
    };
    encode_data_uri(&bytes)
}

/// Encode raw image bytes as a `data:` URI, sniffing the MIME type from
/// the content.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] when the bytes are not a recognized
/// image format.
pub fn encode_data_uri(bytes: &[u8]) -> RenderResult<String> {
    let format = image::guess_format(bytes)
        .map_err(|e| RenderError::Resource(format!("unrecognized image data: {e}")))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{encoded}", format.to_mime_type()))
}
