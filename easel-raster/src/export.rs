//! Frame export: paint traversal, rasterization, PNG encoding.

use std::time::{SystemTime, UNIX_EPOCH};

use easel_core::{Element, ElementId, ElementKind, Point, Rect, Scene};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::images::{resolve_images, ResolvedImages};
use crate::painter::{Painter, Rotation, SvgPainter, TextFont};
use crate::text::wrap_text;

/// Line height as a multiple of font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Export parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig {
    /// Output pixels per world unit.
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { scale: 2.0 }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// Suggested filename, `{name}_{timestamp}.png`.
    pub filename: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Export the frame `root` as a PNG.
///
/// The frame is painted at the origin of its own coordinate space, so the
/// output is independent of where the frame sits in the world and of the
/// current viewport. Image sources are resolved up front; sources that
/// fail to load render as placeholders.
///
/// # Errors
///
/// Returns [`RenderError::ElementNotFound`] when `root` is not in the
/// scene, [`RenderError::UnsupportedRoot`] when it is not a frame, and
/// rasterization errors when the SVG intermediate fails to parse, the
/// surface cannot be allocated, or PNG encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub async fn export_element(
    scene: &Scene,
    root: ElementId,
    config: &ExportConfig,
) -> RenderResult<ExportedImage> {
    let element = scene
        .get(root)
        .ok_or_else(|| RenderError::ElementNotFound(root.to_string()))?;
    if !element.kind.is_frame() {
        return Err(RenderError::UnsupportedRoot(
            element.kind.name().to_string(),
        ));
    }

    let images = resolve_images(scene, root).await;
    debug!(root = %root, images = images.len(), "resolved image sources");

    let mut painter = SvgPainter::new();
    paint_subtree(scene, root, &mut painter, &images)?;

    let width = (element.width * config.scale).round().max(1.0) as u32;
    let height = (element.height * config.scale).round().max(1.0) as u32;
    let svg = painter.finish(width, height, element.width, element.height);
    let png = rasterize(&svg, width, height)?;

    let stem = element
        .name
        .as_deref()
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| element.kind.name().to_string());
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let filename = format!("{stem}_{timestamp}.png");

    info!(root = %root, %filename, width, height, "exported frame");
    Ok(ExportedImage {
        png,
        filename,
        width,
        height,
    })
}

/// Paint the subtree rooted at `root` onto `painter`, with the root's
/// top-left corner at the painter's origin.
///
/// # Errors
///
/// Returns [`RenderError::ElementNotFound`] when `root` is missing.
pub fn paint_subtree<P: Painter>(
    scene: &Scene,
    root: ElementId,
    painter: &mut P,
    images: &ResolvedImages,
) -> RenderResult<()> {
    let element = scene
        .get(root)
        .ok_or_else(|| RenderError::ElementNotFound(root.to_string()))?;
    // The root paints in its own space, so its x/y are dropped.
    let rect = Rect::new(0.0, 0.0, element.width, element.height);
    paint_element(scene, element, rect, painter, images);
    Ok(())
}

/// Corner radius capped so opposite corners never overlap.
fn capped_radius(element: &Element, rect: Rect) -> f32 {
    element
        .style
        .corner_radius
        .min(rect.width.min(rect.height) / 2.0)
        .max(0.0)
}

fn rotation_for(element: &Element, rect: Rect) -> Option<Rotation> {
    if element.rotation == 0.0 {
        return None;
    }
    let c = rect.center();
    Some(Rotation {
        degrees: element.rotation,
        cx: c.x,
        cy: c.y,
    })
}

fn paint_element<P: Painter>(
    scene: &Scene,
    element: &Element,
    rect: Rect,
    painter: &mut P,
    images: &ResolvedImages,
) {
    let radius = capped_radius(element, rect);
    let rotation = rotation_for(element, rect);
    let style = &element.style;

    match &element.kind {
        ElementKind::Rectangle => {
            painter.fill_rounded_rect(rect, radius, rotation, &style.fill);
            if style.stroke_width > 0.0 {
                painter.stroke_rounded_rect(rect, radius, rotation, &style.stroke, style.stroke_width);
            }
        }
        ElementKind::Ellipse => {
            painter.fill_ellipse(rect, rotation, &style.fill);
            if style.stroke_width > 0.0 {
                painter.stroke_ellipse(rect, rotation, &style.stroke, style.stroke_width);
            }
        }
        ElementKind::Text {
            content,
            font_size,
            font_family,
            align,
            background,
        } => {
            if let Some(bg) = background {
                painter.fill_rounded_rect(rect, radius, rotation, bg);
            }
            let lines = wrap_text(content, rect.width, |s| painter.measure_text(s, *font_size));
            let anchor_x = match align {
                easel_core::TextAlign::Left => rect.x,
                easel_core::TextAlign::Center => rect.center().x,
                easel_core::TextAlign::Right => rect.right(),
            };
            let font = TextFont {
                family: font_family,
                size: *font_size,
            };
            for (i, line) in lines.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let baseline = rect.y + font_size + i as f32 * font_size * LINE_HEIGHT_FACTOR;
                painter.draw_text_line(anchor_x, baseline, line, &font, *align, &style.fill, rotation);
            }
        }
        ElementKind::Image { src } => match images.get(src) {
            Some(Some(uri)) => painter.draw_image(rect, radius, rotation, uri),
            _ => painter.draw_placeholder(rect, rotation),
        },
        ElementKind::Frame { .. } => {
            painter.fill_rounded_rect(rect, radius, rotation, &style.fill);
            painter.push_clip(rect, radius, rotation);
            let origin = Point::new(rect.x, rect.y);
            for child_id in scene.children_sorted(Some(element.id)) {
                if let Some(child) = scene.get(child_id) {
                    let child_rect = Rect::new(
                        origin.x + child.x,
                        origin.y + child.y,
                        child.width,
                        child.height,
                    );
                    paint_element(scene, child, child_rect, painter, images);
                }
            }
            painter.pop_clip();
            if style.stroke_width > 0.0 {
                painter.stroke_rounded_rect(rect, radius, rotation, &style.stroke, style.stroke_width);
            }
        }
    }
}

/// Rasterize the SVG intermediate into `width`×`height` PNG bytes.
///
/// # Errors
///
/// Returns [`RenderError::Svg`] on parse failure, [`RenderError::Surface`]
/// when the pixmap cannot be allocated, and [`RenderError::Encode`] on PNG
/// encoding failure.
pub fn rasterize(svg: &str, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Svg(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Surface(format!("cannot allocate {width}x{height} surface"))
    })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

/// Strip characters that are unsafe in filenames, trim whitespace, and cap
/// the length.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') && !c.is_control())
        .collect();
    cleaned.trim().chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painter::{PaintOp, RecordingPainter};
    use easel_core::{Element, Style, TextAlign};

    fn frame_with_children() -> (Scene, ElementId, ElementId, ElementId) {
        let mut scene = Scene::new();
        let frame = scene.add(
            Element::new(ElementKind::Frame {
                children: Vec::new(),
            })
            .with_bounds(Rect::new(300.0, 200.0, 200.0, 150.0)),
        );
        // World coordinates rebase to frame-local (10,10) and (30,30).
        let back = scene.add(
            Element::new(ElementKind::Rectangle).with_bounds(Rect::new(310.0, 210.0, 50.0, 50.0)),
        );
        let front = scene.add(
            Element::new(ElementKind::Ellipse).with_bounds(Rect::new(330.0, 230.0, 40.0, 40.0)),
        );
        scene.reparent(back, Some(frame));
        scene.reparent(front, Some(frame));
        (scene, frame, back, front)
    }

    #[test]
    fn test_root_painted_at_origin_children_offset() {
        let (scene, frame, ..) = frame_with_children();
        let mut painter = RecordingPainter::new();
        paint_subtree(&scene, frame, &mut painter, &ResolvedImages::new()).expect("paint");

        let PaintOp::FillRoundedRect { rect, .. } = &painter.ops[0] else {
            panic!("first op should fill the root");
        };
        assert_eq!(*rect, Rect::new(0.0, 0.0, 200.0, 150.0));
        // Children paint at their frame-local offsets.
        assert!(painter.ops.iter().any(|op| matches!(
            op,
            PaintOp::FillRoundedRect { rect, .. } if *rect == Rect::new(10.0, 10.0, 50.0, 50.0)
        )));
    }

    #[test]
    fn test_children_painted_in_z_order_inside_clip() {
        let (scene, frame, ..) = frame_with_children();
        let mut painter = RecordingPainter::new();
        paint_subtree(&scene, frame, &mut painter, &ResolvedImages::new()).expect("paint");

        let push = painter
            .ops
            .iter()
            .position(|op| matches!(op, PaintOp::PushClip { .. }))
            .expect("clip push");
        let pop = painter
            .ops
            .iter()
            .position(|op| matches!(op, PaintOp::PopClip))
            .expect("clip pop");
        let rect_fill = painter
            .ops
            .iter()
            .position(|op| {
                matches!(op, PaintOp::FillRoundedRect { rect, .. } if (rect.x - 10.0).abs() < 1e-4)
            })
            .expect("rect child");
        let ellipse_fill = painter
            .ops
            .iter()
            .position(|op| matches!(op, PaintOp::FillEllipse { .. }))
            .expect("ellipse child");

        assert!(push < rect_fill && rect_fill < ellipse_fill && ellipse_fill < pop);
    }

    #[test]
    fn test_text_wraps_and_anchors_center() {
        let mut scene = Scene::new();
        let frame = scene.add(
            Element::new(ElementKind::Frame {
                children: Vec::new(),
            })
            .with_bounds(Rect::new(0.0, 0.0, 300.0, 200.0)),
        );
        let text = scene.add(
            Element::new(ElementKind::Text {
                content: "abcdefghij".to_string(),
                font_size: 10.0,
                font_family: "sans-serif".to_string(),
                align: TextAlign::Center,
                background: None,
            })
            .with_bounds(Rect::new(20.0, 20.0, 32.0, 60.0)),
        );
        scene.reparent(text, Some(frame));

        let mut painter = RecordingPainter::new();
        paint_subtree(&scene, frame, &mut painter, &ResolvedImages::new()).expect("paint");

        // 0.6 em per char at size 10 over a 32-wide box wraps every 5 chars.
        let lines: Vec<_> = painter
            .ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::TextLine {
                    text,
                    anchor_x,
                    baseline_y,
                    align,
                } => Some((text.clone(), *anchor_x, *baseline_y, *align)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, "abcde");
        assert_eq!(lines[1].0, "fghij");
        assert!((lines[0].1 - 36.0).abs() < 1e-4); // box center
        assert!((lines[0].2 - 30.0).abs() < 1e-4); // y + font_size
        assert!((lines[1].2 - 42.0).abs() < 1e-4); // + 1.2 em
        assert_eq!(lines[0].3, TextAlign::Center);
    }

    #[test]
    fn test_unresolved_image_paints_placeholder() {
        let mut scene = Scene::new();
        let frame = scene.add(
            Element::new(ElementKind::Frame {
                children: Vec::new(),
            })
            .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        let img = scene.add(
            Element::new(ElementKind::Image {
                src: "missing.png".to_string(),
            })
            .with_bounds(Rect::new(10.0, 10.0, 40.0, 40.0)),
        );
        scene.reparent(img, Some(frame));

        let mut painter = RecordingPainter::new();
        paint_subtree(&scene, frame, &mut painter, &ResolvedImages::new()).expect("paint");
        assert!(painter
            .ops
            .iter()
            .any(|op| matches!(op, PaintOp::Placeholder { .. })));
    }

    #[test]
    fn test_radius_capped_at_half_min_dimension() {
        let mut scene = Scene::new();
        let frame = scene.add(
            Element::new(ElementKind::Frame {
                children: Vec::new(),
            })
            .with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        let rect = scene.add(
            Element::new(ElementKind::Rectangle)
                .with_bounds(Rect::new(0.0, 0.0, 60.0, 20.0))
                .with_style(Style {
                    corner_radius: 500.0,
                    ..Style::default()
                }),
        );
        scene.reparent(rect, Some(frame));

        let mut painter = RecordingPainter::new();
        paint_subtree(&scene, frame, &mut painter, &ResolvedImages::new()).expect("paint");
        assert!(painter.ops.iter().any(|op| matches!(
            op,
            PaintOp::FillRoundedRect { radius, .. } if (*radius - 10.0).abs() < 1e-4
        )));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Frame"), "My Frame");
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "abcdefghij");
        assert_eq!(sanitize_filename("  padded  "), "padded");
        assert_eq!(sanitize_filename("x".repeat(100).as_str()).len(), 64);
        assert_eq!(sanitize_filename("///"), "");
    }
}
