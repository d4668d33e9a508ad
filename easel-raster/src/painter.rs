//! Painter abstraction over the raster surface.
//!
//! The export traversal issues paint calls against the [`Painter`] trait
//! with clip regions and rotations passed as explicit parameters, so the
//! walk can be tested against [`RecordingPainter`] without any real
//! rendering surface. [`SvgPainter`] is the production implementation; its
//! output feeds the resvg/tiny-skia rasterizer.

use std::fmt::Write;

use easel_core::{Rect, TextAlign};

/// Rotation in degrees about a fixed center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Angle in degrees, clockwise.
    pub degrees: f32,
    /// Center X.
    pub cx: f32,
    /// Center Y.
    pub cy: f32,
}

/// Font parameters for one painted text line.
#[derive(Debug, Clone, Copy)]
pub struct TextFont<'a> {
    /// Font family name.
    pub family: &'a str,
    /// Font size in local units.
    pub size: f32,
}

/// Paint surface the export traversal draws on.
pub trait Painter {
    /// Measured width of a text run at the given font size.
    fn measure_text(&self, text: &str, font_size: f32) -> f32;

    /// Fill a rounded rectangle.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, rotation: Option<Rotation>, fill: &str);

    /// Stroke a rounded rectangle outline.
    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        rotation: Option<Rotation>,
        stroke: &str,
        width: f32,
    );

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect, rotation: Option<Rotation>, fill: &str);

    /// Stroke the ellipse inscribed in `rect`.
    fn stroke_ellipse(&mut self, rect: Rect, rotation: Option<Rotation>, stroke: &str, width: f32);

    /// Draw a single text line anchored per `align` at `anchor_x`.
    #[allow(clippy::too_many_arguments)]
    fn draw_text_line(
        &mut self,
        anchor_x: f32,
        baseline_y: f32,
        text: &str,
        font: &TextFont<'_>,
        align: TextAlign,
        color: &str,
        rotation: Option<Rotation>,
    );

    /// Draw an image from a resolved data URI, clipped to a rounded rect.
    fn draw_image(&mut self, rect: Rect, radius: f32, rotation: Option<Rotation>, data_uri: &str);

    /// Draw the neutral placeholder for an image that failed to load.
    fn draw_placeholder(&mut self, rect: Rect, rotation: Option<Rotation>);

    /// Push a rounded-rect clip; subsequent paints stay inside it until the
    /// matching [`Painter::pop_clip`].
    fn push_clip(&mut self, rect: Rect, radius: f32, rotation: Option<Rotation>);

    /// Pop the innermost clip.
    fn pop_clip(&mut self);
}

fn transform_attr(rotation: Option<Rotation>) -> String {
    rotation.map_or_else(String::new, |r| {
        format!(" transform=\"rotate({} {} {})\"", r.degrees, r.cx, r.cy)
    })
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Assembles the SVG intermediate representation of an export.
#[derive(Debug, Default)]
pub struct SvgPainter {
    body: String,
    defs: String,
    clip_count: usize,
    open_clips: usize,
}

impl SvgPainter {
    /// Create an empty painter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish into a complete SVG string of `out_w`×`out_h` pixels over a
    /// logical `view_w`×`view_h` viewBox (the scale factor lives in the
    /// ratio between the two).
    #[must_use]
    pub fn finish(mut self, out_w: u32, out_h: u32, view_w: f32, view_h: f32) -> String {
        // Unbalanced pushes would clip everything after them; close anyway.
        while self.open_clips > 0 {
            self.pop_clip();
        }
        let mut svg = String::with_capacity(self.body.len() + self.defs.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );
        if !self.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", self.defs);
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }
}

impl Painter for SvgPainter {
    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        // Approximate advance widths; good enough for greedy wrapping of
        // the SVG intermediate, where real shaping happens in resvg.
        text.chars()
            .map(|c| match c {
                'i' | 'I' | 'j' | 'l' | 't' | 'f' | 'r' | '.' | ',' | '\'' | '!' | ':' | ';'
                | '|' | ' ' => 0.35,
                'm' | 'w' | 'M' | 'W' => 0.85,
                c if c.is_ascii() => 0.6,
                _ => 1.0,
            })
            .sum::<f32>()
            * font_size
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        rotation: Option<Rotation>,
        fill: &str,
    ) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" fill=\"{}\"{}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape_xml(fill),
            transform_attr(rotation),
        );
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        rotation: Option<Rotation>,
        stroke: &str,
        width: f32,
    ) {
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\"{}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape_xml(stroke),
            transform_attr(rotation),
        );
    }

    fn fill_ellipse(&mut self, rect: Rect, rotation: Option<Rotation>, fill: &str) {
        let c = rect.center();
        let _ = write!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"{}\"{}/>",
            c.x,
            c.y,
            rect.width / 2.0,
            rect.height / 2.0,
            escape_xml(fill),
            transform_attr(rotation),
        );
    }

    fn stroke_ellipse(&mut self, rect: Rect, rotation: Option<Rotation>, stroke: &str, width: f32) {
        let c = rect.center();
        let _ = write!(
            self.body,
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\"{}/>",
            c.x,
            c.y,
            rect.width / 2.0,
            rect.height / 2.0,
            escape_xml(stroke),
            transform_attr(rotation),
        );
    }

    fn draw_text_line(
        &mut self,
        anchor_x: f32,
        baseline_y: f32,
        text: &str,
        font: &TextFont<'_>,
        align: TextAlign,
        color: &str,
        rotation: Option<Rotation>,
    ) {
        let anchor = match align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let _ = write!(
            self.body,
            "<text x=\"{anchor_x}\" y=\"{baseline_y}\" font-size=\"{}\" font-family=\"{}\" text-anchor=\"{anchor}\" fill=\"{}\"{}>{}</text>",
            font.size,
            escape_xml(font.family),
            escape_xml(color),
            transform_attr(rotation),
            escape_xml(text),
        );
    }

    fn draw_image(&mut self, rect: Rect, radius: f32, rotation: Option<Rotation>, data_uri: &str) {
        // The clip group carries the rotation when present; emitting it on
        // the image as well would double the angle.
        let image_rotation = if radius > 0.0 {
            self.push_clip(rect, radius, rotation);
            None
        } else {
            rotation
        };
        let _ = write!(
            self.body,
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"{}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape_xml(data_uri),
            transform_attr(image_rotation),
        );
        if radius > 0.0 {
            self.pop_clip();
        }
    }

    fn draw_placeholder(&mut self, rect: Rect, rotation: Option<Rotation>) {
        let transform = transform_attr(rotation);
        let _ = write!(
            self.body,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#e0e0e0\" stroke=\"#999999\" stroke-width=\"1\"{transform}/>",
            rect.x, rect.y, rect.width, rect.height,
        );
        let c = rect.center();
        let glyph_size = (rect.width.min(rect.height) / 3.0).max(8.0);
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" font-size=\"{glyph_size}\" font-family=\"sans-serif\" text-anchor=\"middle\" fill=\"#666666\"{transform}>?</text>",
            c.x,
            c.y + glyph_size / 3.0,
        );
    }

    fn push_clip(&mut self, rect: Rect, radius: f32, rotation: Option<Rotation>) {
        let id = self.clip_count;
        self.clip_count += 1;
        self.open_clips += 1;
        let _ = write!(
            self.defs,
            "<clipPath id=\"clip{id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius}\"/></clipPath>",
            rect.x, rect.y, rect.width, rect.height,
        );
        let _ = write!(
            self.body,
            "<g clip-path=\"url(#clip{id})\"{}>",
            transform_attr(rotation),
        );
    }

    fn pop_clip(&mut self) {
        if self.open_clips > 0 {
            self.open_clips -= 1;
            self.body.push_str("</g>");
        }
    }
}

/// A recorded paint operation, for traversal tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Rounded-rect fill.
    FillRoundedRect {
        /// Target rectangle.
        rect: Rect,
        /// Corner radius after capping.
        radius: f32,
        /// Fill color.
        fill: String,
    },
    /// Rounded-rect stroke.
    StrokeRoundedRect {
        /// Target rectangle.
        rect: Rect,
        /// Stroke color.
        stroke: String,
    },
    /// Ellipse fill.
    FillEllipse {
        /// Bounding rectangle.
        rect: Rect,
        /// Fill color.
        fill: String,
    },
    /// Ellipse stroke.
    StrokeEllipse {
        /// Bounding rectangle.
        rect: Rect,
    },
    /// One text line.
    TextLine {
        /// Line content.
        text: String,
        /// Anchor X.
        anchor_x: f32,
        /// Baseline Y.
        baseline_y: f32,
        /// Alignment.
        align: TextAlign,
    },
    /// Image paint.
    Image {
        /// Target rectangle.
        rect: Rect,
        /// Resolved data URI.
        data_uri: String,
    },
    /// Placeholder for a failed image.
    Placeholder {
        /// Target rectangle.
        rect: Rect,
    },
    /// Clip push.
    PushClip {
        /// Clip rectangle.
        rect: Rect,
        /// Corner radius after capping.
        radius: f32,
    },
    /// Clip pop.
    PopClip,
}

/// Painter that records every operation instead of drawing.
///
/// `measure_text` is a fixed 0.6 em per character so wrapping tests are
/// deterministic.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    /// Operations in paint order.
    pub ops: Vec<PaintOp>,
}

impl RecordingPainter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Painter for RecordingPainter {
    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        _rotation: Option<Rotation>,
        fill: &str,
    ) {
        self.ops.push(PaintOp::FillRoundedRect {
            rect,
            radius,
            fill: fill.to_string(),
        });
    }

    fn stroke_rounded_rect(
        &mut self,
        rect: Rect,
        _radius: f32,
        _rotation: Option<Rotation>,
        stroke: &str,
        _width: f32,
    ) {
        self.ops.push(PaintOp::StrokeRoundedRect {
            rect,
            stroke: stroke.to_string(),
        });
    }

    fn fill_ellipse(&mut self, rect: Rect, _rotation: Option<Rotation>, fill: &str) {
        self.ops.push(PaintOp::FillEllipse {
            rect,
            fill: fill.to_string(),
        });
    }

    fn stroke_ellipse(
        &mut self,
        rect: Rect,
        _rotation: Option<Rotation>,
        _stroke: &str,
        _width: f32,
    ) {
        self.ops.push(PaintOp::StrokeEllipse { rect });
    }

    fn draw_text_line(
        &mut self,
        anchor_x: f32,
        baseline_y: f32,
        text: &str,
        _font: &TextFont<'_>,
        align: TextAlign,
        _color: &str,
        _rotation: Option<Rotation>,
    ) {
        self.ops.push(PaintOp::TextLine {
            text: text.to_string(),
            anchor_x,
            baseline_y,
            align,
        });
    }

    fn draw_image(&mut self, rect: Rect, _radius: f32, _rotation: Option<Rotation>, data_uri: &str) {
        self.ops.push(PaintOp::Image {
            rect,
            data_uri: data_uri.to_string(),
        });
    }

    fn draw_placeholder(&mut self, rect: Rect, _rotation: Option<Rotation>) {
        self.ops.push(PaintOp::Placeholder { rect });
    }

    fn push_clip(&mut self, rect: Rect, radius: f32, _rotation: Option<Rotation>) {
        self.ops.push(PaintOp::PushClip { rect, radius });
    }

    fn pop_clip(&mut self) {
        self.ops.push(PaintOp::PopClip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_structure_and_scaling() {
        let mut painter = SvgPainter::new();
        painter.fill_rounded_rect(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0, None, "#ff0000");
        let svg = painter.finish(200, 100, 100.0, 50.0);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"200\""));
        assert!(svg.contains("viewBox=\"0 0 100 50\""));
        assert!(svg.contains("fill=\"#ff0000\""));
    }

    #[test]
    fn test_clip_groups_balanced() {
        let mut painter = SvgPainter::new();
        painter.push_clip(Rect::new(0.0, 0.0, 10.0, 10.0), 2.0, None);
        painter.fill_rounded_rect(Rect::new(1.0, 1.0, 5.0, 5.0), 0.0, None, "#000000");
        // Deliberately unbalanced; finish must close the group.
        let svg = painter.finish(10, 10, 10.0, 10.0);
        assert!(svg.contains("<clipPath id=\"clip0\">"));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_rotation_attr() {
        let mut painter = SvgPainter::new();
        painter.fill_rounded_rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0.0,
            Some(Rotation {
                degrees: 45.0,
                cx: 5.0,
                cy: 5.0,
            }),
            "#000000",
        );
        let svg = painter.finish(10, 10, 10.0, 10.0);
        assert!(svg.contains("rotate(45 5 5)"));
    }

    #[test]
    fn test_rounded_rotated_image_rotates_once() {
        let mut painter = SvgPainter::new();
        painter.draw_image(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            8.0,
            Some(Rotation {
                degrees: 30.0,
                cx: 20.0,
                cy: 20.0,
            }),
            "data:image/png;base64,AAAA",
        );
        let svg = painter.finish(40, 40, 40.0, 40.0);
        assert_eq!(svg.matches("rotate(30 20 20)").count(), 1);
    }

    #[test]
    fn test_text_escaped_and_anchored() {
        let mut painter = SvgPainter::new();
        painter.draw_text_line(
            50.0,
            16.0,
            "a < b & c",
            &TextFont {
                family: "sans-serif",
                size: 16.0,
            },
            TextAlign::Center,
            "#000000",
            None,
        );
        let svg = painter.finish(100, 30, 100.0, 30.0);
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn test_measure_text_monotonic_in_length() {
        let painter = SvgPainter::new();
        let short = painter.measure_text("abc", 16.0);
        let long = painter.measure_text("abcdef", 16.0);
        assert!(long > short);
        assert!(short > 0.0);
    }
}
