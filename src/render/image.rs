//! Image rendering for annotations using tiny-skia
//!
//! These functions draw operations onto the canvas pixmap and convert
//! between the pixmap and `RgbaImage` for import and PNG export.

use std::io;

use image::RgbaImage;
use tiny_skia::{
    ColorU8, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash,
    Transform,
};

use super::geometry::{self, PREVIEW_DASH, shape};
use super::text::TextRenderer;
use crate::domain::{Operation, Point, Shape, Style};

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(start: Point, end: Point, stroke_width: f32) -> Option<tiny_skia::Path> {
    let arrow = geometry::arrow_geometry(start, end, stroke_width);

    let mut pb = PathBuilder::new();

    pb.move_to(arrow.start.x, arrow.start.y);
    pb.line_to(arrow.end.x, arrow.end.y);

    for head in arrow.heads {
        pb.move_to(arrow.end.x, arrow.end.y);
        pb.line_to(head.x, head.y);
    }

    pb.finish()
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(start: Point, end: Point) -> Option<tiny_skia::Path> {
    let geometry::EllipseGeometry { cx, cy, rx, ry } = geometry::ellipse_from_points(start, end);
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

fn build_rect_path(start: Point, end: Point) -> Option<tiny_skia::Path> {
    let b = geometry::normalize_rect(start, end);

    let mut pb = PathBuilder::new();
    pb.move_to(b.x, b.y);
    pb.line_to(b.x + b.width, b.y);
    pb.line_to(b.x + b.width, b.y + b.height);
    pb.line_to(b.x, b.y + b.height);
    pb.close();
    pb.finish()
}

fn build_line_path(start: Point, end: Point) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(start.x, start.y);
    pb.line_to(end.x, end.y);
    pb.finish()
}

fn stroke_for(style: &Style, dashed: bool) -> Stroke {
    Stroke {
        width: style.stroke_width.max(0.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: if dashed {
            StrokeDash::new(PREVIEW_DASH.to_vec(), 0.0)
        } else {
            None
        },
        ..Default::default()
    }
}

/// Draw one operation; `dashed` is used for the live preview
pub fn draw_operation(pixmap: &mut Pixmap, op: &Operation, text: &TextRenderer, dashed: bool) {
    let [r, g, b, a] = op.style.color.to_rgba_u8();

    let path = match &op.shape {
        Shape::Rectangle { start, end } => build_rect_path(*start, *end),
        Shape::Ellipse { start, end } => build_ellipse_path(*start, *end),
        Shape::Line { start, end } => build_line_path(*start, *end),
        Shape::Arrow { start, end } => build_arrow_path(*start, *end, op.style.stroke_width),
        Shape::Text { at, text: content } => {
            text.draw(pixmap, content, *at, op.style.stroke_width, [r, g, b, a]);
            return;
        }
    };
    let Some(path) = path else {
        log::debug!("Skipping degenerate {:?} operation", op.tool());
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    pixmap.stroke_path(
        &path,
        &paint,
        &stroke_for(&op.style, dashed),
        Transform::identity(),
        None,
    );
}

/// Convert a straight-alpha image into a premultiplied pixmap
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = Vec::with_capacity(img.as_raw().len());
    for px in img.pixels() {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

/// Convert a premultiplied pixmap back into a straight-alpha image
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Encode an RGBA image as an 8-bit PNG
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}
