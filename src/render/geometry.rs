//! Geometry calculations for annotation rendering
//!
//! Pure math shared by the preview and committed renders, kept free of
//! tiny-skia types so it can be checked exactly.

use std::f32::consts::PI;

use crate::domain::Point;

/// Arrow geometry constants
pub mod arrow {
    use super::PI;

    /// Arrowhead angle from shaft in radians
    pub const HEAD_ANGLE: f32 = PI / 7.0;
    /// Shortest arrowhead regardless of stroke width
    pub const MIN_HEAD_LENGTH: f32 = 8.0;

    /// Arrowhead length for a given stroke width
    pub fn head_length(stroke_width: f32) -> f32 {
        MIN_HEAD_LENGTH.max(4.0 * stroke_width)
    }
}

/// Text layout constants
pub mod text {
    /// Distance kept from the right canvas edge when wrapping
    pub const RIGHT_MARGIN: f32 = 10.0;
    /// Upper bound on wrap width
    pub const MAX_WIDTH: f32 = 480.0;
    /// Vertical advance between wrapped lines
    pub const LINE_HEIGHT: f32 = 20.0;

    /// Font size in pixels for a given stroke width
    pub fn font_size(stroke_width: f32) -> f32 {
        14.0_f32.max(12.0 + 2.0 * stroke_width)
    }

    /// Wrap width available to text anchored at `x`
    pub fn max_width(canvas_width: f32, x: f32) -> f32 {
        (canvas_width - x - RIGHT_MARGIN).min(MAX_WIDTH)
    }
}

/// Shape geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Dash pattern for live previews: on, off
pub const PREVIEW_DASH: [f32; 2] = [6.0, 6.0];

/// Axis-aligned box with non-negative extents
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(start: Point, end: Point) -> BoxGeometry {
    BoxGeometry {
        x: start.x.min(end.x),
        y: start.y.min(end.y),
        width: (end.x - start.x).abs(),
        height: (end.y - start.y).abs(),
    }
}

/// Inscribed ellipse: center and half-extents of the box spanned by the points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipseGeometry {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

#[inline]
pub fn ellipse_from_points(start: Point, end: Point) -> EllipseGeometry {
    let rx = (end.x - start.x) / 2.0;
    let ry = (end.y - start.y) / 2.0;
    EllipseGeometry {
        cx: start.x + rx,
        cy: start.y + ry,
        rx: rx.abs(),
        ry: ry.abs(),
    }
}

/// Shaft and the two head strokes of an arrow
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowGeometry {
    pub start: Point,
    pub end: Point,
    /// Far ends of the head strokes; both strokes start at `end`
    pub heads: [Point; 2],
    pub head_length: f32,
}

/// Calculate arrow geometry: head strokes at +-pi/7 from the shaft direction
pub fn arrow_geometry(start: Point, end: Point, stroke_width: f32) -> ArrowGeometry {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let len = arrow::head_length(stroke_width);
    let head = |a: f32| Point::new(end.x - len * a.cos(), end.y - len * a.sin());
    ArrowGeometry {
        start,
        end,
        heads: [head(angle - arrow::HEAD_ANGLE), head(angle + arrow::HEAD_ANGLE)],
        head_length: len,
    }
}

/// Break `text` into lines character by character.
///
/// `measure` returns the advance width of a candidate line. A character that
/// makes the line wider than `max_width` starts the next line, so a first
/// character that is already too wide yields an empty leading line.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for ch in text.chars() {
        let mut candidate = line.clone();
        candidate.push(ch);
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push(ch);
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
