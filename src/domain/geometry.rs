//! Geometric types for capture regions and canvas coordinates

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A point in background-bitmap pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Selection rectangle in CSS pixels, as reported by the region selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    /// Build a rectangle from two drag corners, in any drag direction
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    /// Convert to device pixels: every component is `round(v * dpr)`
    pub fn to_device(self, dpr: f64) -> Rect {
        let left = (self.x * dpr).round() as i32;
        let top = (self.y * dpr).round() as i32;
        let width = (self.width * dpr).round() as i32;
        let height = (self.height * dpr).round() as i32;
        Rect::new(left, top, left + width, top + height)
    }
}

/// Integer pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new(self.width().unsigned_abs())?;
        let height = NonZeroU32::new(self.height().unsigned_abs())?;
        Some(RectDimension { width, height })
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

/// Available on-screen area for the annotation surface, in display pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Horizontal margin reserved around the canvas
const VIEWPORT_MARGIN_X: f32 = 40.0;
/// Vertical space reserved for the toolbar and status line
const VIEWPORT_MARGIN_Y: f32 = 100.0;

/// Scale that fits a `width` x `height` canvas into `viewport`.
///
/// Aspect ratio is preserved and the canvas is never upscaled.
pub fn display_scale(width: u32, height: u32, viewport: Viewport) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let sx = (viewport.width - VIEWPORT_MARGIN_X) / width as f32;
    let sy = (viewport.height - VIEWPORT_MARGIN_Y) / height as f32;
    sx.min(sy).min(1.0)
}

/// On-screen size of the canvas after applying [`display_scale`]
pub fn display_size(width: u32, height: u32, viewport: Viewport) -> (u32, u32) {
    let scale = display_scale(width, height, viewport);
    (
        (width as f32 * scale).round() as u32,
        (height as f32 * scale).round() as u32,
    )
}

/// Map a point on the displayed canvas back into bitmap pixels.
///
/// `offset` is the canvas' top-left corner on screen and `shown` its displayed size.
pub fn display_to_canvas(
    display: Point,
    offset: Point,
    shown: (u32, u32),
    canvas: (u32, u32),
) -> Point {
    let scale_x = if shown.0 == 0 {
        1.0
    } else {
        canvas.0 as f32 / shown.0 as f32
    };
    let scale_y = if shown.1 == 0 {
        1.0
    } else {
        canvas.1 as f32 / shown.1 as f32
    };
    Point::new(
        (display.x - offset.x) * scale_x,
        (display.y - offset.y) * scale_y,
    )
}
