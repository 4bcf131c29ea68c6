//! Text annotation rasterization using ab_glyph
//!
//! Glyph coverage is blended straight into the tiny-skia pixmap so text
//! composes with strokes the same way on every render.

use std::path::Path;

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use tiny_skia::{Pixmap, PremultipliedColorU8};

use super::geometry::{self, text};
use crate::domain::Point;

/// Families tried in order when no font is configured
const SYSTEM_FAMILIES: &[fontdb::Family<'static>] = &[
    fontdb::Family::SansSerif,
    fontdb::Family::Name("DejaVu Sans"),
    fontdb::Family::Name("Liberation Sans"),
    fontdb::Family::Name("Noto Sans"),
    fontdb::Family::Name("Cantarell"),
];

/// Font used for text operations; renders nothing when no font is available
#[derive(Clone, Debug, Default)]
pub struct TextRenderer {
    font: Option<FontArc>,
}

impl TextRenderer {
    /// Load `configured` if given and usable, otherwise a system sans-serif face
    pub fn load(configured: Option<&Path>) -> Self {
        if let Some(path) = configured {
            match read_font(path) {
                Ok(font) => {
                    log::debug!("Using font {}", path.display());
                    return Self { font: Some(font) };
                }
                Err(err) => log::warn!("Unusable font {}: {}", path.display(), err),
            }
        }
        match system_font() {
            Some(font) => Self { font: Some(font) },
            None => {
                log::warn!("No font available, text annotations will not be drawn");
                Self::default()
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of a single line at `size` pixels
    pub fn measure(&self, line: &str, size: f32) -> f32 {
        let Some(font) = &self.font else {
            return 0.0;
        };
        let scaled = font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut prev = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Draw wrapped text with the top of the first line at `at`
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        content: &str,
        at: Point,
        stroke_width: f32,
        rgba: [u8; 4],
    ) {
        let Some(font) = &self.font else {
            return;
        };
        let size = text::font_size(stroke_width);
        let max_width = text::max_width(pixmap.width() as f32, at.x);
        let lines = geometry::wrap_text(content, max_width, |line| self.measure(line, size));

        let scaled = font.as_scaled(PxScale::from(size));
        let mut top = at.y;
        for line in &lines {
            let baseline = top + scaled.ascent();
            let mut caret = at.x;
            let mut prev = None;
            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = prev {
                    caret += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(size, point(caret, baseline));
                caret += scaled.h_advance(id);
                prev = Some(id);

                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i32 + gx as i32;
                    let y = bounds.min.y as i32 + gy as i32;
                    blend_pixel(pixmap, x, y, rgba, coverage);
                });
            }
            top += text::LINE_HEIGHT;
        }
    }
}

fn read_font(path: &Path) -> Result<FontArc, String> {
    let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
    FontArc::try_from_vec(bytes).map_err(|err| err.to_string())
}

fn system_font() -> Option<FontArc> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let id = db
        .query(&fontdb::Query {
            families: SYSTEM_FAMILIES,
            ..fontdb::Query::default()
        })
        .or_else(|| db.faces().next().map(|face| face.id))?;
    if let Some(face) = db.face(id) {
        log::debug!("Using system font {:?}", face.post_script_name);
    }
    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
    })
    .flatten()
    .map(FontArc::new)
}

/// Source-over blend of a straight-alpha color at `coverage` onto a premultiplied pixel
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, rgba: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * rgba[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let idx = y as usize * pixmap.width() as usize + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];
    let mix = |src: u8, dst: u8| -> u8 {
        (src as f32 * alpha + dst as f32 * (1.0 - alpha))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let a = mix(255, dst.alpha());
    let r = mix(rgba[0], dst.red()).min(a);
    let g = mix(rgba[1], dst.green()).min(a);
    let b = mix(rgba[2], dst.blue()).min(a);
    if let Some(color) = PremultipliedColorU8::from_rgba(r, g, b, a) {
        pixels[idx] = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_font_text_is_a_no_op() {
        let renderer = TextRenderer::default();
        assert!(!renderer.has_font());
        assert_eq!(renderer.measure("hello", 14.0), 0.0);

        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let before = pixmap.data().to_vec();
        renderer.draw(&mut pixmap, "hello", Point::new(1.0, 1.0), 2.0, [255, 0, 0, 255]);
        assert_eq!(pixmap.data(), &before[..]);
    }

    #[test]
    fn missing_configured_font_falls_back_to_system_lookup() {
        let renderer = TextRenderer::load(Some(Path::new("/nonexistent/font.ttf")));
        assert_eq!(renderer.has_font(), TextRenderer::load(None).has_font());
    }

    #[test]
    fn text_is_top_aligned_and_wrapped_inside_the_canvas() {
        let renderer = TextRenderer::load(None);
        if !renderer.has_font() {
            // no fonts installed on this machine
            return;
        }
        let (width, height) = (200, 120);
        let at = Point::new(10.0, 10.0);
        let mut pixmap = Pixmap::new(width, height).unwrap();
        renderer.draw(
            &mut pixmap,
            "annotated screenshot text that wraps",
            at,
            2.0,
            [0, 0, 0, 255],
        );

        let painted: Vec<(u32, u32)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| pixmap.pixel(x, y).is_some_and(|px| px.alpha() > 0))
            .collect();
        assert!(!painted.is_empty());

        let min_y = painted.iter().map(|&(_, y)| y).min().unwrap();
        let max_y = painted.iter().map(|&(_, y)| y).max().unwrap();
        let max_x = painted.iter().map(|&(x, _)| x).max().unwrap();
        let limit = at.x + text::max_width(width as f32, at.x);

        assert!(min_y as f32 >= at.y);
        assert!((max_x as f32) < limit);
        // at least a second line, one line height further down
        assert!(max_y as f32 >= at.y + text::LINE_HEIGHT);
    }

    #[test]
    fn full_coverage_blend_replaces_pixel() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        blend_pixel(&mut pixmap, 1, 1, [10, 20, 30, 255], 1.0);
        let px = pixmap.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (10, 20, 30, 255));
        // out of bounds is ignored
        blend_pixel(&mut pixmap, 5, 5, [10, 20, 30, 255], 1.0);
    }
}
