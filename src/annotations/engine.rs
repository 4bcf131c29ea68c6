//! Drawing engine: operation log, live preview and full repaint
//!
//! The engine owns the background pixmap and a render surface of the same
//! size. Every mutation ends with a full repaint so the surface always
//! reflects background + log (+ preview while dragging).

use image::RgbaImage;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use crate::domain::{Operation, Point, Style, Tool, ViewportRect};
use crate::error::{CaptureError, ExportError};
use crate::render::image::{draw_operation, pixmap_from_rgba, pixmap_to_rgba, write_png};
use crate::render::text::TextRenderer;
use crate::session::state::{OperationLog, PendingStroke, TextEntry};

struct Canvas {
    background: Pixmap,
    surface: Pixmap,
}

/// Annotation canvas for one capture
pub struct DrawingEngine {
    canvas: Option<Canvas>,
    log: OperationLog,
    pending: Option<PendingStroke>,
    text_entry: Option<TextEntry>,
    text: TextRenderer,
}

impl Default for DrawingEngine {
    fn default() -> Self {
        Self::new(TextRenderer::default())
    }
}

impl DrawingEngine {
    pub fn new(text: TextRenderer) -> Self {
        Self {
            canvas: None,
            log: OperationLog::default(),
            pending: None,
            text_entry: None,
            text,
        }
    }

    /// Establish the background, cropping to `crop` scaled by `dpr` when both are given.
    ///
    /// Canvas pixel size follows the (cropped) bitmap, independent of display scale.
    pub fn set_background(
        &mut self,
        bitmap: RgbaImage,
        crop: Option<ViewportRect>,
        dpr: Option<f64>,
    ) -> Result<(), CaptureError> {
        let bitmap = match (crop, dpr) {
            (Some(rect), Some(dpr)) => crate::capture::crop_to_selection(&bitmap, rect, dpr)?,
            _ => bitmap,
        };
        let background = pixmap_from_rgba(&bitmap).ok_or(CaptureError::EmptyRegion)?;
        let surface = background.clone();
        log::info!(
            "Canvas ready: {}x{} pixels",
            background.width(),
            background.height()
        );
        self.canvas = Some(Canvas {
            background,
            surface,
        });
        self.render_full();
        Ok(())
    }

    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        self.canvas
            .as_ref()
            .map(|c| (c.background.width(), c.background.height()))
    }

    pub fn surface(&self) -> Option<&Pixmap> {
        self.canvas.as_ref().map(|c| &c.surface)
    }

    pub fn operations(&self) -> &[Operation] {
        self.log.operations()
    }

    pub fn redo_buffer(&self) -> &[Operation] {
        self.log.redo_buffer()
    }

    pub fn pending_stroke(&self) -> Option<&PendingStroke> {
        self.pending.as_ref()
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        self.text_entry.as_ref()
    }

    /// Start a drag for shape tools; the text tool opens a text entry instead
    pub fn begin_stroke(&mut self, tool: Tool, point: Point, style: Style) {
        if !tool.is_shape() {
            self.begin_text_entry(point);
            return;
        }
        self.pending = Some(PendingStroke {
            tool,
            anchor: point,
            style,
        });
    }

    /// Repaint and draw the pending shape dashed from its anchor to `point`
    pub fn update_stroke(&mut self, point: Point) {
        let Some(pending) = &self.pending else {
            return;
        };
        let preview = Operation::stroke(pending.tool, pending.anchor, point, pending.style.clone());
        self.render_full();
        if let (Some(canvas), Some(preview)) = (self.canvas.as_mut(), preview) {
            draw_operation(&mut canvas.surface, &preview, &self.text, true);
        }
    }

    /// Finalize the pending shape at `point`
    pub fn commit_stroke(&mut self, point: Point) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Some(op) = Operation::stroke(pending.tool, pending.anchor, point, pending.style) {
            log::debug!("Committed {:?} operation", op.tool());
            self.log.add(op);
        }
        self.render_full();
    }

    /// Drop an in-progress drag without committing it
    pub fn cancel_stroke(&mut self) {
        if self.pending.take().is_some() {
            self.render_full();
        }
    }

    /// Open the text entry at `point`, discarding any entry already open
    pub fn begin_text_entry(&mut self, point: Point) {
        if self.text_entry.is_some() {
            log::debug!("Discarding open text entry");
        }
        self.pending = None;
        self.text_entry = Some(TextEntry { at: point });
    }

    /// Commit the open text entry with `text`
    pub fn confirm_text(&mut self, text: &str, style: Style) {
        let Some(entry) = self.text_entry.take() else {
            return;
        };
        self.log.add(Operation::text(entry.at, text, style));
        self.render_full();
    }

    pub fn cancel_text(&mut self) {
        self.text_entry = None;
    }

    pub fn undo(&mut self) {
        if self.log.undo() {
            self.render_full();
        }
    }

    pub fn redo(&mut self) {
        if self.log.redo() {
            self.render_full();
        }
    }

    /// Clear, draw the background at the origin, then every operation in log order
    pub fn render_full(&mut self) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        paint(
            &mut canvas.surface,
            &canvas.background,
            self.log.operations(),
            &self.text,
        );
    }

    /// Composed image without any live preview
    pub fn render_image(&self) -> Result<RgbaImage, ExportError> {
        let canvas = self.canvas.as_ref().ok_or(ExportError::NoSurface)?;
        let mut surface = canvas.background.clone();
        paint(
            &mut surface,
            &canvas.background,
            self.log.operations(),
            &self.text,
        );
        Ok(pixmap_to_rgba(&surface))
    }

    /// Serialize the full render to PNG
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let image = self.render_image()?;
        let mut buffer = Vec::new();
        write_png(&mut buffer, &image)?;
        log::debug!(
            "Exported {}x{} PNG ({} bytes)",
            image.width(),
            image.height(),
            buffer.len()
        );
        Ok(buffer)
    }
}

fn paint(surface: &mut Pixmap, background: &Pixmap, operations: &[Operation], text: &TextRenderer) {
    surface.fill(Color::TRANSPARENT);
    surface.draw_pixmap(
        0,
        0,
        background.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    for op in operations {
        draw_operation(surface, op, text, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorToken;

    fn engine(w: u32, h: u32) -> DrawingEngine {
        let mut engine = DrawingEngine::default();
        let bg = RgbaImage::from_pixel(w, h, image::Rgba([240, 240, 240, 255]));
        engine.set_background(bg, None, None).unwrap();
        engine
    }

    fn style() -> Style {
        Style {
            color: ColorToken::parse("#0000ff").unwrap(),
            stroke_width: 3.0,
        }
    }

    fn surface_bytes(engine: &DrawingEngine) -> Vec<u8> {
        engine.surface().unwrap().data().to_vec()
    }

    fn drag(engine: &mut DrawingEngine, tool: Tool, from: (f32, f32), to: (f32, f32)) {
        engine.begin_stroke(tool, from.into(), style());
        engine.update_stroke(to.into());
        engine.commit_stroke(to.into());
    }

    #[test]
    fn n_commits_then_n_undos_restore_background() {
        let mut engine = engine(80, 60);
        let baseline = surface_bytes(&engine);

        drag(&mut engine, Tool::Rectangle, (5.0, 5.0), (40.0, 30.0));
        drag(&mut engine, Tool::Ellipse, (10.0, 10.0), (70.0, 50.0));
        drag(&mut engine, Tool::Arrow, (0.0, 59.0), (79.0, 0.0));
        assert_ne!(surface_bytes(&engine), baseline);
        let committed = engine.operations().to_vec();

        for _ in 0..3 {
            engine.undo();
        }
        assert_eq!(surface_bytes(&engine), baseline);
        let reversed: Vec<_> = committed.into_iter().rev().collect();
        assert_eq!(engine.redo_buffer(), &reversed[..]);
    }

    #[test]
    fn redo_after_undo_restores_render() {
        let mut engine = engine(50, 50);
        drag(&mut engine, Tool::Line, (0.0, 0.0), (49.0, 49.0));
        drag(&mut engine, Tool::Rectangle, (10.0, 10.0), (30.0, 40.0));
        let ops = engine.operations().to_vec();
        let pixels = surface_bytes(&engine);

        engine.undo();
        engine.redo();
        assert_eq!(engine.operations(), &ops[..]);
        assert!(engine.redo_buffer().is_empty());
        assert_eq!(surface_bytes(&engine), pixels);
    }

    #[test]
    fn commit_after_undo_clears_redo() {
        let mut engine = engine(40, 40);
        drag(&mut engine, Tool::Line, (0.0, 0.0), (10.0, 10.0));
        drag(&mut engine, Tool::Line, (0.0, 10.0), (10.0, 0.0));
        engine.undo();
        engine.undo();
        assert_eq!(engine.redo_buffer().len(), 2);
        drag(&mut engine, Tool::Rectangle, (1.0, 1.0), (5.0, 5.0));
        assert!(engine.redo_buffer().is_empty());
        assert_eq!(engine.operations().len(), 1);
    }

    #[test]
    fn undo_redo_on_empty_stacks_are_silent() {
        let mut engine = engine(10, 10);
        let baseline = surface_bytes(&engine);
        engine.undo();
        engine.redo();
        assert!(engine.operations().is_empty());
        assert_eq!(surface_bytes(&engine), baseline);
    }

    #[test]
    fn preview_is_never_logged_and_differs_from_commit() {
        let mut engine = engine(80, 40);
        engine.begin_stroke(Tool::Line, Point::new(0.0, 20.5), style());
        engine.update_stroke(Point::new(79.0, 20.5));
        assert!(engine.operations().is_empty());
        let preview = surface_bytes(&engine);

        engine.commit_stroke(Point::new(79.0, 20.5));
        assert_eq!(engine.operations().len(), 1);
        assert!(engine.pending_stroke().is_none());
        // dashed preview vs solid commit
        assert_ne!(surface_bytes(&engine), preview);
    }

    #[test]
    fn preview_is_recomputed_on_every_move() {
        let mut engine = engine(60, 60);
        engine.begin_stroke(Tool::Rectangle, Point::new(5.0, 5.0), style());
        engine.update_stroke(Point::new(50.0, 50.0));
        engine.update_stroke(Point::new(20.0, 20.0));
        let moved = surface_bytes(&engine);

        let mut fresh = self::engine(60, 60);
        fresh.begin_stroke(Tool::Rectangle, Point::new(5.0, 5.0), style());
        fresh.update_stroke(Point::new(20.0, 20.0));
        assert_eq!(moved, surface_bytes(&fresh));
    }

    #[test]
    fn update_and_commit_without_pending_are_ignored() {
        let mut engine = engine(20, 20);
        engine.update_stroke(Point::new(5.0, 5.0));
        engine.commit_stroke(Point::new(5.0, 5.0));
        assert!(engine.operations().is_empty());
    }

    #[test]
    fn text_tool_opens_entry_instead_of_stroke() {
        let mut engine = engine(100, 100);
        engine.begin_stroke(Tool::Text, Point::new(12.0, 14.0), style());
        assert!(engine.pending_stroke().is_none());
        assert_eq!(engine.text_entry().map(|e| e.at), Some(Point::new(12.0, 14.0)));
    }

    #[test]
    fn only_one_text_entry_is_open() {
        let mut engine = engine(100, 100);
        engine.begin_text_entry(Point::new(1.0, 1.0));
        engine.begin_text_entry(Point::new(50.0, 60.0));
        engine.confirm_text("hello", style());
        assert_eq!(engine.operations().len(), 1);
        assert_eq!(engine.operations()[0].endpoints().0, Point::new(50.0, 60.0));
        assert_eq!(engine.operations()[0].text_content(), Some("hello"));
        assert!(engine.text_entry().is_none());
    }

    #[test]
    fn cancelled_text_is_not_logged() {
        let mut engine = engine(100, 100);
        engine.begin_text_entry(Point::new(1.0, 1.0));
        engine.cancel_text();
        engine.confirm_text("ignored", style());
        assert!(engine.operations().is_empty());
    }

    #[test]
    fn crop_sets_canvas_size_from_device_pixels() {
        let mut engine = DrawingEngine::default();
        let bg = RgbaImage::new(200, 100);
        let rect = ViewportRect {
            x: 10.0,
            y: 10.0,
            width: 30.0,
            height: 20.0,
        };
        engine.set_background(bg, Some(rect), Some(2.0)).unwrap();
        assert_eq!(engine.canvas_size(), Some((60, 40)));
    }

    #[test]
    fn crop_without_dpr_keeps_full_bitmap() {
        let mut engine = DrawingEngine::default();
        let rect = ViewportRect {
            x: 10.0,
            y: 10.0,
            width: 30.0,
            height: 20.0,
        };
        engine
            .set_background(RgbaImage::new(200, 100), Some(rect), None)
            .unwrap();
        assert_eq!(engine.canvas_size(), Some((200, 100)));
    }

    #[test]
    fn export_without_background_fails() {
        let engine = DrawingEngine::default();
        assert!(matches!(engine.export_png(), Err(ExportError::NoSurface)));
    }

    #[test]
    fn export_excludes_live_preview() {
        let mut engine = engine(30, 30);
        let clean = engine.export_png().unwrap();
        engine.begin_stroke(Tool::Line, Point::new(0.0, 0.0), style());
        engine.update_stroke(Point::new(29.0, 29.0));
        assert_eq!(engine.export_png().unwrap(), clean);
    }

    #[test]
    fn export_matches_committed_surface() {
        let mut engine = engine(30, 30);
        drag(&mut engine, Tool::Ellipse, (2.0, 2.0), (28.0, 20.0));
        let png = engine.export_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, pixmap_to_rgba(engine.surface().unwrap()));
    }
}
