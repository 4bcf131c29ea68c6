//! Annotation session management module
//!
//! This module contains:
//! - Session state (operation log, pending stroke, text entry)
//! - Message types and keyboard shortcuts
//! - The status line and scripted input replay
//! - `AnnotationSession`, which ties a drawing engine to upload and status

pub mod messages;
pub mod script;
pub mod shortcuts;
pub mod state;
pub mod status;

use crate::annotations::{DrawingEngine, InputAdapter, ToolState};
use crate::capture::CaptureInput;
use crate::config::SettingsStore;
use crate::core::notify::Notifier;
use crate::error::{CaptureError, SaveError};
use crate::render::text::TextRenderer;
use crate::upload::{Clipboard, UploadPipeline};
use messages::{DrawMsg, Msg, PointerEvent};
use shortcuts::{Key, Modifiers};
use status::{Status, StatusLine};

/// One annotation surface: a capture, its drawing engine and the status line
pub struct AnnotationSession<S> {
    pub engine: DrawingEngine,
    pub input: InputAdapter,
    status: S,
    text_buffer: String,
    closed: bool,
}

impl<S: StatusLine> AnnotationSession<S> {
    pub fn new(text: TextRenderer, tools: ToolState, status: S) -> Self {
        Self {
            engine: DrawingEngine::new(text),
            input: InputAdapter::new(tools),
            status,
            text_buffer: String::new(),
            closed: false,
        }
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    /// True once an upload succeeded and the surface was closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Load the capture handed over at startup.
    ///
    /// Failures are shown on the status line; the user retries from the capture side.
    pub fn load_capture(&mut self, capture: Option<&CaptureInput>) -> Result<(), CaptureError> {
        let result = capture.ok_or(CaptureError::Missing).and_then(|capture| {
            let bitmap = capture.decode()?;
            let (rect, dpr) = capture.crop_region().unzip();
            self.engine.set_background(bitmap, rect, dpr)
        });
        match &result {
            Ok(()) => self.status.set_status(Status::Ready),
            Err(err) => {
                log::error!("Failed to load capture: {}", err);
                self.status.set_status(Status::NoCapture);
            }
        }
        result
    }

    /// Route a drawing message to the engine
    pub fn handle_draw(&mut self, msg: DrawMsg) {
        if self.closed {
            return;
        }
        if matches!(
            msg,
            DrawMsg::TextConfirm(_) | DrawMsg::TextCancel | DrawMsg::Pointer(PointerEvent::Down(_))
        ) {
            self.text_buffer.clear();
        }
        self.input.handle_draw_msg(&mut self.engine, msg);
    }

    /// Type into the open text entry
    pub fn type_text(&mut self, text: &str) {
        if self.engine.text_entry().is_some() {
            self.text_buffer.push_str(text);
        }
    }

    /// Translate a key press; drawing messages are applied, save requests returned
    pub fn handle_key(&mut self, key: &Key, modifiers: Modifiers) -> Option<Msg> {
        let entry = self.engine.text_entry().map(|_| self.text_buffer.as_str());
        match shortcuts::handle_key_event(key, modifiers, entry)? {
            Msg::Draw(msg) => {
                self.handle_draw(msg);
                None
            }
            Msg::SaveAndUpload => Some(Msg::SaveAndUpload),
        }
    }

    /// Export, upload with the current settings, and close on success
    pub async fn save_and_upload<C: Clipboard>(
        &mut self,
        settings: &dyn SettingsStore,
        pipeline: &mut UploadPipeline<C>,
        notifier: &mut dyn Notifier,
    ) -> Result<String, SaveError> {
        self.status.set_status(Status::Exporting);
        let png = match self.engine.export_png() {
            Ok(png) => png,
            Err(err) => {
                log::error!("Export failed: {}", err);
                self.status.set_status(Status::ExportFailed(err.to_string()));
                return Err(err.into());
            }
        };

        let config = settings.load();
        match pipeline.upload(&png, &config, &mut self.status).await {
            Ok(url) => {
                self.status.set_status(Status::Uploaded);
                pipeline.on_success(&url, notifier);
                self.closed = true;
                Ok(url)
            }
            Err(err) => {
                log::error!("Upload failed: {}", err);
                self.status.set_status(Status::UploadFailed(err.to_string()));
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point, Tool};

    fn session() -> AnnotationSession<Vec<Status>> {
        AnnotationSession::new(TextRenderer::default(), ToolState::default(), Vec::new())
    }

    fn capture() -> CaptureInput {
        let img = image::RgbaImage::from_pixel(40, 30, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        crate::render::image::write_png(&mut bytes, &img).unwrap();
        CaptureInput::from_image_bytes(&bytes)
    }

    #[test]
    fn missing_capture_is_reported_on_status_line() {
        let mut session = session();
        assert!(matches!(session.load_capture(None), Err(CaptureError::Missing)));
        assert_eq!(session.status().last(), Some(&Status::NoCapture));

        let empty = CaptureInput::default();
        assert!(session.load_capture(Some(&empty)).is_err());
        assert_eq!(session.status().last(), Some(&Status::NoCapture));
    }

    #[test]
    fn loaded_capture_is_ready() {
        let mut session = session();
        session.load_capture(Some(&capture())).unwrap();
        assert_eq!(session.status().last(), Some(&Status::Ready));
        assert_eq!(session.engine.canvas_size(), Some((40, 30)));
    }

    #[test]
    fn keyboard_text_entry_flow() {
        let mut session = session();
        session.load_capture(Some(&capture())).unwrap();
        session.handle_draw(DrawMsg::SelectTool(Tool::Text));
        session.handle_draw(DrawMsg::Pointer(PointerEvent::Down(Point::new(3.0, 4.0))));
        session.type_text("hi");
        session.type_text(" there");
        assert_eq!(session.handle_key(&Key::Enter, Modifiers::NONE), None);
        assert_eq!(session.engine.operations()[0].text_content(), Some("hi there"));

        // next entry starts empty and Escape discards it
        session.handle_draw(DrawMsg::Pointer(PointerEvent::Down(Point::new(5.0, 5.0))));
        session.type_text("nope");
        session.handle_key(&Key::Escape, Modifiers::NONE);
        assert_eq!(session.engine.operations().len(), 1);
    }

    #[test]
    fn ctrl_enter_requests_save() {
        let mut session = session();
        assert_eq!(
            session.handle_key(&Key::Enter, Modifiers::CTRL),
            Some(Msg::SaveAndUpload)
        );
    }

    #[tokio::test]
    async fn export_failure_aborts_before_upload() {
        let mut session = session();
        let mut pipeline = UploadPipeline::new(crate::upload::MemoryClipboard::default());
        let mut notified: Vec<crate::core::notify::CompletionSignal> = Vec::new();
        let settings = crate::config::UploadConfig::default();

        let result = session
            .save_and_upload(&settings, &mut pipeline, &mut notified)
            .await;
        assert!(matches!(result, Err(SaveError::Export(_))));
        assert!(matches!(session.status().last(), Some(Status::ExportFailed(_))));
        assert!(pipeline.clipboard().image.is_none());
        assert!(notified.is_empty());
    }
}
