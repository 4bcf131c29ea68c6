//! System clipboard access via arboard

use std::borrow::Cow;
use std::time::Duration;

use crate::error::ClipboardError;

/// Clipboard operations needed by the upload pipeline
pub trait Clipboard {
    /// Place an encoded PNG on the clipboard as an image
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError>;

    /// Place plain text on the clipboard
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// How long the copied URL is served when no clipboard manager takes it over
const TEXT_HOLD: Duration = Duration::from_secs(10);

/// The OS clipboard.
///
/// One handle is opened on first use and kept for the pipeline's lifetime;
/// on X11 and Wayland the data is only served while that handle is alive.
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
    text_hold: Duration,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            handle: None,
            text_hold: TEXT_HOLD,
        }
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.handle.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|err| ClipboardError(err.to_string()))?;
            self.handle = Some(clipboard);
        }
        self.handle
            .as_mut()
            .ok_or_else(|| ClipboardError("clipboard unavailable".into()))
    }
}

impl Clipboard for SystemClipboard {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        let rgba = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .map_err(|err| ClipboardError(err.to_string()))?
            .to_rgba8();
        // arboard wants ImageData { width, height, bytes } in RGBA order.
        let data = arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        };
        self.handle()?
            .set_image(data)
            .map_err(|err| ClipboardError(err.to_string()))?;
        log::debug!("Wrote image to system clipboard");
        Ok(())
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        // the process usually exits right after this; serve the URL until a
        // clipboard manager or another client takes ownership
        let deadline = std::time::Instant::now() + self.text_hold;
        self.handle()?
            .set()
            .wait_until(deadline)
            .text(text.to_string())
            .map_err(|err| ClipboardError(err.to_string()))
    }

    #[cfg(not(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    )))]
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.handle()?
            .set_text(text.to_string())
            .map_err(|err| ClipboardError(err.to_string()))
    }
}

/// In-memory clipboard for headless runs
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryClipboard {
    pub image: Option<Vec<u8>>,
    pub text: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        self.image = Some(png.to_vec());
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

impl<C: Clipboard + ?Sized> Clipboard for &mut C {
    fn write_image(&mut self, png: &[u8]) -> Result<(), ClipboardError> {
        (**self).write_image(png)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clipboard_reuses_one_handle() {
        let mut clipboard = SystemClipboard::new();
        clipboard.text_hold = Duration::ZERO;
        if clipboard.write_text("first").is_err() {
            // no display server available
            return;
        }
        assert!(clipboard.handle.is_some());
        clipboard.write_text("https://img.example/1.png").unwrap();
        // the handle that set the text still owns the selection
        assert_eq!(
            clipboard.handle.as_mut().unwrap().get_text().unwrap(),
            "https://img.example/1.png"
        );
    }
}
