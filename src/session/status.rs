//! Single-line status reporting for the annotation surface

use std::fmt;

/// Everything the status line can show
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    NoCapture,
    Exporting,
    ExportFailed(String),
    UploadingMultipart,
    WritingClipboard,
    UploadingClipboard,
    Uploaded,
    UploadFailed(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::NoCapture | Status::ExportFailed(_) | Status::UploadFailed(_)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Ready"),
            Status::NoCapture => f.write_str("No capture data available"),
            Status::Exporting => f.write_str("Exporting image…"),
            Status::ExportFailed(cause) => write!(f, "Export failed: {cause}"),
            Status::UploadingMultipart => f.write_str("Uploading (multipart)…"),
            Status::WritingClipboard => f.write_str("Writing clipboard…"),
            Status::UploadingClipboard => f.write_str("Uploading (clipboard)…"),
            Status::Uploaded => f.write_str("Upload succeeded"),
            Status::UploadFailed(cause) => write!(f, "Upload failed: {cause}"),
        }
    }
}

/// Receiver of status updates
pub trait StatusLine {
    fn set_status(&mut self, status: Status);
}

/// Status line that only logs
#[derive(Debug, Default)]
pub struct LogStatus;

impl StatusLine for LogStatus {
    fn set_status(&mut self, status: Status) {
        if status.is_error() {
            log::warn!("{}", status);
        } else {
            log::info!("{}", status);
        }
    }
}

/// Keeps every update; the last one is what the user sees
impl StatusLine for Vec<Status> {
    fn set_status(&mut self, status: Status) {
        self.push(status);
    }
}

impl<S: StatusLine + ?Sized> StatusLine for &mut S {
    fn set_status(&mut self, status: Status) {
        (**self).set_status(status);
    }
}
