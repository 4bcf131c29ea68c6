//! Capture hand-off module
//!
//! Decodes the captured viewport and applies the optional region selection.

pub mod image;

pub use self::image::{CaptureInput, crop_to_selection, decode_data_uri};
