//! Upload module
//!
//! This module contains:
//! - The multipart / clipboard-trigger upload pipeline
//! - Clipboard access used by the fallback strategy

pub mod clipboard;
pub mod pipeline;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use pipeline::UploadPipeline;
