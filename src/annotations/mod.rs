//! Annotation canvas and input handling
//!
//! This module provides:
//! - The drawing engine (operation log, preview, undo/redo, export)
//! - Message handlers that drive the engine from pointer/toolbar input

pub mod engine;
pub mod handlers;

pub use engine::DrawingEngine;
pub use handlers::{CanvasLayout, InputAdapter, ToolState};
