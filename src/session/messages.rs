//! Message types for the annotation session
//!
//! This module contains:
//! - DrawMsg with the drawing actions an input layer can request
//! - Msg, the top-level message including save

use crate::config::ColorToken;
use crate::domain::{Point, Tool};

/// Pointer activity in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer left the canvas; finishes a drag like `Up`
    Leave(Point),
}

/// All drawing/annotation messages
#[derive(Debug, Clone, PartialEq)]
pub enum DrawMsg {
    Pointer(PointerEvent),
    SelectTool(Tool),
    CycleTool,
    SetColor(ColorToken),
    SetStrokeWidth(f32),
    /// Confirm the open text entry with its contents
    TextConfirm(String),
    TextCancel,
    Undo,
    Redo,
}

/// Top-level session messages
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Draw(DrawMsg),
    /// Export the canvas and upload it
    SaveAndUpload,
}

impl Msg {
    pub fn undo() -> Self {
        Msg::Draw(DrawMsg::Undo)
    }

    pub fn redo() -> Self {
        Msg::Draw(DrawMsg::Redo)
    }

    pub fn text_confirm(text: impl Into<String>) -> Self {
        Msg::Draw(DrawMsg::TextConfirm(text.into()))
    }

    pub fn text_cancel() -> Self {
        Msg::Draw(DrawMsg::TextCancel)
    }

    pub fn select_tool(tool: Tool) -> Self {
        Msg::Draw(DrawMsg::SelectTool(tool))
    }
}
