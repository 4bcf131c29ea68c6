//! Annotation operation types
//!
//! All operations store coordinates in background-bitmap pixel space.

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::config::ColorToken;

/// Drawing tool selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
}

impl Tool {
    /// Shape tools draw by dragging; text opens an entry instead
    pub fn is_shape(self) -> bool {
        !matches!(self, Tool::Text)
    }

    /// Get the next tool in the toolbar cycle
    pub fn next(self) -> Self {
        match self {
            Tool::Rectangle => Tool::Ellipse,
            Tool::Ellipse => Tool::Line,
            Tool::Line => Tool::Arrow,
            Tool::Arrow => Tool::Text,
            Tool::Text => Tool::Rectangle,
        }
    }
}

/// Stroke style captured at the moment an operation is committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: ColorToken,
    pub stroke_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: ColorToken::default(),
            stroke_width: 2.0,
        }
    }
}

/// Geometry of a committed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Rectangle { start: Point, end: Point },
    Ellipse { start: Point, end: Point },
    Line { start: Point, end: Point },
    Arrow { start: Point, end: Point },
    Text { at: Point, text: String },
}

/// One committed drawable element in the annotation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub shape: Shape,
    pub style: Style,
}

impl Operation {
    /// Build a drag shape for `tool`. Returns `None` for the text tool.
    pub fn stroke(tool: Tool, start: Point, end: Point, style: Style) -> Option<Self> {
        let shape = match tool {
            Tool::Rectangle => Shape::Rectangle { start, end },
            Tool::Ellipse => Shape::Ellipse { start, end },
            Tool::Line => Shape::Line { start, end },
            Tool::Arrow => Shape::Arrow { start, end },
            Tool::Text => return None,
        };
        Some(Self { shape, style })
    }

    pub fn text(at: Point, text: impl Into<String>, style: Style) -> Self {
        Self {
            shape: Shape::Text {
                at,
                text: text.into(),
            },
            style,
        }
    }

    pub fn tool(&self) -> Tool {
        match self.shape {
            Shape::Rectangle { .. } => Tool::Rectangle,
            Shape::Ellipse { .. } => Tool::Ellipse,
            Shape::Line { .. } => Tool::Line,
            Shape::Arrow { .. } => Tool::Arrow,
            Shape::Text { .. } => Tool::Text,
        }
    }

    /// Start and end points; text operations report the anchor twice
    pub fn endpoints(&self) -> (Point, Point) {
        match &self.shape {
            Shape::Rectangle { start, end }
            | Shape::Ellipse { start, end }
            | Shape::Line { start, end }
            | Shape::Arrow { start, end } => (*start, *end),
            Shape::Text { at, .. } => (*at, *at),
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.shape {
            Shape::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
