//! Draw message handlers
//!
//! Translates pointer and toolbar messages into drawing engine calls. Pointer
//! positions arrive in display coordinates and are mapped into bitmap pixels
//! before they reach the engine.

use super::engine::DrawingEngine;
use crate::domain::{Point, Style, Tool, Viewport, display_size, display_to_canvas};
use crate::session::messages::{DrawMsg, PointerEvent};

/// Where the canvas is shown on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasLayout {
    /// Top-left corner of the displayed canvas
    pub offset: Point,
    /// Displayed size in display pixels
    pub shown: (u32, u32),
}

impl CanvasLayout {
    /// Layout for the engine's canvas fitted into `viewport` at `offset`
    pub fn fit(engine: &DrawingEngine, viewport: Viewport, offset: Point) -> Option<Self> {
        let (w, h) = engine.canvas_size()?;
        Some(Self {
            offset,
            shown: display_size(w, h, viewport),
        })
    }
}

/// Toolbar selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub style: Style,
}

/// Input adapter feeding one drawing engine
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    pub tools: ToolState,
    layout: Option<CanvasLayout>,
    dragging: bool,
}

impl InputAdapter {
    pub fn new(tools: ToolState) -> Self {
        Self {
            tools,
            layout: None,
            dragging: false,
        }
    }

    /// Without a layout, display and bitmap coordinates are identical
    pub fn set_layout(&mut self, layout: Option<CanvasLayout>) {
        self.layout = layout;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn to_canvas(&self, engine: &DrawingEngine, point: Point) -> Point {
        match (self.layout, engine.canvas_size()) {
            (Some(layout), Some(canvas)) => {
                display_to_canvas(point, layout.offset, layout.shown, canvas)
            }
            _ => point,
        }
    }

    /// Handle a DrawMsg against `engine`
    pub fn handle_draw_msg(&mut self, engine: &mut DrawingEngine, msg: DrawMsg) {
        match msg {
            DrawMsg::Pointer(event) => self.handle_pointer(engine, event),
            DrawMsg::SelectTool(tool) => self.select_tool(engine, tool),
            DrawMsg::CycleTool => self.select_tool(engine, self.tools.tool.next()),
            DrawMsg::SetColor(color) => self.tools.style.color = color,
            DrawMsg::SetStrokeWidth(width) => self.tools.style.stroke_width = width.max(1.0),
            DrawMsg::TextConfirm(text) => engine.confirm_text(&text, self.tools.style.clone()),
            DrawMsg::TextCancel => engine.cancel_text(),
            DrawMsg::Undo => engine.undo(),
            DrawMsg::Redo => engine.redo(),
        }
    }

    fn select_tool(&mut self, engine: &mut DrawingEngine, tool: Tool) {
        if self.dragging {
            self.dragging = false;
            engine.cancel_stroke();
        }
        self.tools.tool = tool;
    }

    fn handle_pointer(&mut self, engine: &mut DrawingEngine, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => {
                let p = self.to_canvas(engine, p);
                if self.tools.tool.is_shape() {
                    engine.begin_stroke(self.tools.tool, p, self.tools.style.clone());
                    self.dragging = true;
                } else {
                    engine.begin_text_entry(p);
                }
            }
            PointerEvent::Move(p) => {
                if self.dragging {
                    let p = self.to_canvas(engine, p);
                    engine.update_stroke(p);
                }
            }
            PointerEvent::Up(p) | PointerEvent::Leave(p) => {
                if self.dragging {
                    self.dragging = false;
                    let p = self.to_canvas(engine, p);
                    engine.commit_stroke(p);
                }
            }
        }
    }
}
