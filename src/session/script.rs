//! Scripted drawing steps for headless sessions

use serde::{Deserialize, Serialize};

use super::AnnotationSession;
use super::messages::{DrawMsg, PointerEvent};
use super::status::StatusLine;
use crate::config::ColorToken;
use crate::domain::{Point, Tool};

/// One scripted input step, in bitmap coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum ScriptStep {
    Tool { tool: Tool },
    Color { color: ColorToken },
    Width { width: f32 },
    /// Press at `from`, move through `via`, release at `to`
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        via: Vec<Point>,
    },
    /// Open a text entry at `at` and confirm `text`
    Text { at: Point, text: String },
    Undo,
    Redo,
}

impl ScriptStep {
    fn messages(self) -> Vec<DrawMsg> {
        match self {
            ScriptStep::Tool { tool } => vec![DrawMsg::SelectTool(tool)],
            ScriptStep::Color { color } => vec![DrawMsg::SetColor(color)],
            ScriptStep::Width { width } => vec![DrawMsg::SetStrokeWidth(width)],
            ScriptStep::Drag { from, to, via } => {
                let mut msgs = vec![DrawMsg::Pointer(PointerEvent::Down(from))];
                msgs.extend(
                    via.into_iter()
                        .chain(std::iter::once(to))
                        .map(|p| DrawMsg::Pointer(PointerEvent::Move(p))),
                );
                msgs.push(DrawMsg::Pointer(PointerEvent::Up(to)));
                msgs
            }
            ScriptStep::Text { at, text } => vec![
                DrawMsg::SelectTool(Tool::Text),
                DrawMsg::Pointer(PointerEvent::Down(at)),
                DrawMsg::TextConfirm(text),
            ],
            ScriptStep::Undo => vec![DrawMsg::Undo],
            ScriptStep::Redo => vec![DrawMsg::Redo],
        }
    }
}

/// Parse a JSON array of steps
pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Feed `steps` through the session's input adapter
pub fn replay<S: StatusLine>(session: &mut AnnotationSession<S>, steps: Vec<ScriptStep>) {
    log::debug!("Replaying {} script steps", steps.len());
    for step in steps {
        for msg in step.messages() {
            session.handle_draw(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::ToolState;
    use crate::domain::Shape;
    use crate::render::text::TextRenderer;
    use crate::session::status::Status;

    fn session() -> AnnotationSession<Vec<Status>> {
        let mut session =
            AnnotationSession::new(TextRenderer::default(), ToolState::default(), Vec::new());
        session
            .engine
            .set_background(image::RgbaImage::new(120, 80), None, None)
            .unwrap();
        session
    }

    #[test]
    fn parses_tagged_steps() {
        let steps = parse_script(
            r##"[
                {"step": "tool", "tool": "arrow"},
                {"step": "color", "color": "#00ff00"},
                {"step": "drag", "from": {"x": 1, "y": 2}, "to": {"x": 30, "y": 40}},
                {"step": "text", "at": {"x": 5, "y": 5}, "text": "hi"},
                {"step": "undo"}
            ]"##,
        )
        .unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], ScriptStep::Tool { tool: Tool::Arrow });
        assert!(matches!(&steps[2], ScriptStep::Drag { via, .. } if via.is_empty()));
    }

    #[test]
    fn replay_builds_the_operation_log() {
        let mut session = session();
        let steps = vec![
            ScriptStep::Tool {
                tool: Tool::Line,
            },
            ScriptStep::Drag {
                from: Point::new(10.0, 10.0),
                to: Point::new(60.0, 30.0),
                via: vec![Point::new(20.0, 15.0)],
            },
            ScriptStep::Text {
                at: Point::new(5.0, 50.0),
                text: "note".into(),
            },
            ScriptStep::Undo,
        ];
        replay(&mut session, steps);

        let ops = session.engine.operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0].shape,
            Shape::Line {
                start: Point::new(10.0, 10.0),
                end: Point::new(60.0, 30.0),
            }
        );
        assert_eq!(session.engine.redo_buffer().len(), 1);

        replay(&mut session, vec![ScriptStep::Redo]);
        assert_eq!(session.engine.operations()[1].text_content(), Some("note"));
    }
}
