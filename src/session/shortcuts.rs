use crate::domain::Tool;
use crate::session::messages::{DrawMsg, Msg};

/// Keys the annotation surface reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(String),
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        control: false,
        shift: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        control: true,
        shift: false,
    };
}

/// Map a key press to a session message.
///
/// `text_entry` is the current contents of the open text entry, if any; while
/// it is open Enter confirms and Escape cancels, and other keys are typing.
pub fn handle_key_event(key: &Key, modifiers: Modifiers, text_entry: Option<&str>) -> Option<Msg> {
    if let Some(text) = text_entry {
        return match key {
            Key::Enter => Some(Msg::text_confirm(text)),
            Key::Escape => Some(Msg::text_cancel()),
            _ => None,
        };
    }

    match key {
        // Undo/redo shortcuts
        Key::Character(c)
            if c.eq_ignore_ascii_case("z") && modifiers.control && !modifiers.shift =>
        {
            Some(Msg::undo())
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case("y") && modifiers.control)
                || (c.eq_ignore_ascii_case("z") && modifiers.control && modifiers.shift) =>
        {
            Some(Msg::redo())
        }
        Key::Enter if modifiers.control => Some(Msg::SaveAndUpload),
        Key::Character(c) if !modifiers.control => {
            let tool = match c.as_str() {
                "r" => Tool::Rectangle,
                "e" => Tool::Ellipse,
                "l" => Tool::Line,
                "a" => Tool::Arrow,
                "t" => Tool::Text,
                "T" if modifiers.shift => return Some(Msg::Draw(DrawMsg::CycleTool)),
                _ => return None,
            };
            Some(Msg::select_tool(tool))
        }
        _ => None,
    }
}
