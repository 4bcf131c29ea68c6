use crate::domain::{Operation, Point, Style, Tool};

/// Committed operations plus the redo buffer (linear history, no branching)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationLog {
    operations: Vec<Operation>,
    redo: Vec<Operation>,
}

impl OperationLog {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Undone operations; the last element is restored first by [`Self::redo`]
    pub fn redo_buffer(&self) -> &[Operation] {
        &self.redo
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Append a committed operation; any redo history is dropped
    pub fn add(&mut self, operation: Operation) {
        self.redo.clear();
        self.operations.push(operation);
    }

    /// Returns false when there was nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.operations.pop() {
            Some(op) => {
                self.redo.push(op);
                true
            }
            None => false,
        }
    }

    /// Returns false when there was nothing to redo
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(op) => {
                self.operations.push(op);
                true
            }
            None => false,
        }
    }
}

/// Shape being dragged but not yet committed
#[derive(Clone, Debug, PartialEq)]
pub struct PendingStroke {
    pub tool: Tool,
    pub anchor: Point,
    pub style: Style,
}

/// The single open text entry
#[derive(Clone, Debug, PartialEq)]
pub struct TextEntry {
    pub at: Point,
}
