//! Bounded undo/redo history of block snapshots.

use super::Block;

/// Snapshots kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Undo and redo stacks for one content model.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoStack {
    undo: Vec<Vec<Block>>,
    redo: Vec<Vec<Block>>,
    limit: usize,
    /// Set while an edit is running, so nested edits record once
    recording: bool,
}

impl UndoStack {
    /// Create a history keeping at most `limit` undo steps.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
            recording: false,
        }
    }

    /// Number of steps that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of steps that can be redone.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drop every recorded step.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub(crate) fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.recording, true)
    }

    pub(crate) fn end(&mut self) {
        self.recording = false;
    }

    /// Record the state before an edit. A new edit invalidates redo.
    pub(crate) fn record(&mut self, before: Vec<Block>) {
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.remove(0);
        }
        self.undo.push(before);
        self.redo.clear();
    }

    /// Swap `current` for the previous snapshot.
    pub(crate) fn undo(&mut self, current: &mut Vec<Block>) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                self.redo.push(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Swap `current` for the next snapshot.
    pub(crate) fn redo(&mut self, current: &mut Vec<Block>) -> bool {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
