//! Snapshot-based undo/redo.
//!
//! Every committing mutation stores the whole pre-mutation document. Undo
//! costs O(document size) per step, which keeps undo/redo ordering trivially
//! correct.

use crate::canvas::Document;

/// Undo and redo stacks of document snapshots. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Document>,
    redo_stack: Vec<Document>,
    /// Maximum number of undo snapshots kept (`None` = unbounded).
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` undo snapshots, dropping the oldest first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the pre-mutation state. Clears the redo stack.
    pub fn record(&mut self, before: Document) {
        self.undo_stack.push(before);
        self.redo_stack.clear();

        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Restore the last recorded state into `current`.
    /// Returns false (and leaves `current` alone) if there is nothing to undo.
    pub fn undo(&mut self, current: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone state into `current`.
    pub fn redo(&mut self, current: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history (e.g. after loading a document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
