//! Linear undo/redo over full shape snapshots.
//!
//! The cursor always points at a valid entry. Committing after an undo drops
//! every entry past the cursor, so there is no redo branch to get lost in.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::doc::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Vec<Shape>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start a history whose only entry is `initial`.
    #[must_use]
    pub fn new(initial: Vec<Shape>) -> Self {
        Self { entries: vec![initial], cursor: 0 }
    }

    /// Record `shapes` as the newest state, discarding any redo entries.
    pub fn commit(&mut self, shapes: &[Shape]) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(shapes.to_vec());
        self.cursor = self.entries.len() - 1;
        tracing::debug!(cursor = self.cursor, shapes = shapes.len(), "history commit");
    }

    /// Step back one entry and return a copy of it, or `None` at the start.
    pub fn undo(&mut self) -> Option<Vec<Shape>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "history undo");
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward one entry and return a copy of it, or `None` at the end.
    pub fn redo(&mut self) -> Option<Vec<Shape>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "history redo");
        Some(self.entries[self.cursor].clone())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> &[Shape] {
        &self.entries[self.cursor]
    }
}
