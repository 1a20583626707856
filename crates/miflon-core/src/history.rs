//! Bounded linear undo history over image snapshots.
//!
//! The stack holds full snapshots, the first of which is normally the image as
//! loaded. Pushing after an undo drops the entries past the cursor; pushing
//! past the depth limit evicts the oldest snapshot. There is no redo.

use std::collections::VecDeque;

use crate::buffer::PixelBuffer;

/// Snapshots kept when no depth is given.
pub const DEFAULT_HISTORY_DEPTH: usize = 20;

/// Result of [`HistoryStack::undo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome<'a> {
    /// The cursor moved back; this is the snapshot now current.
    Restored(&'a PixelBuffer),
    /// Already at the oldest snapshot, or the stack is empty.
    NothingToUndo,
}

impl UndoOutcome<'_> {
    pub fn is_restored(&self) -> bool {
        matches!(self, UndoOutcome::Restored(_))
    }
}

/// Linear snapshot history with a cursor and a maximum depth.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<PixelBuffer>,
    cursor: usize,
    max_depth: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl HistoryStack {
    /// Create an empty history holding at most `max_depth` snapshots (min 1).
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            entries: VecDeque::with_capacity(max_depth),
            cursor: 0,
            max_depth,
        }
    }

    /// Record a new current snapshot.
    pub fn push(&mut self, buffer: &PixelBuffer) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(buffer.clone());
        while self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one snapshot.
    pub fn undo(&mut self) -> UndoOutcome<'_> {
        if self.cursor == 0 {
            return UndoOutcome::NothingToUndo;
        }
        self.cursor -= 1;
        UndoOutcome::Restored(&self.entries[self.cursor])
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> Option<&PixelBuffer> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Drop everything, e.g. when a new image is loaded.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Number of snapshots held, including any past the cursor.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: u8) -> PixelBuffer {
        PixelBuffer::filled(2, 2, [value, value, value])
    }

    #[test]
    fn test_empty_history() {
        let mut history = HistoryStack::default();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
        assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_single_entry_cannot_undo() {
        let mut history = HistoryStack::new(5);
        history.push(&snapshot(0));
        assert!(!history.can_undo());
        assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(history.current(), Some(&snapshot(0)));
    }

    #[test]
    fn test_undo_walks_back() {
        let mut history = HistoryStack::new(5);
        for v in 0..3 {
            history.push(&snapshot(v));
        }
        assert_eq!(history.undo(), UndoOutcome::Restored(&snapshot(1)));
        assert_eq!(history.undo(), UndoOutcome::Restored(&snapshot(0)));
        assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
        assert_eq!(history.current(), Some(&snapshot(0)));
    }

    #[test]
    fn test_push_after_undo_discards_forward() {
        let mut history = HistoryStack::new(5);
        for v in 0..4 {
            history.push(&snapshot(v));
        }
        history.undo();
        history.undo();
        history.push(&snapshot(9));

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&snapshot(9)));
        assert_eq!(history.undo(), UndoOutcome::Restored(&snapshot(1)));
    }

    #[test]
    fn test_eviction_shifts_cursor() {
        let mut history = HistoryStack::new(3);
        for v in 0..5 {
            history.push(&snapshot(v));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.undo(), UndoOutcome::Restored(&snapshot(3)));
        assert_eq!(history.undo(), UndoOutcome::Restored(&snapshot(2)));
        assert_eq!(history.undo(), UndoOutcome::NothingToUndo);
    }

    #[test]
    fn test_zero_depth_is_one() {
        let mut history = HistoryStack::new(0);
        history.push(&snapshot(1));
        history.push(&snapshot(2));
        assert_eq!(history.max_depth(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&snapshot(2)));
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryStack::new(3);
        history.push(&snapshot(1));
        history.push(&snapshot(2));
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
