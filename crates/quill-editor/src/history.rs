//! Undo/redo history — action-based edit tracking.
//!
//! Every undoable command leaves one [`UndoRecord`] describing exactly what
//! its inverse needs. The record is the atomic unit of undo/redo:
//!
//! - **Undo** applies the record's inverse and moves it to the redo stack.
//! - **Redo** runs the command again from the record's inputs (cursor,
//!   selection, typed characters) rather than replaying a stored result, so
//!   the redone state is the state the command produces.
//!
//! Applying records needs the whole editor (cursor movement drives the
//! lexer), so that lives in [`crate::actions`]. This module only keeps the
//! stacks.
//!
//! # Coalescing
//!
//! Typing extends the previous [`UndoRecord::Type`] while the cursor sits
//! where that run ended and the run's last character isn't a space. One
//! undo takes back a word, not a letter.

use crate::position::Position;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// What a backspace removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Char(char),
    /// The break between two rows.
    RowBreak,
}

/// Which way selected rows were shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

/// A reversible description of one command's edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoRecord {
    /// A run of typed characters inserted at `at`, ending at `end`.
    Type {
        at: Position,
        chars: Vec<char>,
        end: Position,
    },

    /// A backspace from `at` that removed `removed` and left the cursor at
    /// `to`.
    Backspace {
        at: Position,
        to: Position,
        removed: Removed,
    },

    /// A row broken at `at`, followed by `indent` inserted characters on the
    /// new row.
    Return { at: Position, indent: usize },

    /// A cut of the selection between `cursor` and `anchor`.
    Cut {
        cursor: Position,
        anchor: Position,
        chars: Vec<char>,
    },

    /// `chars` pasted at `at`. `erased` is the selection the paste
    /// replaced, as `(cursor, anchor, chars)`.
    Paste {
        at: Position,
        chars: Vec<char>,
        erased: Option<(Position, Position, Vec<char>)>,
    },

    /// `spaces` spaces inserted at `at`.
    Tab { at: Position, spaces: usize },

    /// A closer typed at `at` on a blank row, after the row's `old_count`
    /// spaces were replaced by the dedented indent.
    ClosedBlock {
        at: Position,
        old_count: usize,
        ch: char,
    },

    /// Selected rows shifted. `rows` holds each changed row's old contents.
    ShiftSelection {
        direction: ShiftDirection,
        cursor: Position,
        anchor: Position,
        rows: Vec<(usize, Vec<char>)>,
    },

    /// Line comments toggled on the selected rows.
    ToggleComment {
        cursor: Position,
        anchor: Position,
        rows: Vec<(usize, Vec<char>)>,
    },

    /// A find-replace of `target` with `replacement` at `at`.
    Replace {
        at: Position,
        target: Vec<char>,
        replacement: Vec<char>,
    },
}

impl UndoRecord {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::Backspace { .. } => "backspace",
            Self::Return { .. } => "return",
            Self::Cut { .. } => "cut",
            Self::Paste { .. } => "paste",
            Self::Tab { .. } => "tab",
            Self::ClosedBlock { .. } => "closed-block",
            Self::ShiftSelection {
                direction: ShiftDirection::Left,
                ..
            } => "shift-selection-left",
            Self::ShiftSelection {
                direction: ShiftDirection::Right,
                ..
            } => "shift-selection-right",
            Self::ToggleComment { .. } => "toggle-comment",
            Self::Replace { .. } => "replace",
        }
    }

    /// True if a character typed at `cursor` should join this record.
    #[must_use]
    pub fn continues_typing(&self, cursor: Position) -> bool {
        match self {
            Self::Type { chars, end, .. } => *end == cursor && chars.last() != Some(&' '),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo stacks for one editor.
///
/// New records clear the redo stack (branching history is not supported:
/// any new edit after an undo discards the forward history).
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Record a new edit.
    pub fn push(&mut self, record: UndoRecord) {
        self.redo_stack.clear();
        self.undo_stack.push(record);
    }

    /// The most recent record, for coalescing.
    pub fn last_mut(&mut self) -> Option<&mut UndoRecord> {
        self.undo_stack.last_mut()
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Take the record to undo.
    pub fn pop_undo(&mut self) -> Option<UndoRecord> {
        self.undo_stack.pop()
    }

    /// Take the record to redo.
    pub fn pop_redo(&mut self) -> Option<UndoRecord> {
        self.redo_stack.pop()
    }

    /// File a record whose inverse was just applied.
    pub fn push_undone(&mut self, record: UndoRecord) {
        self.redo_stack.push(record);
    }

    /// File a record that was just redone. Leaves the redo stack alone.
    pub fn push_redone(&mut self, record: UndoRecord) {
        self.undo_stack.push(record);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(at: Position, s: &str) -> UndoRecord {
        let chars: Vec<char> = s.chars().collect();
        let end = Position::new(at.row, at.col + chars.len());
        UndoRecord::Type { at, chars, end }
    }

    // -- Coalescing ---------------------------------------------------------

    #[test]
    fn typing_continues_at_run_end() {
        let rec = typed(Position::ZERO, "hel");
        assert!(rec.continues_typing(Position::new(0, 3)));
        assert!(!rec.continues_typing(Position::new(0, 2)));
    }

    #[test]
    fn space_ends_a_run() {
        let rec = typed(Position::ZERO, "hello ");
        assert!(!rec.continues_typing(Position::new(0, 6)));
    }

    #[test]
    fn other_records_never_continue() {
        let rec = UndoRecord::Tab {
            at: Position::ZERO,
            spaces: 2,
        };
        assert!(!rec.continues_typing(Position::new(0, 2)));
    }

    // -- Stacks -------------------------------------------------------------

    #[test]
    fn undo_nothing() {
        let mut h = History::new();
        assert!(!h.can_undo());
        assert_eq!(h.pop_undo(), None);
        assert_eq!(h.pop_redo(), None);
    }

    #[test]
    fn undo_then_redo_moves_records() {
        let mut h = History::new();
        h.push(typed(Position::ZERO, "a"));
        let rec = h.pop_undo().unwrap();
        h.push_undone(rec);
        assert_eq!(h.undo_count(), 0);
        assert_eq!(h.redo_count(), 1);

        let rec = h.pop_redo().unwrap();
        h.push_redone(rec);
        assert_eq!(h.undo_count(), 1);
        assert!(!h.can_redo());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut h = History::new();
        h.push(typed(Position::ZERO, "a"));
        h.push(typed(Position::new(1, 0), "b"));
        let rec = h.pop_undo().unwrap();
        h.push_undone(rec);
        assert!(h.can_redo());

        h.push(UndoRecord::Return {
            at: Position::ZERO,
            indent: 0,
        });
        assert!(!h.can_redo());
        assert_eq!(h.undo_count(), 2);
    }

    #[test]
    fn redone_records_keep_remaining_redo() {
        let mut h = History::new();
        h.push(typed(Position::ZERO, "a"));
        h.push(typed(Position::new(1, 0), "b"));
        for _ in 0..2 {
            let rec = h.pop_undo().unwrap();
            h.push_undone(rec);
        }
        let rec = h.pop_redo().unwrap();
        h.push_redone(rec);
        assert_eq!(h.redo_count(), 1);
    }

    #[test]
    fn last_mut_extends_a_run() {
        let mut h = History::new();
        h.push(typed(Position::ZERO, "h"));
        if let Some(UndoRecord::Type { chars, end, .. }) = h.last_mut() {
            chars.push('i');
            end.col += 1;
        }
        assert_eq!(h.pop_undo(), Some(typed(Position::ZERO, "hi")));
    }

    #[test]
    fn kinds() {
        assert_eq!(typed(Position::ZERO, "x").kind(), "type");
        let rec = UndoRecord::ShiftSelection {
            direction: ShiftDirection::Left,
            cursor: Position::ZERO,
            anchor: Position::new(2, 0),
            rows: Vec::new(),
        };
        assert_eq!(rec.kind(), "shift-selection-left");
    }
}
