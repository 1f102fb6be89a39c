//! Incremental lexer — lexical state that follows the cursor.
//!
//! The [`Lexer`] holds the engine's state *at the cursor*, plus a snapshot of
//! the state at the start of every row the cursor has reached:
//!
//! - **Forward**: each character the cursor crosses is fed to the engine.
//!   Crossing a row break snapshots the state for the new row.
//! - **Backward**: the engine can't un-parse, so the lexer restores the
//!   target row's snapshot and replays the row up to the target column.
//! - **Edits** to a row make every later snapshot stale. They're dropped and
//!   rebuilt as the cursor next moves forward over those rows.
//!
//! Invariant: `snapshots[r + 1]` is what scanning row `r` from
//! `snapshots[r]` (plus the row break) produces, for every stored pair.
//! [`first_inconsistent_row`](Lexer::first_inconsistent_row) checks it.
//!
//! Snapshots share their bracket stacks (see [`crate::language::state`]), so
//! keeping one per row costs little more than the modes and depths.

use std::fmt;

use crate::document::{Document, ROW_BREAK};
use crate::language::{LanguageEngine, LexicalState};

pub struct Lexer {
    engine: &'static dyn LanguageEngine,
    state: LexicalState,
    /// State at column 0 of each row, from row 0 up to the furthest row
    /// reached since the last edit above it.
    snapshots: Vec<LexicalState>,
}

impl Lexer {
    /// A lexer at the start of a document.
    #[must_use]
    pub fn new(engine: &'static dyn LanguageEngine) -> Self {
        let state = engine.new_state();
        Self {
            engine,
            snapshots: vec![state.clone()],
            state,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn engine(&self) -> &'static dyn LanguageEngine {
        self.engine
    }

    /// The state at the cursor.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &LexicalState {
        &self.state
    }

    /// The state at the start of `row`, if the lexer has been there.
    #[must_use]
    pub fn snapshot(&self, row: usize) -> Option<&LexicalState> {
        self.snapshots.get(row)
    }

    /// Rows with a valid snapshot (always at least one).
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    // -- Driving ------------------------------------------------------------

    /// Feed the character the cursor just crossed.
    #[inline]
    pub fn advance(&mut self, ch: char) {
        self.engine.parse(&mut self.state, ch);
    }

    /// The cursor just crossed into column 0 of `row`; snapshot the state.
    ///
    /// # Panics
    ///
    /// Panics if `row` skips past the rows that have snapshots.
    pub fn enter_row(&mut self, row: usize) {
        assert!(
            row <= self.snapshots.len(),
            "entered row {row} with snapshots only up to row {}",
            self.snapshots.len()
        );
        if row < self.snapshots.len() {
            self.snapshots[row] = self.state.clone();
        } else {
            self.snapshots.push(self.state.clone());
        }
    }

    /// Jump to the start of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` has no snapshot.
    pub fn restore(&mut self, row: usize) {
        match self.snapshots.get(row) {
            Some(snapshot) => self.state = snapshot.clone(),
            None => panic!(
                "no snapshot for row {row}; only {} rows lexed",
                self.snapshots.len()
            ),
        }
    }

    /// Jump to `row` and scan `prefix`, the row's characters before the
    /// target column.
    pub fn replay(&mut self, row: usize, prefix: &[char]) {
        self.restore(row);
        for &ch in prefix {
            self.advance(ch);
        }
    }

    /// Row `row` changed; drop every snapshot after it.
    pub fn invalidate_after(&mut self, row: usize) {
        self.snapshots.truncate(row + 1);
    }

    /// Switch engines and forget everything lexed so far.
    pub fn reset(&mut self, engine: &'static dyn LanguageEngine) {
        *self = Self::new(engine);
    }

    // -- Checking -----------------------------------------------------------

    /// The first row whose successor's snapshot isn't what scanning the row
    /// produces, or `None` when every stored snapshot is consistent.
    #[must_use]
    pub fn first_inconsistent_row(&self, doc: &Document) -> Option<usize> {
        let mut state = self.snapshots.first()?.clone();
        for row in 0..self.snapshots.len() - 1 {
            if row >= doc.row_count() {
                return Some(row);
            }
            for &ch in doc.row(row) {
                self.engine.parse(&mut state, ch);
            }
            self.engine.parse(&mut state, ROW_BREAK);
            if state != self.snapshots[row + 1] {
                return Some(row);
            }
            state = self.snapshots[row + 1].clone();
        }
        None
    }
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
