//! Cursor — position, sticky column, and selection anchor.
//!
//! The `Cursor` is a plain value: where the caret is, which column vertical
//! movement should aim for, and where the selection started. It does not own
//! or reference the document, and it never moves itself. Every move goes
//! through the editor, because crossing a character also has to drive the
//! lexer (see [`crate::lexer`]).
//!
//! # Sticky column
//!
//! Moving up or down through a short row clamps the column, but the cursor
//! remembers the column it wanted. Reaching a long row again snaps back to
//! it. Horizontal movement and edits reset the sticky column.
//!
//! # Selection
//!
//! When `anchor` is set, the text between the anchor and the cursor is
//! selected. [`span`](Cursor::span) orders the two ends; callers don't care
//! which way the user dragged. An anchor equal to the cursor is an empty
//! selection and counts as no selection at all.

use crate::position::{Position, Span};

/// A cursor in a document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,

    /// Remembered column for vertical movement.
    sticky_col: usize,

    /// The end of the selection that stays put while the cursor moves.
    anchor: Option<Position>,
}

impl Cursor {
    /// A cursor at the origin with no selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.pos.row
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// True when an anchor is set and differs from the cursor position.
    #[inline]
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.pos)
    }

    /// The selected span, if any. Never inverted, never empty.
    #[must_use]
    pub fn selection(&self) -> Option<Span> {
        self.anchor
            .filter(|&a| a != self.pos)
            .map(|a| Span::ordered(a, self.pos))
    }

    /// The selected span.
    ///
    /// # Panics
    ///
    /// Panics without a selection. Callers check
    /// [`has_selection`](Self::has_selection) first.
    #[must_use]
    pub fn span(&self) -> Span {
        match self.selection() {
            Some(span) => span,
            None => panic!("span() without a selection; check has_selection first"),
        }
    }

    // -- Mutation -----------------------------------------------------------

    /// Place the cursor. Only the editor calls this, in step with the lexer.
    #[inline]
    pub(crate) const fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Remember the current column for vertical movement.
    #[inline]
    pub const fn reset_sticky(&mut self) {
        self.sticky_col = self.pos.col;
    }

    /// Anchor the selection at the current position.
    #[inline]
    pub const fn set_anchor(&mut self) {
        self.anchor = Some(self.pos);
    }

    #[inline]
    pub const fn set_anchor_at(&mut self, pos: Position) {
        self.anchor = Some(pos);
    }

    /// Anchor at `pos` unless an anchor is already set.
    #[inline]
    pub const fn ensure_anchor(&mut self, pos: Position) {
        if self.anchor.is_none() {
            self.anchor = Some(pos);
        }
    }

    #[inline]
    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(row: usize, col: usize) -> Cursor {
        let mut c = Cursor::new();
        c.set_position(Position::new(row, col));
        c
    }

    // -- Basics -------------------------------------------------------------

    #[test]
    fn new_cursor_has_no_selection() {
        let c = Cursor::new();
        assert_eq!(c.position(), Position::ZERO);
        assert!(!c.has_selection());
        assert!(c.selection().is_none());
    }

    #[test]
    fn sticky_follows_reset() {
        let mut c = at(2, 7);
        assert_eq!(c.sticky_col(), 0);
        c.reset_sticky();
        assert_eq!(c.sticky_col(), 7);
        c.set_position(Position::new(3, 1));
        assert_eq!(c.sticky_col(), 7);
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn backward_selection_is_normalized() {
        let mut c = at(3, 4);
        c.set_anchor();
        c.set_position(Position::new(1, 2));
        assert_eq!(
            c.span(),
            Span::new(Position::new(1, 2), Position::new(3, 4))
        );
    }

    #[test]
    fn empty_anchor_is_no_selection() {
        let mut c = at(1, 1);
        c.set_anchor();
        assert!(c.anchor().is_some());
        assert!(!c.has_selection());
        assert!(c.selection().is_none());
    }

    #[test]
    fn ensure_anchor_keeps_existing() {
        let mut c = at(0, 5);
        c.ensure_anchor(Position::new(0, 1));
        c.ensure_anchor(Position::new(0, 3));
        assert_eq!(c.anchor(), Some(Position::new(0, 1)));
        c.clear_anchor();
        assert_eq!(c.anchor(), None);
    }

    #[test]
    #[should_panic(expected = "check has_selection first")]
    fn span_without_selection_panics() {
        let _ = Cursor::new().span();
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn selection_is_never_inverted(
            cr in 0usize..50, cc in 0usize..50,
            ar in 0usize..50, ac in 0usize..50,
        ) {
            let mut c = at(cr, cc);
            c.set_anchor_at(Position::new(ar, ac));
            if let Some(span) = c.selection() {
                prop_assert!(span.start < span.end);
                let ends = [span.start, span.end];
                prop_assert!(ends.contains(&c.position()));
                prop_assert!(ends.contains(&Position::new(ar, ac)));
            } else {
                prop_assert_eq!(Position::new(ar, ac), c.position());
            }
        }
    }
}
