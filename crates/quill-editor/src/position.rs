//! Text position and span types.
//!
//! All coordinates are **0-indexed**. Row 0 is the first row of the document,
//! column 0 is the first character. Columns count chars (single codepoints),
//! never bytes, so a column is always a valid index into a row's `Vec<char>`.
//!
//! Display layers (status line) convert to 1-indexed for the user; that
//! conversion never belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a document: (row, column), both 0-indexed.
///
/// `col` may equal the row length: that is the end-of-row position, where
/// the cursor sits after the last character.
///
/// Positions sort in reading order: by row, then by column within a row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Row 0, column 0.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True when both row and col are zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.row == 0 && self.col == 0
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A half-open span of a document: `[start, end)`.
///
/// Spans are never inverted: `start <= end` always holds. Build one from
/// two arbitrary positions (a selection's anchor and cursor) with
/// [`Span::ordered`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Create a span. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.row < end.row || (start.row == end.row && start.col <= end.col),
            "Span::new requires start <= end"
        );
        Self { start, end }
    }

    /// Create a span from two positions in either order. The earlier
    /// position becomes `start`.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width span at `pos`.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// True when `pos` falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Number of rows this span touches. An empty span returns 1.
    #[inline]
    #[must_use]
    pub const fn row_span(self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// The rows a row-wise action (shift, comment toggle) applies to.
    ///
    /// A multi-row span that ends at column 0 doesn't include its last row:
    /// selecting whole lines with shift-down leaves the cursor at the start
    /// of the following row.
    #[inline]
    #[must_use]
    pub const fn covered_rows(self) -> std::ops::RangeInclusive<usize> {
        let last = if self.end.col == 0 && self.end.row > self.start.row {
            self.end.row - 1
        } else {
            self.end.row
        };
        self.start.row..=last
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Span({}:{} .. {}:{})",
            self.start.row, self.start.col, self.end.row, self.end.col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position -----------------------------------------------------------

    #[test]
    fn position_zero() {
        assert!(Position::ZERO.is_zero());
        assert!(!Position::new(0, 1).is_zero());
        assert_eq!(Position::default(), Position::ZERO);
    }

    #[test]
    fn position_ordering() {
        assert!(Position::new(1, 3) < Position::new(1, 7));
        assert!(Position::new(0, 100) < Position::new(1, 0));
        assert!(Position::new(3, 3) <= Position::new(3, 3));
    }

    #[test]
    fn sorting_positions_walks_the_document() {
        let mut seen = vec![
            Position::new(2, 0),
            Position::new(0, 9),
            Position::new(1, 0),
            Position::ZERO,
            Position::new(0, 3),
        ];
        seen.sort();
        let walked: Vec<_> = seen.iter().map(|p| (p.row, p.col)).collect();
        assert_eq!(walked, [(0, 0), (0, 3), (0, 9), (1, 0), (2, 0)]);
    }

    #[test]
    fn debug_is_zero_based_display_is_one_based() {
        let pos = Position::new(4, 0);
        assert_eq!(format!("{pos:?}"), "Pos(4:0)");
        assert_eq!(pos.to_string(), "5:1");
    }

    // -- Span ---------------------------------------------------------------

    #[test]
    fn span_ordered_swaps_when_needed() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let s = Span::ordered(a, b);
        assert_eq!(s.start, b);
        assert_eq!(s.end, a);
        assert_eq!(Span::ordered(b, a), s);
    }

    #[test]
    fn span_point_is_empty() {
        let s = Span::point(Position::new(3, 7));
        assert!(s.is_empty());
        assert!(!s.contains(Position::new(3, 7)));
    }

    #[test]
    fn span_contains_is_half_open() {
        let s = Span::new(Position::new(1, 0), Position::new(3, 0));
        assert!(s.contains(Position::new(1, 0)));
        assert!(s.contains(Position::new(2, 50)));
        assert!(!s.contains(Position::new(3, 0)));
        assert!(!s.contains(Position::new(0, 100)));
    }

    #[test]
    fn span_row_span() {
        assert_eq!(Span::new(Position::ZERO, Position::new(0, 5)).row_span(), 1);
        assert_eq!(Span::new(Position::ZERO, Position::new(2, 5)).row_span(), 3);
    }

    #[test]
    fn covered_rows_drops_row_ending_at_column_zero() {
        let s = Span::new(Position::new(1, 2), Position::new(3, 0));
        assert_eq!(s.covered_rows(), 1..=2);

        let s = Span::new(Position::new(1, 2), Position::new(3, 1));
        assert_eq!(s.covered_rows(), 1..=3);

        // A single-row span keeps its row even at column 0.
        let s = Span::point(Position::new(4, 0));
        assert_eq!(s.covered_rows(), 4..=4);
    }

    #[test]
    fn span_formats() {
        let s = Span::new(Position::new(1, 2), Position::new(3, 4));
        assert_eq!(format!("{s:?}"), "Span(1:2 .. 3:4)");
        assert_eq!(format!("{s}"), "2:3-4:5");
    }
}
