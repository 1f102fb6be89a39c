// SPDX-License-Identifier: MIT
//
// Grid — a 2D block of cells.
//
// The ScreenBuffer keeps two of these: what the terminal shows and what the
// editor wants it to show. Besides plain cell access a grid can shift its
// content inside a band of rows, which is how the in-memory copy of the
// terminal is kept in lock-step with a hardware scroll.
//
// Flat `Vec<Cell>` with row-major indexing: a row's cells are contiguous,
// so left-to-right scanning (what the diff does) is a linear walk.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;

/// Shown in place of characters that don't occupy exactly one column.
pub const SUBSTITUTE: char = '\u{00b7}';

/// The character to put in a cell for `ch`.
///
/// Tabs and other controls, combining marks and double-width characters
/// would desynchronize the grid from the terminal, so they are replaced by
/// [`SUBSTITUTE`].
///
/// ```
/// use quill_term::grid::{cell_char, SUBSTITUTE};
///
/// assert_eq!(cell_char('a'), 'a');
/// assert_eq!(cell_char('\t'), SUBSTITUTE);
/// assert_eq!(cell_char('中'), SUBSTITUTE);
/// ```
#[inline]
#[must_use]
pub fn cell_char(ch: char) -> char {
    if ch.width() == Some(1) { ch } else { SUBSTITUTE }
}

/// A `width × height` block of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Column `x` of rows `top..bottom`.
    pub fn column(&self, x: u16, top: u16, bottom: u16) -> impl Iterator<Item = &Cell> + '_ {
        (top..bottom.min(self.height)).filter_map(move |y| self.get(x, y))
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Write a cell. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Copy another grid of the same size into this one.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "grid size mismatch"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    /// Resize the grid, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    // ─── Shifting ────────────────────────────────────────────────────────
    //
    // These mirror what a terminal does for SU, SD, SL and SR inside a
    // DECSTBM region spanning rows `top..bottom` and the full width: content
    // moves by one, and the exposed row or column is blank.

    /// Move rows `top+1..bottom` up by one; row `bottom-1` becomes blank.
    pub fn scroll_up(&mut self, top: u16, bottom: u16) {
        let bottom = bottom.min(self.height);
        if top >= bottom {
            return;
        }
        let w = usize::from(self.width);
        let start = self.index(0, top);
        let end = self.index(0, bottom);
        self.cells.copy_within(start + w..end, start);
        self.cells[end - w..end].fill(Cell::EMPTY);
    }

    /// Move rows `top..bottom-1` down by one; row `top` becomes blank.
    pub fn scroll_down(&mut self, top: u16, bottom: u16) {
        let bottom = bottom.min(self.height);
        if top >= bottom {
            return;
        }
        let w = usize::from(self.width);
        let start = self.index(0, top);
        let end = self.index(0, bottom);
        self.cells.copy_within(start..end - w, start + w);
        self.cells[start..start + w].fill(Cell::EMPTY);
    }

    /// Move every row of `top..bottom` one column left; the last column
    /// becomes blank.
    pub fn shift_left(&mut self, top: u16, bottom: u16) {
        let w = usize::from(self.width);
        if w == 0 {
            return;
        }
        for y in top..bottom.min(self.height) {
            let start = self.index(0, y);
            let row = &mut self.cells[start..start + w];
            row.copy_within(1.., 0);
            row[w - 1] = Cell::EMPTY;
        }
    }

    /// Move every row of `top..bottom` one column right; the first column
    /// becomes blank.
    pub fn shift_right(&mut self, top: u16, bottom: u16) {
        let w = usize::from(self.width);
        if w == 0 {
            return;
        }
        for y in top..bottom.min(self.height) {
            let start = self.index(0, y);
            let row = &mut self.cells[start..start + w];
            row.copy_within(..w - 1, 1);
            row[0] = Cell::EMPTY;
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Fill row `y` with the characters of `s`.
    fn put(grid: &mut Grid, y: u16, s: &str) {
        for (x, ch) in (0u16..).zip(s.chars()) {
            grid.set(x, y, Cell::new(ch));
        }
    }

    fn lines(grid: &Grid) -> Vec<String> {
        (0..grid.height())
            .map(|y| grid.row(y).unwrap().iter().map(|c| c.ch).collect())
            .collect()
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_grid_is_blank() {
        let g = Grid::new(3, 2);
        assert_eq!(lines(&g), vec!["   ", "   "]);
    }

    #[test]
    fn zero_size_grid() {
        let g = Grid::new(0, 0);
        assert!(g.get(0, 0).is_none());
        assert!(g.row(0).is_none());
    }

    // ── Access ──────────────────────────────────────────────────────────

    #[test]
    fn set_and_get() {
        let mut g = Grid::new(4, 2);
        assert!(g.set(3, 1, Cell::new('x')));
        assert_eq!(g.get(3, 1).unwrap().ch, 'x');
        assert!(!g.set(4, 1, Cell::new('y')));
        assert!(g.get(0, 2).is_none());
    }

    #[test]
    fn column_slices_band() {
        let mut g = Grid::new(2, 3);
        put(&mut g, 0, "ab");
        put(&mut g, 1, "cd");
        put(&mut g, 2, "ef");
        let col: String = g.column(1, 1, 3).map(|c| c.ch).collect();
        assert_eq!(col, "df");
    }

    #[test]
    fn resize_clears() {
        let mut g = Grid::new(2, 2);
        put(&mut g, 0, "ab");
        g.resize(3, 1);
        assert_eq!(lines(&g), vec!["   "]);
    }

    #[test]
    fn copy_from_same_size() {
        let mut a = Grid::new(2, 1);
        let mut b = Grid::new(2, 1);
        put(&mut b, 0, "hi");
        a.copy_from(&b);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "grid size mismatch")]
    fn copy_from_mismatch_panics() {
        let mut a = Grid::new(2, 1);
        a.copy_from(&Grid::new(1, 2));
    }

    // ── Shifting ────────────────────────────────────────────────────────

    fn sample() -> Grid {
        let mut g = Grid::new(3, 4);
        put(&mut g, 0, "aaa");
        put(&mut g, 1, "bbb");
        put(&mut g, 2, "ccc");
        put(&mut g, 3, "ddd");
        g
    }

    #[test]
    fn scroll_up_within_band() {
        let mut g = sample();
        g.scroll_up(0, 3);
        assert_eq!(lines(&g), vec!["bbb", "ccc", "   ", "ddd"]);
    }

    #[test]
    fn scroll_down_within_band() {
        let mut g = sample();
        g.scroll_down(1, 4);
        assert_eq!(lines(&g), vec!["aaa", "   ", "bbb", "ccc"]);
    }

    #[test]
    fn shift_left_within_band() {
        let mut g = Grid::new(3, 2);
        put(&mut g, 0, "abc");
        put(&mut g, 1, "def");
        g.shift_left(0, 1);
        assert_eq!(lines(&g), vec!["bc ", "def"]);
    }

    #[test]
    fn shift_right_within_band() {
        let mut g = Grid::new(3, 2);
        put(&mut g, 0, "abc");
        put(&mut g, 1, "def");
        g.shift_right(0, 2);
        assert_eq!(lines(&g), vec![" ab", " de"]);
    }

    #[test]
    fn empty_band_is_noop() {
        let mut g = sample();
        g.scroll_up(2, 2);
        g.scroll_down(3, 1);
        assert_eq!(g, sample());
    }

    // ── Cell characters ─────────────────────────────────────────────────

    #[test]
    fn cell_char_substitutes_non_single_width() {
        assert_eq!(cell_char('x'), 'x');
        assert_eq!(cell_char('é'), 'é');
        assert_eq!(cell_char('\u{7f}'), SUBSTITUTE);
        assert_eq!(cell_char('\u{301}'), SUBSTITUTE);
        assert_eq!(cell_char('🔥'), SUBSTITUTE);
    }
}
