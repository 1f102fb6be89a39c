// SPDX-License-Identifier: MIT
//
// ScreenBuffer — double-buffered differential renderer with hardware scroll.
//
// Two grids of equal size:
//
//   current — what the terminal displays right now. Only `draw()` touches
//             it, and only in lock-step with bytes it emits.
//   next    — what the editor wants displayed. Painters call `set()` on it
//             between draws.
//
// `draw()` emits ANSI only for cells where the two differ, copying each
// written cell into `current`. Unchanged rows are skipped with a single
// slice comparison.
//
// Scrolling the viewport by one row would otherwise rewrite every cell of
// the text area. When the caller says which way the view just moved, `draw()`
// first checks whether the move really looks like a one-row (or one-column)
// shift of the scroll region: row 1 of `current` equal to row 0 of `next`
// for an upward scroll, and so on. If it does, a single SU/SD/SL/SR inside a
// DECSTBM region does the bulk of the work, `current` is shifted to match,
// and the diff only fills in the exposed row or column. Without a direction
// from the caller the check is never made, so coincidental matches between
// frames can't trigger a scroll.
//
// The per-frame pipeline:
//
//   1. Painters write into `next` (set, put_str, clear_row).
//   2. draw(scroll) → hardware scroll (maybe), cell diff, cursor placement.
//   3. flush_to() sends everything in one write.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Cell, Style};
use crate::grid::{Grid, cell_char};
use crate::output::FrameWriter;

// ─── ScrollDirection ─────────────────────────────────────────────────────────

/// Which way the content of the scroll region just moved by one step.
///
/// `Up` means the text moved up: the view advanced one row down the
/// document, exposing a new row at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a draw, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from `current` and were written.
    pub cells_rendered: usize,
    /// Cells that already matched and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
    /// Whether the hardware scroll fast path was taken.
    pub scrolled: bool,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── ScreenBuffer ────────────────────────────────────────────────────────────

/// Double-buffered terminal screen.
///
/// ```
/// use quill_term::cell::Style;
/// use quill_term::screen::ScreenBuffer;
///
/// let mut screen = ScreenBuffer::new(20, 5);
/// screen.put_str(0, 0, "hello", Style::PLAIN);
/// screen.set_cursor(5, 0);
///
/// let stats = screen.draw(None);
/// assert_eq!(stats.cells_rendered, 5);
///
/// // Nothing changed: the next draw writes no cells.
/// assert_eq!(screen.draw(None).cells_rendered, 0);
/// ```
pub struct ScreenBuffer {
    current: Grid,
    next: Grid,
    out: FrameWriter,
    cursor: (u16, u16),
    region: (u16, u16),
    needs_clear: bool,
    bell: bool,
}

impl ScreenBuffer {
    /// Create a screen of the given size. The first draw clears the terminal.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            current: Grid::new(width, height),
            next: Grid::new(width, height),
            out: FrameWriter::new(),
            cursor: (0, 0),
            region: (0, height),
            needs_clear: true,
            bell: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.next.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.next.height()
    }

    /// What the terminal is showing, as far as this buffer knows.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> &Grid {
        &self.current
    }

    /// What the next draw will make the terminal show.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> &Grid {
        &self.next
    }

    /// Resize both grids. Everything is repainted on the next draw.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.current.resize(width, height);
        self.next.resize(width, height);
        self.region = (0, height);
        let (x, y) = self.cursor;
        self.cursor = (x.min(width.saturating_sub(1)), y.min(height.saturating_sub(1)));
        self.needs_clear = true;
    }

    /// Forget what the terminal shows; the next draw clears and repaints.
    pub const fn force_redraw(&mut self) {
        self.needs_clear = true;
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Set one cell of the next frame. Out-of-range positions are ignored.
    #[inline]
    pub fn set(&mut self, col: u16, row: u16, ch: char, style: Style) {
        self.next.set(col, row, Cell::styled(cell_char(ch), style));
    }

    /// Write `text` starting at `(col, row)`, clipped at the right edge.
    /// Returns the column after the last character written.
    pub fn put_str(&mut self, col: u16, row: u16, text: &str, style: Style) -> u16 {
        let mut x = col;
        for ch in text.chars() {
            if x >= self.width() {
                break;
            }
            self.set(x, row, ch, style);
            x += 1;
        }
        x
    }

    /// Fill columns `from..width` of `row` with blanks in `style`.
    pub fn clear_row(&mut self, row: u16, from: u16, style: Style) {
        for x in from..self.width() {
            self.set(x, row, ' ', style);
        }
    }

    /// Where the hardware cursor goes after the next draw.
    pub const fn set_cursor(&mut self, col: u16, row: u16) {
        self.cursor = (col, row);
    }

    /// Rows `top..bottom` form the band that hardware scrolls apply to.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let bottom = bottom.min(self.height());
        self.region = (top.min(bottom), bottom);
    }

    /// Ring the bell as part of the next draw.
    pub const fn bell(&mut self) {
        self.bell = true;
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Bring the terminal from `current` to `next`.
    ///
    /// `scroll` is the direction the caller's viewport just moved, if it
    /// moved by exactly one row or column. Output accumulates until
    /// [`flush_to`](Self::flush_to).
    pub fn draw(&mut self, scroll: Option<ScrollDirection>) -> RenderStats {
        self.out.clear();
        let mut stats = RenderStats::default();

        ansi::begin_sync(&mut self.out).ok();
        ansi::cursor_hide(&mut self.out).ok();

        if self.needs_clear {
            ansi::reset(&mut self.out).ok();
            ansi::clear_screen(&mut self.out).ok();
            self.current.clear();
            self.needs_clear = false;
        } else if let Some(direction) = scroll {
            stats.scrolled = self.hardware_scroll(direction);
        }

        let width = self.next.width();
        for y in 0..self.next.height() {
            if self.current.row(y) == self.next.row(y) {
                stats.cells_skipped += usize::from(width);
                continue;
            }
            for x in 0..width {
                let Some(&cell) = self.next.get(x, y) else {
                    continue;
                };
                if self.current.get(x, y) == Some(&cell) {
                    stats.cells_skipped += 1;
                } else {
                    self.out.cell(x, y, cell);
                    self.current.set(x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(&mut self.out).ok();
        if std::mem::take(&mut self.bell) {
            ansi::bell(&mut self.out).ok();
        }
        let (x, y) = self.cursor;
        ansi::cursor_to(&mut self.out, x, y).ok();
        ansi::cursor_show(&mut self.out).ok();
        ansi::end_sync(&mut self.out).ok();

        stats.bytes_written = self.out.len();
        stats
    }

    /// Shift the scroll region by one step if `current` and `next` agree
    /// that's what happened. Returns whether a scroll was emitted.
    fn hardware_scroll(&mut self, direction: ScrollDirection) -> bool {
        let (top, bottom) = self.region;
        let vertical = matches!(direction, ScrollDirection::Up | ScrollDirection::Down);
        if vertical && bottom.saturating_sub(top) < 2 {
            return false;
        }
        if !vertical && (top >= bottom || self.width() < 2) {
            return false;
        }

        let (cur, next) = (&self.current, &self.next);
        let shifted = match direction {
            ScrollDirection::Up => cur.row(top + 1) == next.row(top),
            ScrollDirection::Down => cur.row(top) == next.row(top + 1),
            ScrollDirection::Left => cur.column(1, top, bottom).eq(next.column(0, top, bottom)),
            ScrollDirection::Right => cur.column(0, top, bottom).eq(next.column(1, top, bottom)),
        };
        if !shifted {
            return false;
        }

        // Exposed cells take the current rendition, so make it the default.
        ansi::reset(&mut self.out).ok();
        ansi::set_scroll_region(&mut self.out, top, bottom).ok();
        match direction {
            ScrollDirection::Up => {
                ansi::scroll_up(&mut self.out, 1).ok();
                self.current.scroll_up(top, bottom);
            }
            ScrollDirection::Down => {
                ansi::scroll_down(&mut self.out, 1).ok();
                self.current.scroll_down(top, bottom);
            }
            ScrollDirection::Left => {
                ansi::scroll_left(&mut self.out, 1).ok();
                self.current.shift_left(top, bottom);
            }
            ScrollDirection::Right => {
                ansi::scroll_right(&mut self.out, 1).ok();
                self.current.shift_right(top, bottom);
            }
        }
        ansi::reset_scroll_region(&mut self.out).ok();
        self.out.forget();
        tracing::trace!("hardware scroll {direction:?} in rows {top}..{bottom}");
        true
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// The raw ANSI bytes from the last draw.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.out.bytes()
    }

    /// Write the last draw's output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.out.flush_to(w)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
