//! Document — the rows of text being edited.
//!
//! A `Document` is an ordered list of rows, each a `Vec<char>` of single
//! codepoints with no embedded line breaks. There is always at least one row;
//! an empty document is one empty row.
//!
//! The document owns no cursor state. Every mutation takes an explicit
//! [`Position`], and only the row being edited (plus the one it splits into
//! or merges with) is touched; other rows are never renumbered except by the
//! shift that follows a split or join.
//!
//! Row breaks inside a flattened span of characters are written as `'\r'`.
//! That is what [`span_chars`](Document::span_chars) produces, what
//! [`peek`](Document::peek) returns at the end of a non-final row, and what
//! language engines see when the cursor crosses a row boundary.

use std::fmt;

use crate::position::{Position, Span};

/// The row-break sentinel inside flattened character sequences.
pub const ROW_BREAK: char = '\r';

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line ending style of a file, detected on load and preserved on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// `CrLf` when every line break in `text` is preceded by `\r`, `Lf`
    /// otherwise (including text with no line breaks at all).
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let mut lines = text.split('\n');
        lines.next_back();
        let mut breaks = 0;
        for line in lines {
            if !line.ends_with('\r') {
                return Self::Lf;
            }
            breaks += 1;
        }
        if breaks > 0 {
            Self::CrLf
        } else {
            Self::Lf
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Rows of single-codepoint characters.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    rows: Vec<Vec<char>>,
    line_ending: LineEnding,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// A document with one empty row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![Vec::new()],
            line_ending: LineEnding::Lf,
        }
    }

    /// Split `text` into rows on `\n`. CRLF files have the `\r` stripped
    /// from every row and remember their line ending for [`to_text`].
    ///
    /// A trailing newline produces a final empty row, so
    /// `from_text(s).to_text() == s`.
    ///
    /// [`to_text`]: Self::to_text
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let rows = text
            .split('\n')
            .map(|line| {
                let line = match line_ending {
                    LineEnding::CrLf => line.strip_suffix('\r').unwrap_or(line),
                    LineEnding::Lf => line,
                };
                line.chars().collect()
            })
            .collect();
        Self { rows, line_ending }
    }

    /// All rows joined with the document's line ending.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push_str(self.line_ending.as_str());
            }
            out.extend(row.iter());
        }
        out
    }

    // -- Queries ------------------------------------------------------------

    /// Number of rows. Always at least 1.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn last_row(&self) -> usize {
        self.rows.len() - 1
    }

    /// The characters of `row`. Panics if `row` is out of range.
    #[inline]
    #[must_use]
    pub fn row(&self, row: usize) -> &[char] {
        &self.rows[row]
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Length of `row` in chars. Panics if `row` is out of range.
    #[inline]
    #[must_use]
    pub fn row_len(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    /// The row as a `String`, for searching and display.
    #[must_use]
    pub fn row_text(&self, row: usize) -> String {
        self.rows.get(row).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// The character at `pos`, or `None` at end of row or out of range.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    /// True when `pos` is the end of its row.
    #[inline]
    #[must_use]
    pub fn is_eol(&self, pos: Position) -> bool {
        pos.col >= self.rows[pos.row].len()
    }

    /// True when `pos` is the very end of the document.
    #[inline]
    #[must_use]
    pub fn is_end(&self, pos: Position) -> bool {
        pos.row == self.last_row() && self.is_eol(pos)
    }

    /// The character the cursor would cross moving forward from `pos`:
    /// the char itself, or [`ROW_BREAK`] at the end of a non-final row.
    ///
    /// # Panics
    ///
    /// Panics at the end of the document. Callers check
    /// [`is_end`](Self::is_end) first.
    #[must_use]
    pub fn peek(&self, pos: Position) -> char {
        if let Some(&ch) = self.rows[pos.row].get(pos.col) {
            ch
        } else if pos.row < self.last_row() {
            ROW_BREAK
        } else {
            panic!("peek past end of document at {pos:?}; check is_end first")
        }
    }

    /// Clamp `pos` to an existing row and a column within it.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.last_row());
        Position::new(row, pos.col.min(self.rows[row].len()))
    }

    /// The position after the last character of the document.
    #[must_use]
    pub fn end(&self) -> Position {
        let row = self.last_row();
        Position::new(row, self.rows[row].len())
    }

    /// The characters of `span`, with [`ROW_BREAK`] between rows.
    #[must_use]
    pub fn span_chars(&self, span: Span) -> Vec<char> {
        let mut out = Vec::new();
        for row in span.start.row..=span.end.row {
            let chars = &self.rows[row];
            let from = if row == span.start.row { span.start.col } else { 0 };
            let to = if row == span.end.row {
                span.end.col.min(chars.len())
            } else {
                chars.len()
            };
            if from < to {
                out.extend_from_slice(&chars[from..to]);
            }
            if row < span.end.row {
                out.push(ROW_BREAK);
            }
        }
        out
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    #[inline]
    pub const fn set_line_ending(&mut self, ending: LineEnding) {
        self.line_ending = ending;
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert `ch` before the character at `pos`.
    pub fn insert_at(&mut self, pos: Position, ch: char) {
        self.rows[pos.row].insert(pos.col, ch);
    }

    /// Delete `n` characters starting at `pos`. Deleting at the end of a row
    /// joins the next row onto it (and counts as one character). Returns
    /// false when nothing was deleted, i.e. `pos` is the end of the document.
    pub fn delete_at(&mut self, pos: Position, n: usize) -> bool {
        let mut changed = false;
        for _ in 0..n {
            if pos.col < self.rows[pos.row].len() {
                self.rows[pos.row].remove(pos.col);
                changed = true;
            } else if self.join_row(pos.row) {
                changed = true;
            } else {
                break;
            }
        }
        changed
    }

    /// Split the row at `pos`: everything from `pos.col` on becomes a new row
    /// right after it.
    pub fn split_at(&mut self, pos: Position) {
        let rest = self.rows[pos.row].split_off(pos.col);
        self.rows.insert(pos.row + 1, rest);
    }

    /// Append row `row + 1` to `row`. Returns false if `row` is the last row.
    pub fn join_row(&mut self, row: usize) -> bool {
        if row + 1 >= self.rows.len() {
            return false;
        }
        let next = self.rows.remove(row + 1);
        self.rows[row].extend(next);
        true
    }

    /// Replace the contents of `row`, returning the old contents.
    pub fn replace_row(&mut self, row: usize, chars: Vec<char>) -> Vec<char> {
        std::mem::replace(&mut self.rows[row], chars)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("rows", &self.rows.len())
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
