// SPDX-License-Identifier: MIT
//
// Cell — one screen position: a character and how to draw it.
//
// Both grids of the ScreenBuffer are made of cells and the diff between
// frames compares them with `==`, so a cell is small, `Copy` and carries
// everything that decides what the terminal shows at that position.
//
// quill draws one codepoint per column. The ScreenBuffer replaces wide and
// zero-width characters before they get here, so a cell never spills into
// its neighbour.

use crate::color::CellColor;

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Rendition flags, one bit per SGR attribute quill uses.
    ///
    /// ```
    /// use quill_term::cell::Attr;
    ///
    /// let selected = Attr::INVERSE | Attr::BOLD;
    /// assert!(selected.contains(Attr::INVERSE));
    /// assert!(!selected.contains(Attr::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD          = 0b00_0001;
        /// SGR 2, faint.
        const DIM           = 0b00_0010;
        /// SGR 3.
        const ITALIC        = 0b00_0100;
        /// SGR 4.
        const UNDERLINE     = 0b00_1000;
        /// SGR 7, foreground and background swapped.
        const INVERSE       = 0b01_0000;
        /// SGR 9, crossed out.
        const STRIKETHROUGH = 0b10_0000;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Everything about a cell except its character.
///
/// The editor's theme resolves each style tag to one of these; the
/// `FrameWriter` only emits an SGR sequence when consecutive cells differ
/// in style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// The terminal's own colors, no attributes. What `CSI 0 m` selects.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Plain, except for the foreground.
    #[inline]
    #[must_use]
    pub const fn fg(color: CellColor) -> Self {
        Self { fg: color, ..Self::PLAIN }
    }

    /// Plain, except for the attributes.
    #[inline]
    #[must_use]
    pub const fn attrs(attrs: Attr) -> Self {
        Self { attrs, ..Self::PLAIN }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    #[inline]
    #[must_use]
    pub fn is_plain(self) -> bool {
        self == Self::PLAIN
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A character and its style. Always exactly one column wide.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A plain space. The terminal shows this wherever it has cleared or
    /// scrolled in a row with the rendition reset, so the ScreenBuffer
    /// fills its model of those rows with it.
    pub const EMPTY: Self = Self::new(' ');

    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self::styled(ch, Style::PLAIN)
    }

    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// Whether the cell is indistinguishable from a cleared position.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Compact form for test failures: only the parts that aren't plain.
impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Style { fg, bg, attrs } = self.style;
        write!(f, "Cell({:?}", self.ch)?;
        if fg != CellColor::Default {
            write!(f, ", fg={fg:?}")?;
        }
        if bg != CellColor::Default {
            write!(f, ", bg={bg:?}")?;
        }
        if !attrs.is_empty() {
            write!(f, ", {attrs:?}")?;
        }
        f.write_str(")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Size ────────────────────────────────────────────────────────────

    #[test]
    fn attributes_fit_in_a_byte() {
        assert_eq!(std::mem::size_of::<Attr>(), 1);
        assert_eq!(Attr::all().bits().count_ones(), 6);
    }

    // ── Empty cells ─────────────────────────────────────────────────────

    #[test]
    fn empty_cell_is_a_plain_space() {
        assert_eq!(Cell::EMPTY, Cell::new(' '));
        assert_eq!(Cell::default(), Cell::EMPTY);
        assert!(Cell::EMPTY.is_empty());
        assert!(Cell::EMPTY.style.is_plain());
    }

    #[test]
    fn any_character_or_style_makes_a_cell_non_empty() {
        assert!(!Cell::new('x').is_empty());
        assert!(!Cell::styled(' ', Style::attrs(Attr::INVERSE)).is_empty());
        assert!(!Cell::styled(' ', Style::PLAIN.with_bg(CellColor::BLUE)).is_empty());
    }

    // ── Styles ──────────────────────────────────────────────────────────

    #[test]
    fn builders_change_only_their_field() {
        let s = Style::fg(CellColor::RED);
        assert_eq!((s.bg, s.attrs), (CellColor::Default, Attr::empty()));

        let s = s.with_bg(CellColor::BLUE).with_attrs(Attr::BOLD);
        assert_eq!(s, Style { fg: CellColor::RED, bg: CellColor::BLUE, attrs: Attr::BOLD });
        assert!(!s.is_plain());
    }

    #[test]
    fn cells_compare_by_style_too() {
        assert_ne!(Cell::new('a'), Cell::styled('a', Style::attrs(Attr::DIM)));
    }

    // ── Debug ───────────────────────────────────────────────────────────

    #[test]
    fn debug_shows_only_non_plain_parts() {
        assert_eq!(format!("{:?}", Cell::new('a')), "Cell('a')");
        let c = Cell::styled('b', Style::fg(CellColor::GREEN).with_attrs(Attr::BOLD));
        assert_eq!(format!("{c:?}"), "Cell('b', fg=Ansi256(2), Attr(BOLD))");
    }
}
