// SPDX-License-Identifier: MIT
//
// Terminal cell colors.
//
// The editor never does color math: every style resolves to one of the
// three encodings a terminal understands directly. The sixteen classic
// ANSI colors are palette indices 0–15 and get named constants, since
// syntax styles are defined in terms of them and follow the user's
// terminal palette.

/// A color as the terminal sees it.
///
/// This is what lives inside a [`Cell`](crate::cell::Cell) and what the
/// SGR encoders in [`ansi`](crate::ansi) turn into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index. 0–15 are the user's themed colors.
    Ansi256(u8),

    /// Terminal default color (inherits from terminal settings).
    #[default]
    Default,
}

impl CellColor {
    pub const BLACK: Self = Self::Ansi256(0);
    pub const RED: Self = Self::Ansi256(1);
    pub const GREEN: Self = Self::Ansi256(2);
    pub const YELLOW: Self = Self::Ansi256(3);
    pub const BLUE: Self = Self::Ansi256(4);
    pub const MAGENTA: Self = Self::Ansi256(5);
    pub const CYAN: Self = Self::Ansi256(6);
    pub const WHITE: Self = Self::Ansi256(7);
    pub const BRIGHT_BLACK: Self = Self::Ansi256(8);
    pub const BRIGHT_RED: Self = Self::Ansi256(9);
    pub const BRIGHT_GREEN: Self = Self::Ansi256(10);
    pub const BRIGHT_YELLOW: Self = Self::Ansi256(11);
    pub const BRIGHT_BLUE: Self = Self::Ansi256(12);
    pub const BRIGHT_MAGENTA: Self = Self::Ansi256(13);
    pub const BRIGHT_CYAN: Self = Self::Ansi256(14);
    pub const BRIGHT_WHITE: Self = Self::Ansi256(15);

    /// Whether this is one of the sixteen themed palette entries.
    #[inline]
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Ansi256(idx) if idx < 16)
    }
}
