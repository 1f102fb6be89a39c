//! Theme — style tags and the styles they paint with.
//!
//! Language engines and the editor chrome never pick colors. They name what
//! a cell *is* with a [`StyleTag`], and the [`Theme`] decides how it looks.

use quill_term::cell::{Attr, Style};
use quill_term::color::CellColor;

/// What a painted cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Code,
    Error,
    SingleQuoted,
    DoubleQuoted,
    Template,
    LineComment,
    BlockComment,
    Regexp,
    Selected,
    Prompt,
    Status,
    Hint,
}

impl StyleTag {
    pub const ALL: [Self; 12] = [
        Self::Code,
        Self::Error,
        Self::SingleQuoted,
        Self::DoubleQuoted,
        Self::Template,
        Self::LineComment,
        Self::BlockComment,
        Self::Regexp,
        Self::Selected,
        Self::Prompt,
        Self::Status,
        Self::Hint,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// A style for every [`StyleTag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    styles: [Style; StyleTag::ALL.len()],
}

impl Theme {
    /// The built-in 16-color theme.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            styles: [
                Style::fg(CellColor::WHITE),
                Style::fg(CellColor::RED),
                Style::fg(CellColor::BRIGHT_GREEN),
                Style::fg(CellColor::BRIGHT_BLUE),
                Style::fg(CellColor::BRIGHT_MAGENTA),
                Style::fg(CellColor::BRIGHT_YELLOW),
                Style::fg(CellColor::BRIGHT_CYAN),
                Style::fg(CellColor::GREEN),
                Style::attrs(Attr::INVERSE),
                Style::attrs(Attr::BOLD),
                Style::attrs(Attr::INVERSE),
                Style::attrs(Attr::DIM),
            ],
        }
    }

    /// The style for `tag`; untagged cells are plain.
    #[inline]
    #[must_use]
    pub const fn style(&self, tag: Option<StyleTag>) -> Style {
        match tag {
            Some(tag) => self.styles[tag.index()],
            None => Style::PLAIN,
        }
    }

    /// Override the style of one tag.
    #[must_use]
    pub const fn with(mut self, tag: StyleTag, style: Style) -> Self {
        self.styles[tag.index()] = style;
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::standard()
    }
}
