//! Language engines.
//!
//! A [`LanguageEngine`] is a character-at-a-time state machine over a
//! [`LexicalState`]. It knows nothing about rows or cursors; the
//! [`Lexer`](crate::lexer::Lexer) feeds it characters as the cursor crosses
//! them, with [`ROW_BREAK`](crate::document::ROW_BREAK) standing in for the
//! end of each row.
//!
//! Engines are stateless values registered in a static table. Which one a
//! document uses is picked from its file extension, falling back to
//! [`PlainText`].

mod c_family;
mod javascript;
mod plain;
pub mod scan;
pub mod state;

use std::path::Path;

pub use c_family::CFamily;
pub use javascript::JavaScript;
pub use plain::PlainText;
pub use state::{ErrorKind, LexicalState, Marker, Mode};

use crate::theme::StyleTag;

/// A language's lexical rules.
pub trait LanguageEngine: Sync {
    /// Display name, e.g. `"JavaScript"`.
    fn name(&self) -> &'static str;

    /// File extensions (without the dot) this engine handles.
    fn extensions(&self) -> &'static [&'static str];

    /// The state at the start of a document.
    fn new_state(&self) -> LexicalState {
        LexicalState::new()
    }

    /// Advance `state` across `ch`.
    fn parse(&self, state: &mut LexicalState, ch: char);

    /// True when typing `ch` in `state` opens a block.
    fn should_open_block(&self, _state: &LexicalState, _ch: char) -> bool {
        false
    }

    /// True when typing `ch` in `state` closes the innermost block, so a
    /// blank row it's typed on can be dedented first.
    fn should_close_block(&self, _state: &LexicalState, _ch: char) -> bool {
        false
    }

    /// Style for the character about to be crossed in `state`.
    fn style(&self, _state: &LexicalState) -> Option<StyleTag> {
        None
    }

    /// Style that overrides [`style`](Self::style) for the character just
    /// crossed, given the state after crossing it.
    fn style_of_prior_char(&self, _state: &LexicalState) -> Option<StyleTag> {
        None
    }

    /// The line-comment marker, or `""` when the language has none.
    fn comment_marker(&self) -> &'static str {
        ""
    }

    /// True when `row` is entirely a line comment.
    fn is_comment_line(&self, row: &[char]) -> bool {
        let marker = self.comment_marker();
        if marker.is_empty() {
            return false;
        }
        let text = row.iter().copied().skip_while(|&ch| ch == ' ');
        let mut marker_chars = marker.chars();
        text.zip(marker_chars.by_ref()).all(|(a, b)| a == b) && marker_chars.next().is_none()
    }

    /// Characters to insert after the indent when a row is broken in `state`.
    fn line_continuation(&self, _state: &LexicalState) -> &'static str {
        ""
    }
}

impl std::fmt::Debug for dyn LanguageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

static PLAIN_TEXT: PlainText = PlainText;
static JAVASCRIPT: JavaScript = JavaScript;
static C_FAMILY: CFamily = CFamily;

static ENGINES: [&dyn LanguageEngine; 3] = [&PLAIN_TEXT, &JAVASCRIPT, &C_FAMILY];

/// The fallback engine.
#[must_use]
pub fn plain_text() -> &'static dyn LanguageEngine {
    &PLAIN_TEXT
}

/// The engine for `path`'s extension, or plain text.
#[must_use]
pub fn for_path(path: &Path) -> &'static dyn LanguageEngine {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            ENGINES
                .iter()
                .copied()
                .find(|engine| engine.extensions().iter().any(|e| *e == ext))
        })
        .unwrap_or(&PLAIN_TEXT)
}

/// The engine by display name, ignoring case.
#[cfg(test)]
#[must_use]
pub(crate) fn by_name(name: &str) -> Option<&'static dyn LanguageEngine> {
    ENGINES
        .iter()
        .copied()
        .find(|engine| engine.name().eq_ignore_ascii_case(name))
}

/// The engine after `engine` in registration order, wrapping around.
#[must_use]
pub fn next_after(engine: &dyn LanguageEngine) -> &'static dyn LanguageEngine {
    let i = ENGINES
        .iter()
        .position(|e| e.name() == engine.name())
        .map_or(0, |i| (i + 1) % ENGINES.len());
    ENGINES[i]
}
