//! The character scanner shared by the C-like engines.
//!
//! One state machine covers every engine with C-style comments, quotes and
//! brackets. A [`Dialect`] switches on the parts only some languages have.

use crate::document::ROW_BREAK;

use super::state::{ErrorKind, LexicalState, Marker, Mode, Pending, is_ident};

/// Language features the scanner can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// `/.../` regular-expression literals.
    pub regexp: bool,
    /// `` `...` `` template strings with `${ }` interpolation.
    pub template: bool,
    /// `'` opens a character literal rather than a string. A quote followed
    /// by one character and no closing quote is taken as a lifetime or label
    /// and dropped.
    pub char_literals: bool,
}

/// Characters after which an operand is expected, so `/` starts a regexp.
const OPERAND_AFTER: &str = "(,=:[!&|?{};+-*%<>~^";

/// Keywords after which an operand is expected.
const OPERAND_KEYWORDS: [&str; 14] = [
    "return",
    "typeof",
    "instanceof",
    "case",
    "do",
    "else",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "yield",
    "await",
];

/// Advance `state` across `ch`.
pub fn scan(dialect: Dialect, state: &mut LexicalState, ch: char) {
    let pending = std::mem::take(&mut state.pending);
    match state.mode {
        Mode::Code => code(dialect, state, pending, ch),
        Mode::Single { escaped } => {
            state.mode = match ch {
                _ if escaped => Mode::Single { escaped: false },
                '\\' => Mode::Single { escaped: true },
                ROW_BREAK => Mode::Error(ErrorKind::Unterminated),
                '\'' => close_literal(state, ch),
                _ => Mode::Single { escaped: false },
            };
        }
        Mode::Char { escaped, len } => char_literal(dialect, state, escaped, len, ch),
        Mode::Double { escaped } => {
            state.mode = match ch {
                _ if escaped => Mode::Double { escaped: false },
                '\\' => Mode::Double { escaped: true },
                ROW_BREAK => Mode::Error(ErrorKind::Unterminated),
                '"' => close_literal(state, ch),
                _ => Mode::Double { escaped: false },
            };
        }
        Mode::Template { escaped } => match ch {
            _ if escaped => state.mode = Mode::Template { escaped: false },
            '\\' => state.mode = Mode::Template { escaped: true },
            '`' => state.mode = close_literal(state, ch),
            '$' => state.pending = Pending::Dollar,
            '{' if pending == Pending::Dollar => {
                state.stack.push(Marker::Template);
                state.lookback.push('{');
                state.mode = Mode::Code;
            }
            _ => {}
        },
        Mode::LineComment => {
            if ch == ROW_BREAK {
                state.mode = Mode::Code;
            }
        }
        Mode::BlockComment => match ch {
            '*' => state.pending = Pending::Star,
            '/' if pending == Pending::Star => state.mode = Mode::Code,
            _ => {}
        },
        Mode::Regexp { class, escaped } => regexp(state, class, escaped, ch),
        Mode::Error(_) => {
            if ch == ROW_BREAK {
                state.mode = Mode::Code;
            }
        }
    }
}

fn code(dialect: Dialect, state: &mut LexicalState, pending: Pending, ch: char) {
    if let Pending::Slash { regexp_ok } = pending {
        match ch {
            '/' => {
                state.mode = Mode::LineComment;
                return;
            }
            '*' => {
                state.mode = Mode::BlockComment;
                return;
            }
            _ if regexp_ok && ch != ROW_BREAK => {
                regexp(state, false, false, ch);
                return;
            }
            _ => state.lookback.push('/'),
        }
    }

    match ch {
        '/' => {
            state.pending = Pending::Slash {
                regexp_ok: dialect.regexp && expects_operand(state),
            };
            return;
        }
        '\'' if dialect.char_literals => state.mode = Mode::Char { escaped: false, len: 0 },
        '\'' => state.mode = Mode::Single { escaped: false },
        '"' => state.mode = Mode::Double { escaped: false },
        '`' if dialect.template => state.mode = Mode::Template { escaped: false },
        '}' if state.stack.top() == Some(Marker::Template) => {
            state.stack.pop();
            state.mode = Mode::Template { escaped: false };
        }
        _ => {
            if let Some(marker) = Marker::opened_by(ch) {
                state.stack.push(marker);
                state.depth += 1;
            } else if let Some(marker) = Marker::closed_by(ch) {
                close(state, marker);
            }
        }
    }

    if !ch.is_whitespace() {
        state.lookback.push(ch);
    }
}

fn close(state: &mut LexicalState, marker: Marker) {
    if state.unreliable {
        state.stack.pop();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.unreliable = false;
            state.stack.clear();
        }
        return;
    }

    let matched = state.stack.top() == Some(marker);
    state.stack.pop();
    state.depth = state.depth.saturating_sub(1);
    if !matched {
        state.unreliable = state.depth > 0;
        state.mode = Mode::Error(ErrorKind::MismatchedCloser);
    }
}

fn close_literal(state: &mut LexicalState, quote: char) -> Mode {
    state.lookback.push(quote);
    Mode::Code
}

fn char_literal(dialect: Dialect, state: &mut LexicalState, escaped: bool, len: u8, ch: char) {
    state.mode = match ch {
        // An escape commits to a literal: `'\u{..}'` runs until its quote.
        _ if escaped => Mode::Char { escaped: false, len: 2 },
        '\\' => Mode::Char { escaped: true, len },
        ROW_BREAK => Mode::Error(ErrorKind::Unterminated),
        '\'' => close_literal(state, ch),
        _ if len == 1 => {
            state.mode = Mode::Code;
            code(dialect, state, Pending::None, ch);
            return;
        }
        _ => Mode::Char {
            escaped: false,
            len: len.saturating_add(1),
        },
    };
}

fn regexp(state: &mut LexicalState, class: bool, escaped: bool, ch: char) {
    state.mode = match ch {
        _ if escaped => Mode::Regexp { class, escaped: false },
        '\\' => Mode::Regexp { class, escaped: true },
        ROW_BREAK => Mode::Error(ErrorKind::Unterminated),
        '[' => Mode::Regexp { class: true, escaped: false },
        ']' if class => Mode::Regexp { class: false, escaped: false },
        '/' if !class => close_literal(state, ch),
        _ => Mode::Regexp { class, escaped: false },
    };
}

/// Whether the code seen so far ends where an operand should come next.
fn expects_operand(state: &LexicalState) -> bool {
    let Some(last) = state.lookback.last() else {
        return true;
    };
    if OPERAND_AFTER.contains(last) {
        return true;
    }
    is_ident(last) && OPERAND_KEYWORDS.iter().any(|kw| state.lookback.ends_with_word(kw))
}

/// True when typing `ch` in `state` opens a bracket.
pub fn opens_block(state: &LexicalState, ch: char) -> bool {
    in_code(state) && Marker::opened_by(ch).is_some()
}

/// True when typing `ch` in `state` closes the innermost open bracket.
pub fn closes_block(state: &LexicalState, ch: char) -> bool {
    in_code(state)
        && !state.unreliable
        && Marker::closed_by(ch).is_some_and(|marker| state.stack.top() == Some(marker))
}

fn in_code(state: &LexicalState) -> bool {
    state.mode.is_code() && !matches!(state.pending, Pending::Slash { regexp_ok: true })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
