//! Lexical state — the value a language engine threads through a document.
//!
//! A [`LexicalState`] is cloned into a snapshot at the start of every row, so
//! it has to be cheap to copy. Everything in it is `Copy` except the bracket
//! [`Stack`], which is a persistent linked list: pushing allocates one frame
//! that points at the frames below it, and cloning is a reference-count bump.
//! Snapshots of neighbouring rows share all the frames they have in common.

use std::fmt;
use std::rc::Rc;

use crate::theme::StyleTag;

// ---------------------------------------------------------------------------
// Markers and the bracket stack
// ---------------------------------------------------------------------------

/// An open bracket or template interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Paren,
    Bracket,
    Brace,
    /// `${` inside a template string. Closed by `}`, which resumes the template.
    Template,
}

impl Marker {
    /// The marker `ch` opens, if it is an opening bracket.
    #[must_use]
    pub const fn opened_by(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::Paren),
            '[' => Some(Self::Bracket),
            '{' => Some(Self::Brace),
            _ => None,
        }
    }

    /// The marker `ch` closes, if it is a closing bracket.
    #[must_use]
    pub const fn closed_by(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(Self::Paren),
            ']' => Some(Self::Bracket),
            '}' => Some(Self::Brace),
            _ => None,
        }
    }
}

/// A persistent stack of [`Marker`]s.
#[derive(Clone, Default)]
pub struct Stack(Option<Rc<Frame>>);

struct Frame {
    marker: Marker,
    below: Stack,
    len: usize,
}

impl Stack {
    #[must_use]
    pub const fn new() -> Self {
        Self(None)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |f| f.len)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<Marker> {
        self.0.as_ref().map(|f| f.marker)
    }

    pub fn push(&mut self, marker: Marker) {
        let below = std::mem::take(self);
        let len = below.len() + 1;
        *self = Self(Some(Rc::new(Frame { marker, below, len })));
    }

    pub fn pop(&mut self) -> Option<Marker> {
        let frame = self.0.take()?;
        *self = frame.below.clone();
        Some(frame.marker)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Markers from the top down.
    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        let mut cur = self.0.as_deref();
        std::iter::from_fn(move || {
            let frame = cur?;
            cur = frame.below.0.as_deref();
            Some(frame.marker)
        })
    }
}

impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                Rc::ptr_eq(a, b) || (a.len == b.len && a.marker == b.marker && a.below == b.below)
            }
            _ => false,
        }
    }
}

impl Eq for Stack {}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut markers: Vec<Marker> = self.iter().collect();
        markers.reverse();
        f.debug_list().entries(markers).finish()
    }
}

// ---------------------------------------------------------------------------
// Lookback
// ---------------------------------------------------------------------------

/// How many non-space characters the lookback remembers.
pub const LOOKBACK: usize = 10;

/// The last few non-space code characters, oldest first.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    buf: [char; LOOKBACK],
    len: usize,
}

impl Lookback {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: ['\0'; LOOKBACK],
            len: 0,
        }
    }

    pub fn push(&mut self, ch: char) {
        if self.len < LOOKBACK {
            self.buf[self.len] = ch;
            self.len += 1;
        } else {
            self.buf.copy_within(1.., 0);
            self.buf[LOOKBACK - 1] = ch;
        }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[char] {
        &self.buf[..self.len]
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<char> {
        self.as_slice().last().copied()
    }

    /// True when the remembered characters end with the identifier `word`
    /// and nothing identifier-like comes right before it.
    #[must_use]
    pub fn ends_with_word(&self, word: &str) -> bool {
        let chars = self.as_slice();
        let n = word.chars().count();
        if n > chars.len() {
            return false;
        }
        let tail = &chars[chars.len() - n..];
        if !tail.iter().copied().eq(word.chars()) {
            return false;
        }
        chars.len() == n || !is_ident(chars[chars.len() - n - 1])
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.as_slice().iter().collect();
        write!(f, "{s:?}")
    }
}

#[inline]
pub(crate) fn is_ident(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Why the engine is in [`Mode::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A string or regexp ran into the end of its row. Covers the row after.
    Unterminated,
    /// A closer that doesn't match the innermost open bracket. Covers the
    /// rest of its row.
    MismatchedCloser,
}

/// What the engine is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Code,
    /// `'...'`. `escaped` after a backslash.
    Single { escaped: bool },
    /// A C character literal; `len` counts characters seen after the quote.
    Char { escaped: bool, len: u8 },
    Double { escaped: bool },
    /// `` `...` `` outside any `${ }`.
    Template { escaped: bool },
    LineComment,
    BlockComment,
    /// `/.../`; `class` inside `[...]`.
    Regexp { class: bool, escaped: bool },
    Error(ErrorKind),
}

impl Mode {
    /// The style for characters scanned in this mode.
    #[must_use]
    pub const fn style_tag(self) -> StyleTag {
        match self {
            Self::Code => StyleTag::Code,
            Self::Single { .. } | Self::Char { .. } => StyleTag::SingleQuoted,
            Self::Double { .. } => StyleTag::DoubleQuoted,
            Self::Template { .. } => StyleTag::Template,
            Self::LineComment => StyleTag::LineComment,
            Self::BlockComment => StyleTag::BlockComment,
            Self::Regexp { .. } => StyleTag::Regexp,
            Self::Error(_) => StyleTag::Error,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_code(self) -> bool {
        matches!(self, Self::Code)
    }

    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A character whose meaning depends on the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pending {
    #[default]
    None,
    /// `/` in code: comment, regexp or division. `regexp_ok` was decided
    /// from the lookback when the slash was seen.
    Slash { regexp_ok: bool },
    /// `*` in a block comment.
    Star,
    /// `$` in a template.
    Dollar,
}

// ---------------------------------------------------------------------------
// LexicalState
// ---------------------------------------------------------------------------

/// The engine's progress at one position of the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LexicalState {
    pub mode: Mode,
    pub stack: Stack,
    /// Open brackets, not counting template interpolations.
    pub depth: usize,
    pub lookback: Lookback,
    pub pending: Pending,
    /// Set by a mismatched closer while brackets are still open; the stack
    /// no longer says which closer comes next.
    pub unreliable: bool,
}

impl LexicalState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
