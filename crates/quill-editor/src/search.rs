//! Search — literal and regex matching over the document, row by row.
//!
//! A [`Query`] is what the user typed into the Find prompt plus its two
//! flags. It compiles into a [`Matcher`]; literal queries are escaped and go
//! through the same regex engine, so case folding behaves the same way for
//! both.
//!
//! Matches never span rows, and zero-length matches (`^`, `a*` on an empty
//! stretch) are skipped: landing on one would leave the cursor where it was.
//!
//! Searching wraps: forward from the end of the document continues at the
//! top, backward from the top continues at the end.

use regex::{Regex, RegexBuilder};

use crate::document::Document;
use crate::error::SearchError;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// Query and Matcher
// ---------------------------------------------------------------------------

/// What to look for.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Query {
    pub target: String,
    /// Treat `target` as a regular expression.
    pub regex: bool,
    pub case_sensitive: bool,
}

/// A compiled [`Query`].
#[derive(Clone, Debug)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compile `query`.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidPattern`] when a regex query doesn't compile.
    pub fn new(query: &Query) -> Result<Self, SearchError> {
        let pattern = if query.regex {
            query.target.clone()
        } else {
            regex::escape(&query.target)
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!query.case_sensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// First non-empty match in `text` starting at or after byte `from`.
    fn first_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let mut at = from;
        while at <= text.len() {
            let m = self.regex.find_at(text, at)?;
            if !m.is_empty() {
                return Some((m.start(), m.end()));
            }
            at = next_boundary(text, m.start());
        }
        None
    }
}

/// A match: start position and length in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: Position,
    pub len: usize,
}

impl Match {
    /// The position right after the match.
    #[must_use]
    pub const fn end(self) -> Position {
        Position::new(self.start.row, self.start.col + self.len)
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// Find the first match starting at or after `from`, wrapping around.
///
/// To skip a match at `from` itself, pass `(row, col + 1)`.
#[must_use]
pub fn find_forward(doc: &Document, matcher: &Matcher, from: Position) -> Option<Match> {
    let rows = doc.row_count();
    for offset in 0..rows {
        let row = (from.row + offset) % rows;
        let start_col = if offset == 0 { from.col } else { 0 };
        if let Some(m) = search_row_forward(doc, matcher, row, start_col) {
            return Some(m);
        }
    }

    // Wrapped all the way: the start row before `from.col`.
    if from.col > 0 {
        return search_row_forward(doc, matcher, from.row, 0);
    }
    None
}

/// Find the last match starting before `from`, wrapping around.
#[must_use]
pub fn find_backward(doc: &Document, matcher: &Matcher, from: Position) -> Option<Match> {
    let rows = doc.row_count();
    for offset in 0..rows {
        let row = (from.row + rows - offset) % rows;
        let before_col = if offset == 0 { from.col } else { usize::MAX };
        if let Some(m) = search_row_backward(doc, matcher, row, before_col) {
            return Some(m);
        }
    }

    // Wrapped: the start row at or after `from.col`.
    search_row_backward(doc, matcher, from.row, usize::MAX)
}

/// Find the next match in `direction`.
#[must_use]
pub fn find(doc: &Document, matcher: &Matcher, from: Position, direction: Direction) -> Option<Match> {
    match direction {
        Direction::Forward => find_forward(doc, matcher, from),
        Direction::Backward => find_backward(doc, matcher, from),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn search_row_forward(doc: &Document, matcher: &Matcher, row: usize, from_col: usize) -> Option<Match> {
    let text = doc.row_text(row);
    let from = char_to_byte(&text, from_col)?;
    let (start, end) = matcher.first_from(&text, from)?;
    Some(to_match(&text, row, start, end))
}

/// The last match in `row` starting before `before_col`. Pass `usize::MAX`
/// for the whole row.
fn search_row_backward(doc: &Document, matcher: &Matcher, row: usize, before_col: usize) -> Option<Match> {
    let text = doc.row_text(row);
    let limit = char_to_byte(&text, before_col).unwrap_or(text.len() + 1);

    let mut last = None;
    let mut at = 0;
    while let Some((start, end)) = matcher.first_from(&text, at) {
        if start >= limit {
            break;
        }
        last = Some((start, end));
        at = next_boundary(&text, start);
    }
    last.map(|(start, end)| to_match(&text, row, start, end))
}

fn to_match(text: &str, row: usize, start: usize, end: usize) -> Match {
    let col = byte_to_char(text, start);
    Match {
        start: Position::new(row, col),
        len: text[start..end].chars().count(),
    }
}

/// Byte offset of char `col`, or `None` past the end of the row. The end
/// of the row itself is a valid offset.
fn char_to_byte(s: &str, col: usize) -> Option<usize> {
    if col == usize::MAX {
        return None;
    }
    s.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(s.len()))
        .nth(col)
}

fn byte_to_char(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

/// The char boundary after byte `at`, or one past the end.
fn next_boundary(s: &str, at: usize) -> usize {
    s[at..].chars().next().map_or(s.len() + 1, |ch| at + ch.len_utf8())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text(text)
    }

    fn lit(s: &str) -> Matcher {
        Matcher::new(&Query {
            target: s.into(),
            ..Query::default()
        })
        .unwrap()
    }

    fn re(s: &str) -> Matcher {
        Matcher::new(&Query {
            target: s.into(),
            regex: true,
            case_sensitive: true,
        })
        .unwrap()
    }

    fn at(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    // -- Matcher ------------------------------------------------------------

    #[test]
    fn literal_is_escaped() {
        let d = doc("a.b axb");
        let m = find_forward(&d, &lit("a.b"), at(0, 1)).unwrap();
        assert_eq!(m.start, at(0, 0));
    }

    #[test]
    fn literal_folds_case_unless_sensitive() {
        let d = doc("Hello");
        assert!(find_forward(&d, &lit("hello"), at(0, 0)).is_some());
        let strict = Matcher::new(&Query {
            target: "hello".into(),
            regex: false,
            case_sensitive: true,
        })
        .unwrap();
        assert!(find_forward(&d, &strict, at(0, 0)).is_none());
    }

    #[test]
    fn invalid_regex() {
        let err = Matcher::new(&Query {
            target: "(".into(),
            regex: true,
            case_sensitive: false,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid pattern");
    }

    // -- Forward ------------------------------------------------------------

    #[test]
    fn forward_includes_start() {
        let d = doc("foo bar foo");
        assert_eq!(find_forward(&d, &lit("foo"), at(0, 0)).unwrap().start, at(0, 0));
        assert_eq!(find_forward(&d, &lit("foo"), at(0, 1)).unwrap().start, at(0, 8));
    }

    #[test]
    fn forward_next_row() {
        let d = doc("abc\nxx abc");
        assert_eq!(find_forward(&d, &lit("abc"), at(0, 1)).unwrap().start, at(1, 3));
    }

    #[test]
    fn forward_wraps() {
        let d = doc("abc\nxyz");
        assert_eq!(find_forward(&d, &lit("abc"), at(1, 0)).unwrap().start, at(0, 0));
        let d = doc("abc xyz");
        assert_eq!(find_forward(&d, &lit("abc"), at(0, 4)).unwrap().start, at(0, 0));
    }

    #[test]
    fn forward_no_match() {
        assert!(find_forward(&doc("abc\ndef"), &lit("zzz"), at(0, 0)).is_none());
    }

    #[test]
    fn forward_past_end_of_row() {
        let d = doc("ab\nab");
        assert_eq!(find_forward(&d, &lit("ab"), at(0, 3)).unwrap().start, at(1, 0));
    }

    #[test]
    fn match_length_in_chars() {
        let d = doc("naïve café");
        let m = find_forward(&d, &re("caf."), at(0, 0)).unwrap();
        assert_eq!(m, Match { start: at(0, 6), len: 4 });
        assert_eq!(m.end(), at(0, 10));
    }

    #[test]
    fn zero_length_matches_are_skipped() {
        let d = doc("aaa\nbbb");
        assert!(find_forward(&d, &re("^"), at(0, 0)).is_none());
        assert_eq!(find_forward(&d, &re("b*"), at(0, 0)).unwrap().start, at(1, 0));
    }

    // -- Backward -----------------------------------------------------------

    #[test]
    fn backward_excludes_start() {
        let d = doc("foo bar foo");
        assert_eq!(find_backward(&d, &lit("foo"), at(0, 8)).unwrap().start, at(0, 0));
        assert_eq!(find_backward(&d, &lit("foo"), at(0, 9)).unwrap().start, at(0, 8));
    }

    #[test]
    fn backward_previous_row_takes_last() {
        let d = doc("ab ab\nxx");
        assert_eq!(find_backward(&d, &lit("ab"), at(1, 1)).unwrap().start, at(0, 3));
    }

    #[test]
    fn backward_wraps() {
        let d = doc("xyz\nabc");
        assert_eq!(find_backward(&d, &lit("abc"), at(0, 0)).unwrap().start, at(1, 0));
        let d = doc("xyz abc");
        assert_eq!(find_backward(&d, &lit("abc"), at(0, 2)).unwrap().start, at(0, 4));
    }

    #[test]
    fn find_dispatches() {
        let d = doc("a b a");
        assert_eq!(
            find(&d, &lit("a"), at(0, 2), Direction::Backward).unwrap().start,
            at(0, 0)
        );
        assert_eq!(
            find(&d, &lit("a"), at(0, 2), Direction::Forward).unwrap().start,
            at(0, 4)
        );
    }
}
