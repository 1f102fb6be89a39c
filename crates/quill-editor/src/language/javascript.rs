//! JavaScript and TypeScript.

use super::scan::{self, Dialect};
use super::{LanguageEngine, LexicalState, Mode};
use crate::theme::StyleTag;

const DIALECT: Dialect = Dialect {
    regexp: true,
    template: true,
    char_literals: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScript;

impl LanguageEngine for JavaScript {
    fn name(&self) -> &'static str {
        "JavaScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "mjs", "cjs", "jsx", "ts", "tsx", "json"]
    }

    fn parse(&self, state: &mut LexicalState, ch: char) {
        scan::scan(DIALECT, state, ch);
    }

    fn should_open_block(&self, state: &LexicalState, ch: char) -> bool {
        scan::opens_block(state, ch)
    }

    fn should_close_block(&self, state: &LexicalState, ch: char) -> bool {
        scan::closes_block(state, ch)
    }

    fn style(&self, state: &LexicalState) -> Option<StyleTag> {
        Some(state.mode.style_tag())
    }

    fn style_of_prior_char(&self, state: &LexicalState) -> Option<StyleTag> {
        match state.mode {
            Mode::Code | Mode::Error(_) => Some(state.mode.style_tag()),
            _ => None,
        }
    }

    fn comment_marker(&self) -> &'static str {
        "//"
    }

    fn line_continuation(&self, state: &LexicalState) -> &'static str {
        if state.mode == Mode::BlockComment { " * " } else { "" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(text: &str) -> Vec<Option<StyleTag>> {
        let js = JavaScript;
        let mut state = js.new_state();
        text.chars()
            .map(|ch| {
                let before = js.style(&state);
                js.parse(&mut state, ch);
                js.style_of_prior_char(&state).or(before)
            })
            .collect()
    }

    #[test]
    fn closing_quote_takes_code_style() {
        let s = styles("'a' x");
        assert_eq!(s[0], Some(StyleTag::Code));
        assert_eq!(s[1], Some(StyleTag::SingleQuoted));
        assert_eq!(s[2], Some(StyleTag::Code));
    }

    #[test]
    fn offending_closer_is_marked() {
        let s = styles("(]");
        assert_eq!(s[1], Some(StyleTag::Error));
    }

    #[test]
    fn continuation_inside_block_comment() {
        let js = JavaScript;
        let mut state = js.new_state();
        for ch in "/** doc".chars() {
            js.parse(&mut state, ch);
        }
        assert_eq!(js.line_continuation(&state), " * ");
        js.parse(&mut state, '\r');
        assert_eq!(state.mode, Mode::BlockComment);
    }
}
