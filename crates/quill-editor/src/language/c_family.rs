//! C, C++, Java, Rust, Go and C#: one scanner for their common lexical core.

use super::scan::{self, Dialect};
use super::{LanguageEngine, LexicalState, Mode};
use crate::theme::StyleTag;

const DIALECT: Dialect = Dialect {
    regexp: false,
    template: false,
    char_literals: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CFamily;

impl LanguageEngine for CFamily {
    fn name(&self) -> &'static str {
        "C family"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["c", "h", "cc", "cpp", "hpp", "java", "rs", "go", "cs"]
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

    #[test]
    fn closes_braces_not_template_interpolations() {
        let c = CFamily;
        let mut state = c.new_state();
        for ch in "int main() {\r".chars() {
            c.parse(&mut state, ch);
        }
        assert_eq!(state.depth, 1);
        assert!(c.should_close_block(&state, '}'));
        assert!(!c.should_close_block(&state, ']'));
    }
}
