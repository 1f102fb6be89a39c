use super::{LanguageEngine, LexicalState};

/// No highlighting and no indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl LanguageEngine for PlainText {
    fn name(&self) -> &'static str {
        "Plain text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[]
    }

    fn parse(&self, _state: &mut LexicalState, _ch: char) {}
}
