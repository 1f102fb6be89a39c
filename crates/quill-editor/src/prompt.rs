//! Find and Replace prompts.
//!
//! A prompt is a one-row [`Editor`] (the *field*) living inside its parent,
//! below the parent's text area. While any prompt is open the parent hands
//! every key to [`prompt_key`](Editor::prompt_key): a few keys are the
//! prompt's own, the rest edit the field, so movement, typing, paste and
//! undo all work while composing a query.
//!
//! The Find prompt is always the first one; a Replace prompt opens on top
//! of it (`control-r`) and reads the query and flags from it. Cancelling
//! closes both and discards whatever was typed.

use quill_term::input::Key;

use crate::editor::{Editor, Hint, KeyOutcome, Step};
use crate::position::{Position, Span};
use crate::search::{self, Direction, Matcher, Query};

/// Which prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Find,
    Replace,
}

/// An open prompt: its kind, its field, and (for Find) the query flags.
#[derive(Debug)]
pub struct Prompt {
    pub(crate) kind: PromptKind,
    pub(crate) field: Editor,
    pub(crate) regex: bool,
    pub(crate) case_sensitive: bool,
}

impl Prompt {
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    /// The text painted before the field.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            PromptKind::Find => {
                let mut label = String::new();
                if self.regex {
                    label.push_str("[re] ");
                }
                if self.case_sensitive {
                    label.push_str("[Aa] ");
                }
                label.push_str("Find: ");
                label
            }
            PromptKind::Replace => "Replace: ".to_owned(),
        }
    }

    /// What has been typed, row breaks included.
    fn contents(&self) -> Vec<char> {
        let doc = self.field.document();
        doc.span_chars(Span::new(Position::ZERO, doc.end()))
    }
}

impl Editor {
    fn open_prompt(&mut self, kind: PromptKind, regex: bool, case_sensitive: bool) {
        let field = Self::field(self.clipboard.clone(), self.theme.clone(), self.tab_spaces);
        self.prompts.push(Prompt {
            kind,
            field,
            regex,
            case_sensitive,
        });
        self.hint_on(match kind {
            PromptKind::Find => Hint::Find,
            PromptKind::Replace => Hint::Replace,
        });
    }

    /// Open the Find prompt, keeping the flags of the last search.
    pub(crate) fn open_find(&mut self) -> Step {
        let (regex, case_sensitive) = self
            .last_find
            .as_ref()
            .map_or((false, false), |(query, _)| (query.regex, query.case_sensitive));
        self.open_prompt(PromptKind::Find, regex, case_sensitive);
        Step::done()
    }

    /// The open prompts, innermost last.
    #[must_use]
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    fn close_prompts(&mut self) {
        self.prompts.clear();
        self.hint_off(Hint::Find);
        self.hint_off(Hint::Replace);
    }

    /// The query in the Find prompt.
    fn prompt_query(&self) -> Option<Query> {
        let find = self.prompts.first()?;
        Some(Query {
            target: find.field.text(),
            regex: find.regex,
            case_sensitive: find.case_sensitive,
        })
    }

    /// A matcher for the Find prompt's query. Empty and invalid queries set
    /// the status and yield `None`.
    fn prompt_matcher(&mut self) -> Option<(Query, Matcher)> {
        let query = self.prompt_query().filter(|query| !query.target.is_empty())?;
        match Matcher::new(&query) {
            Ok(matcher) => Some((query, matcher)),
            Err(err) => {
                self.set_status(err.to_string());
                None
            }
        }
    }

    /// Handle a key while a prompt is open.
    pub(crate) fn prompt_key(&mut self, key: Key) -> KeyOutcome {
        let Some(kind) = self.prompts.last().map(Prompt::kind) else {
            return KeyOutcome::Bell;
        };
        let done = match (kind, key) {
            (_, Key::Escape | Key::Ctrl('f')) => {
                self.close_prompts();
                true
            }
            (PromptKind::Find, Key::Enter) => self.find_from_prompt(Direction::Forward),
            (PromptKind::Find, Key::Ctrl('u')) => self.find_from_prompt(Direction::Backward),
            (PromptKind::Find, Key::Ctrl('e')) => {
                if let Some(find) = self.prompts.last_mut() {
                    find.regex = !find.regex;
                }
                true
            }
            (PromptKind::Find, Key::Ctrl('a')) => {
                if let Some(find) = self.prompts.last_mut() {
                    find.case_sensitive = !find.case_sensitive;
                }
                true
            }
            (PromptKind::Find, Key::Ctrl('r')) => {
                self.open_prompt(PromptKind::Replace, false, false);
                true
            }
            (PromptKind::Replace, Key::Enter) => self.replace_from_prompt(Direction::Forward),
            (PromptKind::Replace, Key::Ctrl('u')) => self.replace_from_prompt(Direction::Backward),
            _ => return self.field_key(key),
        };
        if done { KeyOutcome::Handled } else { KeyOutcome::Bell }
    }

    /// Pass `key` to the innermost prompt's field.
    fn field_key(&mut self, key: Key) -> KeyOutcome {
        let Some(prompt) = self.prompts.last_mut() else {
            return KeyOutcome::Bell;
        };
        let outcome = prompt.field.handle_key(key);
        if let Some(status) = prompt.field.take_status() {
            self.set_status(status);
        }
        outcome
    }

    /// Search for the prompt's query and move there. Repeating a forward
    /// search steps past the match under the cursor.
    fn find_from_prompt(&mut self, direction: Direction) -> bool {
        let Some((query, matcher)) = self.prompt_matcher() else {
            return false;
        };
        let pos = self.cursor.position();
        let repeat = self.last_find.as_ref().is_some_and(|(last, _)| *last == query);
        let from = match direction {
            Direction::Forward if repeat => Position::new(pos.row, pos.col + 1),
            _ => pos,
        };
        let found = search::find(&self.doc, &matcher, from, direction);
        self.last_find = Some((query, direction));

        let Some(found) = found else {
            self.set_status("Not found");
            return false;
        };
        self.move_to(found.start);
        self.cursor.clear_anchor();
        self.cursor.reset_sticky();
        true
    }

    /// Replace the next match with the Replace prompt's text, then close
    /// the prompts.
    fn replace_from_prompt(&mut self, direction: Direction) -> bool {
        let Some((query, matcher)) = self.prompt_matcher() else {
            return false;
        };
        let Some(replacement) = self.prompts.last().map(Prompt::contents) else {
            return false;
        };
        let Some(found) = search::find(&self.doc, &matcher, self.cursor.position(), direction) else {
            self.set_status("Not found");
            return false;
        };

        let target = self.doc.span_chars(Span::new(found.start, found.end()));
        let record = self.replace_core(found.start, target, replacement);
        tracing::trace!("push {} at {}", record.kind(), found.start);
        self.history.push(record);
        self.last_find = Some((query, direction));
        self.cursor.clear_anchor();
        self.cursor.reset_sticky();
        self.close_prompts();
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
