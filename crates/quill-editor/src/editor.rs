//! Editor — the composition root of the editing engine.
//!
//! An [`Editor`] owns one document and everything that follows it around:
//! the cursor and selection, the incremental lexer, the undo history, the
//! viewport, and any open prompts. Prompts are editors too (see
//! [`crate::prompt`]); a Find prompt is a one-row `Editor` living inside its
//! parent.
//!
//! # Primitives
//!
//! Every command is built from a handful of primitives that keep the lexer
//! in step with the cursor:
//!
//! - [`forward`](Editor::forward) crosses one character (or row break) and
//!   feeds it to the lexer.
//! - [`back`](Editor::back) steps back by replaying the row from its
//!   snapshot.
//! - [`move_to`](Editor::move_to) jumps anywhere by the same rules.
//! - [`insert`](Editor::insert), [`erase`](Editor::erase),
//!   [`break_row`](Editor::break_row) and
//!   [`replace_row`](Editor::replace_row) edit at the cursor and drop the
//!   lexer snapshots the edit made stale.
//!
//! # Keys
//!
//! [`handle_key`](Editor::handle_key) routes a key to the innermost open
//! prompt, or looks it up in the [`Keymap`]. A command that does nothing
//! yields [`KeyOutcome::Bell`] and leaves every piece of state untouched.

use std::fmt;

use quill_term::input::Key;

use crate::clipboard::SharedClipboard;
use crate::cursor::Cursor;
use crate::document::{Document, ROW_BREAK};
use crate::error::EditorError;
use crate::history::{History, ShiftDirection, UndoRecord};
use crate::keymap::{Command, ContentCommand, Guard, Keymap};
use crate::language::{LanguageEngine, LexicalState};
use crate::lexer::Lexer;
use crate::options::Options;
use crate::position::Position;
use crate::prompt::Prompt;
use crate::search::{Direction, Query};
use crate::theme::Theme;
use crate::view::Viewport;

// ---------------------------------------------------------------------------
// Steps and outcomes
// ---------------------------------------------------------------------------

/// Something the editor asks its owner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Save,
    Close,
}

/// How a command's edit enters the history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UndoStep {
    #[default]
    None,
    Push(UndoRecord),
    /// The edit was folded into the last record.
    Coalesced,
}

/// The result of a command that did something.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    /// Keep the selection alive after this step.
    pub selecting: bool,
    pub undo: UndoStep,
    pub request: Option<Request>,
}

impl Step {
    #[must_use]
    pub fn done() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selecting() -> Self {
        Self {
            selecting: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn push(record: UndoRecord) -> Self {
        Self {
            undo: UndoStep::Push(record),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn request(request: Request) -> Self {
        Self {
            request: Some(request),
            ..Self::default()
        }
    }
}

/// What a key did, as far as the editor's owner cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Nothing happened; ring the bell.
    Bell,
    Handled,
    Save,
    Close,
}

/// Help lines shown under the status line, innermost context last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Base,
    Selection,
    Find,
    Replace,
}

impl Hint {
    #[must_use]
    pub const fn lines(self) -> [&'static str; 2] {
        match self {
            Self::Base => [
                "^S save  ^Q quit  ^F find  ^G find again  ^Z undo  ^Y redo",
                "ESC select  ^V paste  ^B bracket  ^L language  ^O/^P page",
            ],
            Self::Selection => [
                "arrows extend  ^C copy  ^X cut  ^V paste",
                "[ ] shift rows  c comment  ESC done",
            ],
            Self::Find => [
                "ENTER next  ^U previous  ^R replace",
                "^E regex  ^A case  ESC cancel",
            ],
            Self::Replace => [
                "ENTER replace next  ^U replace previous",
                "ESC cancel",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// One document being edited.
pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) cursor: Cursor,
    pub(crate) lexer: Lexer,
    pub(crate) history: History,
    pub(crate) keymap: Keymap,
    pub(crate) clipboard: SharedClipboard,
    pub(crate) theme: Theme,
    pub(crate) tab_spaces: usize,
    /// Movement extends the selection (toggled with `escape`).
    pub(crate) select_mode: bool,
    pub(crate) viewport: Viewport,
    /// Open prompts, innermost last.
    pub(crate) prompts: Vec<Prompt>,
    pub(crate) last_find: Option<(Query, Direction)>,
    pub(crate) status: Option<String>,
    pub(crate) hints: Vec<Hint>,
}

impl Editor {
    /// An editor for `doc` with the cursor at the start.
    #[must_use]
    pub fn new(doc: Document, engine: &'static dyn LanguageEngine, clipboard: SharedClipboard) -> Self {
        Self {
            doc,
            cursor: Cursor::new(),
            lexer: Lexer::new(engine),
            history: History::new(),
            keymap: Keymap::standard(),
            clipboard,
            theme: Theme::standard(),
            tab_spaces: Options::default().tab_spaces,
            select_mode: false,
            viewport: Viewport::default(),
            prompts: Vec::new(),
            last_find: None,
            status: None,
            hints: vec![Hint::Base],
        }
    }

    /// A one-row prompt field sharing `clipboard`.
    #[must_use]
    pub(crate) fn field(clipboard: SharedClipboard, theme: Theme, tab_spaces: usize) -> Self {
        let mut field = Self::new(Document::new(), crate::language::plain_text(), clipboard)
            .with_keymap(Keymap::field())
            .with_theme(theme)
            .with_tab_spaces(tab_spaces);
        field.hints.clear();
        field
    }

    #[must_use]
    pub fn with_options(mut self, options: &Options) -> Self {
        self.tab_spaces = options.tab_spaces;
        self
    }

    #[must_use]
    pub fn with_tab_spaces(mut self, tab_spaces: usize) -> Self {
        self.tab_spaces = tab_spaces.max(1);
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    #[must_use]
    pub const fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// The lexical state at the cursor.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &LexicalState {
        self.lexer.state()
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> &'static dyn LanguageEngine {
        self.lexer.engine()
    }

    #[inline]
    #[must_use]
    pub const fn select_mode(&self) -> bool {
        self.select_mode
    }

    #[inline]
    #[must_use]
    pub const fn tab_spaces(&self) -> usize {
        self.tab_spaces
    }

    #[inline]
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The whole document as text.
    #[must_use]
    pub fn text(&self) -> String {
        self.doc.to_text()
    }

    /// The hint lines for the innermost context, if any.
    #[must_use]
    pub fn hints(&self) -> Option<[&'static str; 2]> {
        self.hints.last().map(|hint| hint.lines())
    }

    /// Take the pending one-shot status message.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub(crate) fn hint_on(&mut self, hint: Hint) {
        if !self.hints.contains(&hint) {
            self.hints.push(hint);
        }
    }

    pub(crate) fn hint_off(&mut self, hint: Hint) {
        self.hints.retain(|&h| h != hint);
    }

    // -- Primitives: movement -----------------------------------------------

    /// The character the cursor would cross moving forward.
    ///
    /// # Panics
    ///
    /// Panics at the end of the document; check [`eol`](Self::eol) or
    /// [`Document::is_end`] first.
    #[must_use]
    pub fn peek(&self) -> char {
        self.doc.peek(self.cursor.position())
    }

    /// True at the end of the cursor's row.
    #[must_use]
    pub fn eol(&self) -> bool {
        self.doc.is_eol(self.cursor.position())
    }

    /// True at the start of the cursor's row.
    #[must_use]
    pub const fn sol(&self) -> bool {
        self.cursor.col() == 0
    }

    /// True at the end of the document.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.doc.is_end(self.cursor.position())
    }

    /// Cross one character, wrapping to the next row at the end of a row.
    /// Returns false at the end of the document.
    ///
    /// Only the end of the row is a row break; a `'\r'` inside a row is an
    /// ordinary character.
    pub fn forward(&mut self) -> bool {
        let pos = self.cursor.position();
        if self.doc.is_end(pos) {
            return false;
        }
        self.lexer.advance(self.doc.peek(pos));
        if self.doc.is_eol(pos) {
            self.cursor.set_position(Position::new(pos.row + 1, 0));
            self.lexer.enter_row(pos.row + 1);
        } else {
            self.cursor.set_position(Position::new(pos.row, pos.col + 1));
        }
        true
    }

    /// Step back one character, wrapping to the end of the previous row.
    /// Returns false at the start of the document.
    pub fn back(&mut self) -> bool {
        let pos = self.cursor.position();
        let target = if pos.col > 0 {
            Position::new(pos.row, pos.col - 1)
        } else if pos.row > 0 {
            Position::new(pos.row - 1, self.doc.row_len(pos.row - 1))
        } else {
            return false;
        };
        self.replay_to(target);
        true
    }

    /// Move to `pos` (clamped to the document), keeping the lexer in step.
    pub fn move_to(&mut self, pos: Position) {
        let pos = self.doc.clamp(pos);
        if pos.row < self.lexer.snapshot_count() {
            self.replay_to(pos);
            return;
        }

        // Beyond the lexed rows: start from the last snapshot and walk.
        let last = self.lexer.snapshot_count() - 1;
        if last > self.cursor.row() {
            self.replay_to(Position::new(last, 0));
        }
        while self.cursor.position() < pos && self.forward() {}
    }

    fn replay_to(&mut self, pos: Position) {
        self.lexer.replay(pos.row, &self.doc.row(pos.row)[..pos.col]);
        self.cursor.set_position(pos);
    }

    // -- Primitives: editing ------------------------------------------------

    /// Insert `ch` into the cursor's row and move past it. The character is
    /// taken literally, [`ROW_BREAK`] included.
    pub fn insert_char(&mut self, ch: char) {
        let pos = self.cursor.position();
        self.doc.insert_at(pos, ch);
        self.lexer.invalidate_after(pos.row);
        self.forward();
    }

    /// Insert `chars` at the cursor; [`ROW_BREAK`] breaks the row.
    pub fn insert(&mut self, chars: &[char]) {
        for &ch in chars {
            if ch == ROW_BREAK {
                self.break_row();
            } else {
                self.insert_char(ch);
            }
        }
    }

    /// Break the row at the cursor and move to the start of the new row.
    pub fn break_row(&mut self) {
        let pos = self.cursor.position();
        self.doc.split_at(pos);
        self.lexer.invalidate_after(pos.row);
        self.forward();
    }

    /// Erase `n` characters at the cursor (not before it). A row break counts
    /// as one character. Returns false when nothing was erased.
    pub fn erase(&mut self, n: usize) -> bool {
        let pos = self.cursor.position();
        let changed = self.doc.delete_at(pos, n);
        if changed {
            self.lexer.invalidate_after(pos.row);
        }
        changed
    }

    /// Replace the contents of `row`, leaving the cursor at its start.
    /// Returns the old contents.
    pub fn replace_row(&mut self, row: usize, chars: Vec<char>) -> Vec<char> {
        self.move_to(Position::new(row, 0));
        let old = self.doc.replace_row(row, chars);
        self.lexer.invalidate_after(row);
        old
    }

    // -- Keys ---------------------------------------------------------------

    /// Handle one key. Errors become a status message and a bell.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if !self.prompts.is_empty() {
            return self.prompt_key(key);
        }
        match self.accept_key(key) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("{key}: {err}");
                self.set_status(err.to_string());
                KeyOutcome::Bell
            }
        }
    }

    /// Run the command bound to `key` (or the first content command that
    /// accepts it) and settle its step.
    ///
    /// # Errors
    ///
    /// Fails when a collaborator does, e.g. the clipboard store is locked.
    /// The document is unchanged in that case.
    pub fn accept_key(&mut self, key: Key) -> Result<KeyOutcome, EditorError> {
        let binding = self
            .keymap
            .lookup(key)
            .filter(|binding| self.guard_holds(binding.guard));

        let (step, vertical) = match (binding, key) {
            (Some(binding), _) => (self.run(binding.command)?, binding.command.is_vertical()),
            (None, Key::Char(ch)) => (self.run_content(ch), false),
            (None, _) => (None, false),
        };

        let Some(step) = step else {
            return Ok(KeyOutcome::Bell);
        };
        Ok(self.settle(step, vertical))
    }

    fn guard_holds(&self, guard: Guard) -> bool {
        match guard {
            Guard::Always => true,
            Guard::Selection => self.cursor.has_selection(),
            Guard::SelectMode => self.select_mode,
        }
    }

    fn run_content(&mut self, ch: char) -> Option<Step> {
        for i in 0..self.keymap.content().len() {
            let step = match self.keymap.content()[i] {
                ContentCommand::ClosedBlock => self.closed_block(ch),
                ContentCommand::Type => Some(self.type_char(ch)),
            };
            if step.is_some() {
                return step;
            }
        }
        None
    }

    /// File the step's undo record and update the selection.
    fn settle(&mut self, step: Step, vertical: bool) -> KeyOutcome {
        match step.undo {
            UndoStep::Push(record) => {
                tracing::trace!("push {} at {}", record.kind(), self.cursor.position());
                self.history.push(record);
            }
            UndoStep::Coalesced => self.history.clear_redo(),
            UndoStep::None => {}
        }

        if step.selecting {
            self.hint_on(Hint::Selection);
        } else {
            self.cursor.clear_anchor();
            self.select_mode = false;
            self.hint_off(Hint::Selection);
        }
        if !vertical {
            self.cursor.reset_sticky();
        }

        match step.request {
            Some(Request::Save) => KeyOutcome::Save,
            Some(Request::Close) => KeyOutcome::Close,
            None => KeyOutcome::Handled,
        }
    }

    fn run(&mut self, command: Command) -> Result<Option<Step>, EditorError> {
        use Command as C;

        Ok(match command {
            C::Up | C::Down | C::Left | C::Right | C::Home | C::End => self.movement(command, false),
            C::WordLeft | C::WordRight | C::PageUp | C::PageDown => self.movement(command, false),
            C::SelectUp => self.movement(C::Up, true),
            C::SelectDown => self.movement(C::Down, true),
            C::SelectLeft => self.movement(C::Left, true),
            C::SelectRight => self.movement(C::Right, true),
            C::ToggleSelectMode => Some(self.toggle_select_mode()),

            C::Return => Some(self.return_key()),
            C::Backspace => self.backspace(),
            C::Tab => Some(self.tab()),

            C::Copy => Some(self.copy()?),
            C::Cut => self.cut()?,
            C::Paste => self.paste()?,

            C::ShiftLeft => self.shift_selection(ShiftDirection::Left),
            C::ShiftRight => self.shift_selection(ShiftDirection::Right),
            C::ToggleComment => self.toggle_comment(),

            C::Undo => self.undo(),
            C::Redo => self.redo()?,

            C::Find => Some(self.open_find()),
            C::FindAgain => self.find_again()?,
            C::BracketJump => self.bracket_jump(),
            C::CycleLanguage => Some(self.cycle_language()),
            C::Save => Some(Step::request(Request::Save)),
            C::Close => Some(Step::request(Request::Close)),
            C::DebugDump => Some(self.debug_dump()),
        })
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("cursor", &self.cursor)
            .field("select_mode", &self.select_mode)
            .field("rows", &self.doc.row_count())
            .field("lexer", &self.lexer)
            .field("undo", &self.history.undo_count())
            .field("redo", &self.history.redo_count())
            .field("prompts", &self.prompts.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
