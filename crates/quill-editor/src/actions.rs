//! Commands — what each key binding does, and how its edit is undone.
//!
//! Every undoable command is split in two: a *core* that performs the edit
//! at the current cursor/selection and returns its [`UndoRecord`], and the
//! key-facing wrapper that turns the record into a [`Step`]. Redo calls the
//! same core after restoring the cursor and selection the record captured,
//! so redoing produces exactly what doing did.

use crate::editor::{Editor, Step, UndoStep};
use crate::error::EditorError;
use crate::history::{Removed, ShiftDirection, UndoRecord};
use crate::keymap::Command;
use crate::language;
use crate::position::{Position, Span};
use crate::search::{self, Direction, Matcher};

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

impl Editor {
    pub(crate) fn movement(&mut self, command: Command, extend: bool) -> Option<Step> {
        let before = self.cursor.position();
        let moved = match command {
            Command::Up => before.row > 0 && self.vertical(before.row - 1),
            Command::Down => before.row < self.doc.last_row() && self.vertical(before.row + 1),
            Command::Left => self.back(),
            Command::Right => self.forward(),
            Command::Home => {
                self.move_to(Position::new(before.row, 0));
                true
            }
            Command::End => {
                self.move_to(Position::new(before.row, self.doc.row_len(before.row)));
                true
            }
            Command::WordLeft => self.word_left(),
            Command::WordRight => self.word_right(),
            Command::PageUp => {
                before.row > 0 && self.vertical(before.row.saturating_sub(self.page_rows()))
            }
            Command::PageDown => {
                before.row < self.doc.last_row()
                    && self.vertical((before.row + self.page_rows()).min(self.doc.last_row()))
            }
            _ => false,
        };
        if !moved {
            return None;
        }

        let selecting = extend || self.select_mode;
        if selecting {
            self.cursor.ensure_anchor(before);
        }
        Some(Step {
            selecting,
            ..Step::done()
        })
    }

    /// Move to `row`, aiming for the sticky column.
    fn vertical(&mut self, row: usize) -> bool {
        let col = self.cursor.sticky_col().min(self.doc.row_len(row));
        self.move_to(Position::new(row, col));
        true
    }

    fn page_rows(&self) -> usize {
        self.text_height().max(1)
    }

    fn word_right(&mut self) -> bool {
        let start = self.cursor.position();
        let mut pos = start;
        while let Some(next) = self.next_pos(pos).filter(|_| !self.is_word_at(pos)) {
            pos = next;
        }
        while let Some(next) = self.next_pos(pos).filter(|_| self.is_word_at(pos)) {
            pos = next;
        }
        if pos == start {
            return false;
        }
        self.move_to(pos);
        true
    }

    fn word_left(&mut self) -> bool {
        let start = self.cursor.position();
        let mut pos = start;
        while let Some(prev) = self.prev_pos(pos).filter(|&p| !self.is_word_at(p)) {
            pos = prev;
        }
        while let Some(prev) = self.prev_pos(pos).filter(|&p| self.is_word_at(p)) {
            pos = prev;
        }
        if pos == start {
            return false;
        }
        self.move_to(pos);
        true
    }

    fn is_word_at(&self, pos: Position) -> bool {
        self.doc
            .char_at(pos)
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
    }

    fn next_pos(&self, pos: Position) -> Option<Position> {
        if self.doc.is_end(pos) {
            None
        } else if self.doc.is_eol(pos) {
            Some(Position::new(pos.row + 1, 0))
        } else {
            Some(Position::new(pos.row, pos.col + 1))
        }
    }

    fn prev_pos(&self, pos: Position) -> Option<Position> {
        if pos.col > 0 {
            Some(Position::new(pos.row, pos.col - 1))
        } else if pos.row > 0 {
            Some(Position::new(pos.row - 1, self.doc.row_len(pos.row - 1)))
        } else {
            None
        }
    }

    pub(crate) fn toggle_select_mode(&mut self) -> Step {
        if self.select_mode {
            return Step::done();
        }
        self.select_mode = true;
        self.cursor.ensure_anchor(self.cursor.position());
        Step::selecting()
    }
}

// ---------------------------------------------------------------------------
// Editing commands
// ---------------------------------------------------------------------------

impl Editor {
    /// Type `ch`, extending the last typing run when it ends here.
    pub(crate) fn type_char(&mut self, ch: char) -> Step {
        let at = self.cursor.position();
        let coalesce = self
            .history
            .last_mut()
            .is_some_and(|record| record.continues_typing(at));
        self.insert_char(ch);
        let end = self.cursor.position();

        if coalesce {
            if let Some(UndoRecord::Type { chars, end: run_end, .. }) = self.history.last_mut() {
                chars.push(ch);
                *run_end = end;
            }
            return Step {
                undo: UndoStep::Coalesced,
                ..Step::done()
            };
        }
        Step::push(UndoRecord::Type {
            at,
            chars: vec![ch],
            end,
        })
    }

    /// Type a closer on a blank row, dedenting the row first.
    pub(crate) fn closed_block(&mut self, ch: char) -> Option<Step> {
        self.closed_block_core(ch).map(Step::push)
    }

    fn closed_block_core(&mut self, ch: char) -> Option<UndoRecord> {
        let state = self.lexer.state();
        let depth = state.depth;
        if depth == 0 || !self.engine().should_close_block(state, ch) {
            return None;
        }
        let at = self.cursor.position();
        let row = self.doc.row(at.row);
        if !row.iter().all(|&c| c == ' ') {
            return None;
        }
        let old_count = row.len();

        self.move_to(Position::new(at.row, 0));
        self.erase(old_count);
        self.insert(&vec![' '; (depth - 1) * self.tab_spaces]);
        self.insert_char(ch);
        Some(UndoRecord::ClosedBlock { at, old_count, ch })
    }

    pub(crate) fn return_key(&mut self) -> Step {
        Step::push(self.return_core())
    }

    /// Break the row and indent the new one to the lexical depth.
    fn return_core(&mut self) -> UndoRecord {
        let at = self.cursor.position();
        self.break_row();
        let state = self.lexer.state();
        let continuation = self.engine().line_continuation(state);
        let mut indent = vec![' '; state.depth * self.tab_spaces];
        indent.extend(continuation.chars());
        self.insert(&indent);
        UndoRecord::Return {
            at,
            indent: indent.len(),
        }
    }

    pub(crate) fn backspace(&mut self) -> Option<Step> {
        self.backspace_core().map(Step::push)
    }

    fn backspace_core(&mut self) -> Option<UndoRecord> {
        let at = self.cursor.position();
        if !self.back() {
            return None;
        }
        let to = self.cursor.position();
        let removed = if self.eol() { Removed::RowBreak } else { Removed::Char(self.peek()) };
        self.erase(1);
        Some(UndoRecord::Backspace { at, to, removed })
    }

    pub(crate) fn tab(&mut self) -> Step {
        Step::push(self.tab_core())
    }

    /// Insert spaces up to the next tab stop.
    fn tab_core(&mut self) -> UndoRecord {
        let at = self.cursor.position();
        let spaces = self.tab_spaces - at.col % self.tab_spaces;
        self.insert(&vec![' '; spaces]);
        UndoRecord::Tab { at, spaces }
    }

    /// Replace `target` at `at` with `replacement`.
    pub(crate) fn replace_core(&mut self, at: Position, target: Vec<char>, replacement: Vec<char>) -> UndoRecord {
        self.move_to(at);
        self.erase(target.len());
        self.insert(&replacement);
        UndoRecord::Replace {
            at,
            target,
            replacement,
        }
    }
}

// ---------------------------------------------------------------------------
// Clipboard commands
// ---------------------------------------------------------------------------

impl Editor {
    pub(crate) fn copy(&mut self) -> Result<Step, EditorError> {
        let chars = self.doc.span_chars(self.cursor.span());
        self.clipboard.borrow_mut().set(&chars)?;
        Ok(Step::done())
    }

    pub(crate) fn cut(&mut self) -> Result<Option<Step>, EditorError> {
        Ok(self.cut_core()?.map(Step::push))
    }

    /// Copy the selection to the clipboard, then erase it.
    fn cut_core(&mut self) -> Result<Option<UndoRecord>, EditorError> {
        let (Some(span), Some(anchor)) = (self.cursor.selection(), self.cursor.anchor()) else {
            return Ok(None);
        };
        let cursor = self.cursor.position();
        let chars = self.doc.span_chars(span);
        self.clipboard.borrow_mut().set(&chars)?;

        self.move_to(span.start);
        self.erase(chars.len());
        Ok(Some(UndoRecord::Cut {
            cursor,
            anchor,
            chars,
        }))
    }

    pub(crate) fn paste(&mut self) -> Result<Option<Step>, EditorError> {
        let chars = self.clipboard.borrow_mut().get()?;
        let Some(chars) = chars.filter(|chars| !chars.is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Step::push(self.paste_core(chars))))
    }

    /// Insert `chars` at the cursor, replacing the selection if there is one.
    fn paste_core(&mut self, chars: Vec<char>) -> UndoRecord {
        let erased = match (self.cursor.selection(), self.cursor.anchor()) {
            (Some(span), Some(anchor)) => {
                let cursor = self.cursor.position();
                let erased = self.doc.span_chars(span);
                self.move_to(span.start);
                self.erase(erased.len());
                Some((cursor, anchor, erased))
            }
            _ => None,
        };
        let at = self.cursor.position();
        self.insert(&chars);
        UndoRecord::Paste { at, chars, erased }
    }
}

// ---------------------------------------------------------------------------
// Selection commands
// ---------------------------------------------------------------------------

impl Editor {
    /// The span between anchor and cursor, empty or not.
    fn anchored_span(&self) -> Option<Span> {
        self.cursor
            .anchor()
            .map(|anchor| Span::ordered(anchor, self.cursor.position()))
    }

    pub(crate) fn shift_selection(&mut self, direction: ShiftDirection) -> Option<Step> {
        let record = self.shift_core(direction)?;
        Some(Step {
            selecting: true,
            undo: UndoStep::Push(record),
            request: None,
        })
    }

    /// Shift every row the selection covers by one tab stop.
    fn shift_core(&mut self, direction: ShiftDirection) -> Option<UndoRecord> {
        let span = self.anchored_span()?;
        let cursor = self.cursor.position();
        let anchor = self.cursor.anchor()?;
        let tab = self.tab_spaces;

        let rows = self.rewrite_rows(span, |row| match direction {
            ShiftDirection::Left => {
                let n = row.iter().take(tab).take_while(|&&c| c == ' ').count();
                (n > 0).then(|| row[n..].to_vec())
            }
            ShiftDirection::Right => (!row.is_empty()).then(|| {
                let mut shifted = vec![' '; tab];
                shifted.extend_from_slice(row);
                shifted
            }),
        })?;
        Some(UndoRecord::ShiftSelection {
            direction,
            cursor,
            anchor,
            rows,
        })
    }

    pub(crate) fn toggle_comment(&mut self) -> Option<Step> {
        let record = self.toggle_comment_core()?;
        Some(Step {
            selecting: true,
            undo: UndoStep::Push(record),
            request: None,
        })
    }

    /// Comment out the covered rows, or uncomment them if the first one is
    /// already a comment.
    fn toggle_comment_core(&mut self) -> Option<UndoRecord> {
        let engine = self.engine();
        let marker: Vec<char> = engine.comment_marker().chars().collect();
        if marker.is_empty() {
            return None;
        }
        let span = self.anchored_span()?;
        let cursor = self.cursor.position();
        let anchor = self.cursor.anchor()?;
        let uncomment = engine.is_comment_line(self.doc.row(span.start.row));

        let rows = self.rewrite_rows(span, |row| {
            let indent = row.iter().take_while(|&&c| c == ' ').count();
            if uncomment {
                if !row[indent..].starts_with(&marker) {
                    return None;
                }
                let mut end = indent + marker.len();
                if row.get(end) == Some(&' ') {
                    end += 1;
                }
                Some([&row[..indent], &row[end..]].concat())
            } else if indent == row.len() {
                None
            } else {
                Some([&row[..indent], marker.as_slice(), &[' '][..], &row[indent..]].concat())
            }
        })?;
        Some(UndoRecord::ToggleComment { cursor, anchor, rows })
    }

    /// Rewrite the rows `span` covers with `f` (`None` leaves a row alone),
    /// then select the rewritten rows whole. Returns the old contents of the
    /// rows that changed, or `None` if none did.
    fn rewrite_rows(
        &mut self,
        span: Span,
        f: impl Fn(&[char]) -> Option<Vec<char>>,
    ) -> Option<Vec<(usize, Vec<char>)>> {
        let mut changed = Vec::new();
        for row in span.covered_rows() {
            if let Some(new) = f(self.doc.row(row)) {
                let old = self.replace_row(row, new);
                changed.push((row, old));
            }
        }
        if changed.is_empty() {
            return None;
        }

        let rows = span.covered_rows();
        let anchor = if span.end.col == 0 && span.end.row > span.start.row {
            Position::new(span.end.row, 0)
        } else {
            Position::new(*rows.end(), self.doc.row_len(*rows.end()))
        };
        self.move_to(Position::new(*rows.start(), 0));
        self.cursor.set_anchor_at(anchor);
        Some(changed)
    }

    /// Put back the pre-command selection and stay in selection mode.
    fn restore_selection(&mut self, cursor: Position, anchor: Position) {
        self.move_to(cursor);
        self.cursor.set_anchor_at(anchor);
        self.select_mode = true;
    }
}

// ---------------------------------------------------------------------------
// Undo / redo
// ---------------------------------------------------------------------------

impl Editor {
    pub(crate) fn undo(&mut self) -> Option<Step> {
        let record = self.history.pop_undo()?;
        tracing::trace!("undo {}", record.kind());
        let selecting = self.apply_inverse(&record);
        self.history.push_undone(record);
        Some(Step {
            selecting,
            ..Step::done()
        })
    }

    /// Apply `record`'s inverse. Returns whether the restored state has a
    /// selection to keep.
    fn apply_inverse(&mut self, record: &UndoRecord) -> bool {
        match record {
            UndoRecord::Type { at, chars, .. } => {
                self.move_to(*at);
                self.erase(chars.len());
            }
            UndoRecord::Backspace { to, removed, .. } => {
                self.move_to(*to);
                match *removed {
                    Removed::RowBreak => self.break_row(),
                    Removed::Char(ch) => self.insert_char(ch),
                }
            }
            UndoRecord::Return { at, indent } => {
                self.move_to(Position::new(at.row + 1, 0));
                self.erase(*indent);
                self.move_to(*at);
                self.erase(1);
            }
            UndoRecord::Cut {
                cursor,
                anchor,
                chars,
            } => {
                self.move_to((*cursor).min(*anchor));
                self.insert(chars);
                self.move_to(*cursor);
            }
            UndoRecord::Paste { at, chars, erased } => {
                self.move_to(*at);
                self.erase(chars.len());
                if let Some((cursor, anchor, erased)) = erased {
                    self.insert(erased);
                    self.move_to(*cursor);
                    self.cursor.set_anchor_at(*anchor);
                    return true;
                }
            }
            UndoRecord::Tab { at, spaces } => {
                self.move_to(*at);
                self.erase(*spaces);
            }
            UndoRecord::ClosedBlock { at, old_count, .. } => {
                self.move_to(Position::new(at.row, 0));
                self.erase(self.doc.row_len(at.row));
                self.insert(&vec![' '; *old_count]);
                self.move_to(*at);
            }
            UndoRecord::ShiftSelection {
                cursor,
                anchor,
                rows,
                ..
            }
            | UndoRecord::ToggleComment {
                cursor,
                anchor,
                rows,
            } => {
                for (row, old) in rows {
                    self.replace_row(*row, old.clone());
                }
                self.restore_selection(*cursor, *anchor);
                return true;
            }
            UndoRecord::Replace {
                at,
                target,
                replacement,
            } => {
                self.move_to(*at);
                self.erase(replacement.len());
                self.insert(target);
                self.move_to(*at);
            }
        }
        false
    }

    pub(crate) fn redo(&mut self) -> Result<Option<Step>, EditorError> {
        let Some(record) = self.history.pop_redo() else {
            return Ok(None);
        };
        tracing::trace!("redo {}", record.kind());
        match self.run_again(&record) {
            Ok(Some((redone, selecting))) => {
                self.history.push_redone(redone);
                Ok(Some(Step {
                    selecting,
                    ..Step::done()
                }))
            }
            Ok(None) => {
                tracing::warn!("redo of {} changed nothing", record.kind());
                Ok(None)
            }
            Err(err) => {
                self.history.push_undone(record);
                Err(err)
            }
        }
    }

    /// Run the command that produced `record` again from the same cursor
    /// and selection.
    fn run_again(&mut self, record: &UndoRecord) -> Result<Option<(UndoRecord, bool)>, EditorError> {
        let redone = match record {
            UndoRecord::Type { at, chars, .. } => {
                self.move_to(*at);
                self.insert(chars);
                Some(UndoRecord::Type {
                    at: *at,
                    chars: chars.clone(),
                    end: self.cursor.position(),
                })
            }
            UndoRecord::Backspace { at, .. } => {
                self.move_to(*at);
                self.backspace_core()
            }
            UndoRecord::Return { at, .. } => {
                self.move_to(*at);
                Some(self.return_core())
            }
            UndoRecord::Cut { cursor, anchor, .. } => {
                self.move_to(*cursor);
                self.cursor.set_anchor_at(*anchor);
                self.cut_core()?
            }
            UndoRecord::Paste { at, chars, erased } => {
                match erased {
                    Some((cursor, anchor, _)) => {
                        self.move_to(*cursor);
                        self.cursor.set_anchor_at(*anchor);
                    }
                    None => self.move_to(*at),
                }
                Some(self.paste_core(chars.clone()))
            }
            UndoRecord::Tab { at, .. } => {
                self.move_to(*at);
                Some(self.tab_core())
            }
            UndoRecord::ClosedBlock { at, ch, .. } => {
                self.move_to(*at);
                self.closed_block_core(*ch)
            }
            UndoRecord::ShiftSelection {
                direction,
                cursor,
                anchor,
                ..
            } => {
                self.restore_selection(*cursor, *anchor);
                return Ok(self.shift_core(*direction).map(|r| (r, true)));
            }
            UndoRecord::ToggleComment { cursor, anchor, .. } => {
                self.restore_selection(*cursor, *anchor);
                return Ok(self.toggle_comment_core().map(|r| (r, true)));
            }
            UndoRecord::Replace {
                at,
                target,
                replacement,
            } => Some(self.replace_core(*at, target.clone(), replacement.clone())),
        };
        Ok(redone.map(|r| (r, false)))
    }
}

// ---------------------------------------------------------------------------
// Navigation and miscellany
// ---------------------------------------------------------------------------

impl Editor {
    /// Repeat the last find, from just past the cursor.
    pub(crate) fn find_again(&mut self) -> Result<Option<Step>, EditorError> {
        let Some((query, direction)) = self.last_find.clone() else {
            self.set_status("Nothing to find");
            return Ok(None);
        };
        let matcher = Matcher::new(&query)?;
        let pos = self.cursor.position();
        let from = match direction {
            Direction::Forward => Position::new(pos.row, pos.col + 1),
            Direction::Backward => pos,
        };
        match search::find(&self.doc, &matcher, from, direction) {
            Some(m) => {
                self.move_to(m.start);
                Ok(Some(Step::done()))
            }
            None => {
                self.set_status("Not found");
                Ok(None)
            }
        }
    }

    /// Jump to the bracket that matches the one at (or just before) the
    /// cursor, or else to the closer of the enclosing block.
    pub(crate) fn bracket_jump(&mut self) -> Option<Step> {
        let pos = self.cursor.position();
        let target = self
            .closer_of_opener_here()
            .or_else(|| self.opener_of_closer_before())
            .or_else(|| self.enclosing_closer())
            .filter(|&target| target != pos)?;
        self.move_to(target);
        Some(Step::done())
    }

    fn closer_of_opener_here(&self) -> Option<Position> {
        let pos = self.cursor.position();
        if self.doc.is_end(pos) || !self.engine().should_open_block(self.state(), self.doc.peek(pos)) {
            return None;
        }
        let base = self.state().stack.len();
        self.scan_ahead(|len| len <= base)
    }

    fn enclosing_closer(&self) -> Option<Position> {
        let base = self.state().stack.len();
        if base == 0 {
            return None;
        }
        self.scan_ahead(|len| len < base)
    }

    /// Scan forward from the cursor; the position of the first character
    /// after which the stack length satisfies `done`.
    fn scan_ahead(&self, done: impl Fn(usize) -> bool) -> Option<Position> {
        let engine = self.engine();
        let mut state = self.state().clone();
        let mut pos = self.cursor.position();
        while !self.doc.is_end(pos) {
            engine.parse(&mut state, self.doc.peek(pos));
            if done(state.stack.len()) {
                return Some(pos);
            }
            pos = self.next_pos(pos)?;
        }
        None
    }

    fn opener_of_closer_before(&self) -> Option<Position> {
        let pos = self.cursor.position();
        if pos.col == 0 {
            return None;
        }
        let engine = self.engine();
        let row = self.doc.row(pos.row);
        let mut state = self.lexer.snapshot(pos.row)?.clone();
        for &ch in &row[..pos.col - 1] {
            engine.parse(&mut state, ch);
        }
        if !engine.should_close_block(&state, row[pos.col - 1]) {
            return None;
        }

        // The opener is the last character before the closer that took the
        // stack to its current length.
        let open_len = state.stack.len();
        for r in (0..=pos.row).rev() {
            let mut state = self.lexer.snapshot(r)?.clone();
            let chars = self.doc.row(r);
            let end = if r == pos.row { pos.col - 1 } else { chars.len() };
            let mut found = None;
            for (col, &ch) in chars[..end].iter().enumerate() {
                let before = state.stack.len();
                engine.parse(&mut state, ch);
                if before + 1 == open_len && state.stack.len() == open_len {
                    found = Some(Position::new(r, col));
                }
            }
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Switch to the next language engine and re-lex up to the cursor.
    pub(crate) fn cycle_language(&mut self) -> Step {
        let engine = language::next_after(self.engine());
        self.set_language(engine);
        self.set_status(format!("Language: {}", engine.name()));
        Step::done()
    }

    /// Switch language engines. Rows are re-lexed as the cursor reaches them.
    pub fn set_language(&mut self, engine: &'static dyn language::LanguageEngine) {
        tracing::info!("language: {} -> {}", self.engine().name(), engine.name());
        let pos = self.cursor.position();
        self.lexer.reset(engine);
        self.cursor.set_position(Position::ZERO);
        self.move_to(pos);
    }

    /// Log the editor's internals.
    pub(crate) fn debug_dump(&mut self) -> Step {
        tracing::info!("{self:?}");
        tracing::info!("state at cursor: {:?}", self.state());
        match self.lexer.first_inconsistent_row(&self.doc) {
            Some(row) => tracing::warn!("lexer snapshot after row {row} is stale"),
            None => tracing::info!("lexer snapshots consistent"),
        }
        self.set_status("Editor state written to log");
        Step::done()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardStore, MemoryClipboard, SharedClipboard, shared};
    use crate::document::Document;
    use crate::editor::KeyOutcome;
    use crate::error::ClipboardError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use quill_term::input::Key;

    fn editor(text: &str) -> Editor {
        Editor::new(
            Document::from_text(text),
            language::by_name("JavaScript").unwrap(),
            shared(MemoryClipboard::new()),
        )
    }

    fn at(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn keys(ed: &mut Editor, keys: &[Key]) {
        for &key in keys {
            ed.handle_key(key);
        }
    }

    fn type_str(ed: &mut Editor, s: &str) {
        for ch in s.chars() {
            let key = if ch == '\n' { Key::Enter } else { Key::Char(ch) };
            ed.handle_key(key);
        }
    }

    fn select(ed: &mut Editor, from: Position, to: Position) {
        ed.move_to(from);
        ed.cursor.set_anchor();
        ed.move_to(to);
    }

    // -- Typing and coalescing ----------------------------------------------

    #[test]
    fn typing_a_word_undoes_at_once() {
        let mut ed = editor("");
        type_str(&mut ed, "hello");
        assert_eq!(ed.text(), "hello");
        assert_eq!(ed.history().undo_count(), 1);

        assert_eq!(ed.handle_key(Key::Ctrl('z')), KeyOutcome::Handled);
        assert_eq!(ed.text(), "");
        assert_eq!(ed.position(), at(0, 0));
        assert_eq!(ed.handle_key(Key::Ctrl('z')), KeyOutcome::Bell);
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn space_splits_runs() {
        let mut ed = editor("");
        type_str(&mut ed, "ab cd");
        assert_eq!(ed.history().undo_count(), 2);
        ed.handle_key(Key::Ctrl('z'));
        assert_eq!(ed.text(), "ab ");
    }

    #[test]
    fn moving_away_splits_runs() {
        let mut ed = editor("");
        type_str(&mut ed, "ab");
        keys(&mut ed, &[Key::Left]);
        type_str(&mut ed, "x");
        assert_eq!(ed.text(), "axb");
        assert_eq!(ed.history().undo_count(), 2);
    }

    #[test]
    fn coalesced_typing_clears_redo() {
        let mut ed = editor("");
        type_str(&mut ed, "ab");
        keys(&mut ed, &[Key::Tab, Key::Ctrl('z')]);
        assert!(ed.history().can_redo());
        type_str(&mut ed, "c");
        assert!(!ed.history().can_redo());
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn redo_typing() {
        let mut ed = editor("");
        type_str(&mut ed, "hey");
        keys(&mut ed, &[Key::Ctrl('z'), Key::Ctrl('y')]);
        assert_eq!(ed.text(), "hey");
        assert_eq!(ed.position(), at(0, 3));
        assert_eq!(ed.handle_key(Key::Ctrl('y')), KeyOutcome::Bell);
    }

    // -- Auto-dedent --------------------------------------------------------

    #[test]
    fn closer_on_blank_row_dedents() {
        let mut ed = editor("if (x) {\n  ");
        ed.move_to(at(1, 2));
        assert_eq!(ed.state().depth, 1);
        type_str(&mut ed, "}");
        assert_eq!(ed.text(), "if (x) {\n}");
        assert_eq!(ed.position(), at(1, 1));

        ed.handle_key(Key::Ctrl('z'));
        assert_eq!(ed.text(), "if (x) {\n  ");
        assert_eq!(ed.position(), at(1, 2));

        ed.handle_key(Key::Ctrl('y'));
        assert_eq!(ed.text(), "if (x) {\n}");
    }

    #[test]
    fn nested_closer_keeps_outer_indent() {
        let mut ed = editor("{\n  [\n      ");
        ed.move_to(at(2, 6));
        type_str(&mut ed, "]");
        assert_eq!(ed.document().row_text(2), "  ]");
    }

    #[test]
    fn closer_after_text_is_typed() {
        let mut ed = editor("{\n  x");
        ed.move_to(at(1, 3));
        type_str(&mut ed, "}");
        assert_eq!(ed.document().row_text(1), "  x}");
    }

    // -- Return -------------------------------------------------------------

    #[test]
    fn return_indents_to_depth() {
        let mut ed = editor("");
        type_str(&mut ed, "f(() => {\nx");
        assert_eq!(ed.text(), "f(() => {\n    x");
        keys(&mut ed, &[Key::Ctrl('z'), Key::Ctrl('z')]);
        assert_eq!(ed.text(), "f(() => {");
        assert_eq!(ed.position(), at(0, 9));
    }

    #[test]
    fn return_in_block_comment_continues_it() {
        let mut ed = editor("/** doc");
        ed.move_to(at(0, 7));
        keys(&mut ed, &[Key::Enter]);
        assert_eq!(ed.text(), "/** doc\n * ");
        ed.handle_key(Key::Ctrl('z'));
        assert_eq!(ed.text(), "/** doc");
    }

    #[test]
    fn return_mid_row_carries_remainder() {
        let mut ed = editor("{}");
        ed.move_to(at(0, 1));
        keys(&mut ed, &[Key::Enter]);
        assert_eq!(ed.text(), "{\n  }");
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "{}");
        assert_eq!(ed.position(), at(0, 1));
    }

    // -- Backspace and tab --------------------------------------------------

    #[test]
    fn backspace_joins_rows_and_undoes() {
        let mut ed = editor("ab\ncd");
        ed.move_to(at(1, 0));
        keys(&mut ed, &[Key::Backspace]);
        assert_eq!(ed.text(), "abcd");
        assert_eq!(ed.position(), at(0, 2));
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "ab\ncd");
        assert_eq!(ed.position(), at(1, 0));
        keys(&mut ed, &[Key::Ctrl('y')]);
        assert_eq!(ed.text(), "abcd");
    }

    #[test]
    fn backspace_over_a_carriage_return_keeps_the_rows() {
        let mut ed = editor("a\rb\nc");
        ed.move_to(at(0, 2));
        keys(&mut ed, &[Key::Backspace]);
        assert_eq!(ed.text(), "ab\nc");
        assert_eq!(ed.position(), at(0, 1));
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "a\rb\nc");
        assert_eq!(ed.position(), at(0, 2));
        assert_eq!(ed.document().row_count(), 2);
    }

    #[test]
    fn backspace_at_start_is_a_no_op() {
        let mut ed = editor("ab");
        assert_eq!(ed.handle_key(Key::Backspace), KeyOutcome::Bell);
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn tab_to_next_stop() {
        let mut ed = editor("abc");
        ed.move_to(at(0, 1));
        keys(&mut ed, &[Key::Tab]);
        assert_eq!(ed.text(), "a bc");
        keys(&mut ed, &[Key::Tab]);
        assert_eq!(ed.text(), "a   bc");
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "a bc");
    }

    // -- Clipboard ----------------------------------------------------------

    #[test]
    fn cut_then_paste_elsewhere() {
        let mut ed = editor("one\ntwo\nthree\nfour");
        select(&mut ed, at(0, 2), at(1, 2));
        keys(&mut ed, &[Key::Ctrl('x')]);
        assert_eq!(ed.text(), "ono\nthree\nfour");
        assert_eq!(
            ed.clipboard.borrow_mut().get().unwrap(),
            Some(vec!['e', '\r', 't', 'w'])
        );
        assert!(!ed.cursor().has_selection());

        ed.move_to(at(2, 4));
        keys(&mut ed, &[Key::Ctrl('v')]);
        assert_eq!(ed.text(), "ono\nthree\nfoure\ntw");
        assert_eq!(ed.position(), at(3, 2));
    }

    #[test]
    fn undo_cut_and_paste() {
        let mut ed = editor("abc def");
        select(&mut ed, at(0, 0), at(0, 4));
        keys(&mut ed, &[Key::Ctrl('x')]);
        ed.move_to(at(0, 3));
        keys(&mut ed, &[Key::Ctrl('v')]);
        assert_eq!(ed.text(), "defabc ");

        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "def");
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "abc def");
        assert_eq!(ed.position(), at(0, 4));

        keys(&mut ed, &[Key::Ctrl('y'), Key::Ctrl('y')]);
        assert_eq!(ed.text(), "defabc ");
    }

    #[test]
    fn paste_replaces_selection() {
        let mut ed = editor("hello world");
        ed.clipboard.borrow_mut().set(&['X']).unwrap();
        select(&mut ed, at(0, 6), at(0, 11));
        keys(&mut ed, &[Key::Ctrl('v')]);
        assert_eq!(ed.text(), "hello X");
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "hello world");
        assert_eq!(ed.cursor().selection(), Some(Span::new(at(0, 6), at(0, 11))));
    }

    #[test]
    fn copy_needs_a_selection() {
        let mut ed = editor("abc");
        assert_eq!(ed.handle_key(Key::Ctrl('c')), KeyOutcome::Bell);
        select(&mut ed, at(0, 0), at(0, 2));
        assert_eq!(ed.handle_key(Key::Ctrl('c')), KeyOutcome::Handled);
        assert_eq!(ed.clipboard.borrow_mut().get().unwrap(), Some(vec!['a', 'b']));
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn paste_with_empty_clipboard_is_a_no_op() {
        let mut ed = editor("abc");
        assert_eq!(ed.handle_key(Key::Ctrl('v')), KeyOutcome::Bell);
    }

    struct LockedClipboard;

    impl ClipboardStore for LockedClipboard {
        fn get(&mut self) -> Result<Option<Vec<char>>, ClipboardError> {
            Err(ClipboardError::LockTimeout {
                path: "clip.lock".into(),
                attempts: 20,
            })
        }

        fn set(&mut self, _chars: &[char]) -> Result<(), ClipboardError> {
            self.get().map(|_| ())
        }
    }

    #[test]
    fn clipboard_failure_leaves_document_alone() {
        let clipboard: SharedClipboard = shared(LockedClipboard);
        let mut ed = Editor::new(Document::from_text("abc"), language::plain_text(), clipboard);
        select(&mut ed, at(0, 0), at(0, 2));
        assert_eq!(ed.handle_key(Key::Ctrl('x')), KeyOutcome::Bell);
        assert_eq!(ed.text(), "abc");
        assert!(ed.take_status().unwrap().contains("clipboard is locked"));
        assert_eq!(ed.handle_key(Key::Ctrl('v')), KeyOutcome::Bell);
        assert_eq!(ed.text(), "abc");
    }

    // -- Selection mode -----------------------------------------------------

    #[test]
    fn escape_toggles_selection_mode() {
        let mut ed = editor("abc");
        keys(&mut ed, &[Key::Escape, Key::Right, Key::Right]);
        assert!(ed.select_mode());
        assert_eq!(ed.cursor().selection(), Some(Span::new(at(0, 0), at(0, 2))));
        keys(&mut ed, &[Key::Escape]);
        assert!(!ed.select_mode());
        assert!(!ed.cursor().has_selection());
    }

    #[test]
    fn shift_arrows_extend_then_plain_arrow_clears() {
        let mut ed = editor("abc\ndef");
        keys(&mut ed, &[Key::ShiftRight, Key::ShiftDown]);
        assert_eq!(ed.cursor().selection(), Some(Span::new(at(0, 0), at(1, 1))));
        keys(&mut ed, &[Key::Left]);
        assert!(ed.cursor().selection().is_none());
    }

    #[test]
    fn shift_right_and_left() {
        let mut ed = editor("a\nb\n\nc");
        keys(&mut ed, &[Key::Escape, Key::Down, Key::Down, Key::Down]);
        keys(&mut ed, &[Key::Char(']')]);
        assert_eq!(ed.text(), "  a\n  b\n\nc");
        assert_eq!(ed.cursor().selection(), Some(Span::new(at(0, 0), at(3, 0))));
        assert!(ed.select_mode());

        keys(&mut ed, &[Key::Char('[')]);
        assert_eq!(ed.text(), "a\nb\n\nc");
        assert_eq!(ed.handle_key(Key::Char('[')), KeyOutcome::Bell);

        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "  a\n  b\n\nc");
        assert!(ed.select_mode());
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "a\nb\n\nc");
        keys(&mut ed, &[Key::Ctrl('y')]);
        assert_eq!(ed.text(), "  a\n  b\n\nc");
    }

    #[test]
    fn toggle_comment_round_trip() {
        let mut ed = editor("  x = 1;\n  y = 2;\nz");
        keys(&mut ed, &[Key::Escape, Key::Down, Key::End]);
        keys(&mut ed, &[Key::Char('c')]);
        assert_eq!(ed.text(), "  // x = 1;\n  // y = 2;\nz");
        keys(&mut ed, &[Key::Char('c')]);
        assert_eq!(ed.text(), "  x = 1;\n  y = 2;\nz");
        keys(&mut ed, &[Key::Ctrl('z')]);
        assert_eq!(ed.text(), "  // x = 1;\n  // y = 2;\nz");
    }

    #[test]
    fn plain_text_has_no_comments() {
        let mut ed = Editor::new(
            Document::from_text("x"),
            language::plain_text(),
            shared(MemoryClipboard::new()),
        );
        keys(&mut ed, &[Key::Escape, Key::Right]);
        assert_eq!(ed.handle_key(Key::Char('c')), KeyOutcome::Bell);
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn word_movement() {
        let mut ed = editor("foo  bar.baz\nqux");
        keys(&mut ed, &[Key::CtrlRight]);
        assert_eq!(ed.position(), at(0, 3));
        keys(&mut ed, &[Key::CtrlRight]);
        assert_eq!(ed.position(), at(0, 8));
        keys(&mut ed, &[Key::CtrlRight, Key::CtrlRight]);
        assert_eq!(ed.position(), at(1, 3));
        keys(&mut ed, &[Key::CtrlLeft]);
        assert_eq!(ed.position(), at(1, 0));
        keys(&mut ed, &[Key::CtrlLeft]);
        assert_eq!(ed.position(), at(0, 9));
    }

    #[test]
    fn movement_at_edges_rings() {
        let mut ed = editor("ab\ncd");
        assert_eq!(ed.handle_key(Key::Up), KeyOutcome::Bell);
        assert_eq!(ed.handle_key(Key::Left), KeyOutcome::Bell);
        ed.move_to(at(1, 2));
        assert_eq!(ed.handle_key(Key::Down), KeyOutcome::Bell);
        assert_eq!(ed.handle_key(Key::Right), KeyOutcome::Bell);
    }

    #[test]
    fn bracket_jump_both_ways() {
        let mut ed = editor("f(a, [b]) {\n  g('}');\n}");
        ed.move_to(at(0, 1));
        keys(&mut ed, &[Key::Ctrl('b')]);
        assert_eq!(ed.position(), at(0, 8));
        ed.move_to(at(0, 9));
        keys(&mut ed, &[Key::Ctrl('b')]);
        assert_eq!(ed.position(), at(0, 1));

        ed.move_to(at(0, 10));
        keys(&mut ed, &[Key::Ctrl('b')]);
        assert_eq!(ed.position(), at(2, 0));
        ed.move_to(at(2, 1));
        keys(&mut ed, &[Key::Ctrl('b')]);
        assert_eq!(ed.position(), at(0, 10));
    }

    #[test]
    fn bracket_jump_to_enclosing_closer() {
        let mut ed = editor("{\n  x;\n}");
        ed.move_to(at(1, 3));
        keys(&mut ed, &[Key::Ctrl('b')]);
        assert_eq!(ed.position(), at(2, 0));
        ed.move_to(at(0, 0));
        ed.doc.replace_row(0, vec!['x']);
        ed.lexer.invalidate_after(0);
        assert_eq!(ed.handle_key(Key::Ctrl('b')), KeyOutcome::Bell);
    }

    #[test]
    fn cycle_language_relexes() {
        let mut ed = editor("{\n");
        ed.move_to(at(1, 0));
        assert_eq!(ed.state().depth, 1);
        keys(&mut ed, &[Key::Ctrl('l')]);
        assert_eq!(ed.engine().name(), "C family");
        assert_eq!(ed.take_status().as_deref(), Some("Language: C family"));
        keys(&mut ed, &[Key::Ctrl('l')]);
        assert_eq!(ed.engine().name(), "Plain text");
        assert_eq!(ed.state().depth, 0);
        assert_eq!(ed.position(), at(1, 0));
    }

    #[test]
    fn find_again_without_query() {
        let mut ed = editor("abc");
        assert_eq!(ed.handle_key(Key::Ctrl('g')), KeyOutcome::Bell);
        assert_eq!(ed.take_status().as_deref(), Some("Nothing to find"));
    }

    // -- Properties ---------------------------------------------------------

    fn key_strategy() -> impl Strategy<Value = Key> {
        prop_oneof![
            4 => prop::sample::select(vec!['a', 'b', ' ', '{', '}', '(', ')', '\'', '/', '*']).prop_map(Key::Char),
            1 => Just(Key::Enter),
            1 => Just(Key::Backspace),
            1 => Just(Key::Tab),
            1 => Just(Key::Left),
            1 => Just(Key::Right),
            1 => Just(Key::Up),
            1 => Just(Key::Down),
            1 => Just(Key::ShiftLeft),
            1 => Just(Key::ShiftUp),
            1 => Just(Key::Escape),
            1 => Just(Key::Ctrl('x')),
            1 => Just(Key::Ctrl('c')),
            1 => Just(Key::Ctrl('v')),
            1 => Just(Key::Char('[')),
            1 => Just(Key::Char(']')),
            1 => Just(Key::Char('c')),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Undoing then redoing the last edit restores the document and
        /// cursor the edit produced.
        #[test]
        fn redo_after_undo_restores_state(
            start in "[a-c {}\n]{0,20}",
            script in prop::collection::vec(key_strategy(), 1..40),
        ) {
            let mut ed = editor(&start);
            for key in script {
                let before = ed.text();
                ed.handle_key(key);
                let text = ed.text();
                if text == before {
                    continue;
                }
                let pos = ed.position();
                prop_assert_eq!(ed.handle_key(Key::Ctrl('z')), KeyOutcome::Handled);
                prop_assert_eq!(ed.handle_key(Key::Ctrl('y')), KeyOutcome::Handled);
                prop_assert_eq!(ed.text(), text);
                prop_assert_eq!(ed.position(), pos);
            }
        }

        /// Undoing everything returns to the starting text.
        #[test]
        fn undo_all_restores_start(
            start in "[a-c {}\n]{0,20}",
            script in prop::collection::vec(key_strategy(), 1..40),
        ) {
            let mut ed = editor(&start);
            for key in script {
                ed.handle_key(key);
            }
            while ed.handle_key(Key::Ctrl('z')) != KeyOutcome::Bell {}
            prop_assert_eq!(ed.text(), start);
        }

        /// Every stored snapshot agrees with re-scanning its row, whatever
        /// edits and moves came before.
        #[test]
        fn lexer_snapshots_stay_consistent(
            start in "[a-c {}()'/*\n]{0,30}",
            script in prop::collection::vec(key_strategy(), 1..60),
        ) {
            let mut ed = editor(&start);
            for key in script {
                ed.handle_key(key);
                prop_assert_eq!(ed.lexer().first_inconsistent_row(ed.document()), None);
            }
            let end = ed.document().end();
            ed.move_to(end);
            prop_assert_eq!(ed.lexer().first_inconsistent_row(ed.document()), None);
            prop_assert_eq!(ed.lexer().snapshot_count(), ed.document().row_count());
        }
    }
}
