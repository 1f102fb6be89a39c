// SPDX-License-Identifier: MIT
//
// QuillApp — the editor wired to the event loop.
//
// The editor engine paints the text area and its prompts. Everything else
// on screen belongs to the app: the status line and the two hint rows.
//
//   ┌──────────────────────────────┐
//   │ text area + prompts          │  ← h - 3 rows (h - 1 with nohints)
//   ├──────────────────────────────┤
//   │ 12:4  main.js +       SELECT │  ← status line (inverse)
//   ├──────────────────────────────┤
//   │ ^S save  ^Q quit  ^F find    │  ← hint rows
//   │ ESC select  ^V paste ...     │
//   └──────────────────────────────┘
//
// The app also owns the file: saving, and the save-before-exit question
// asked when the document differs from what is on disk.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quill_editor::theme::StyleTag;
use quill_editor::{Editor, KeyOutcome, Options};
use quill_term::event_loop::{Action, App};
use quill_term::input::Key;
use quill_term::screen::ScreenBuffer;
use quill_term::terminal::Size;

use crate::file;

const EXIT_QUESTION: &str = "Save before exiting? [Y/n]";

/// Rows under the text area: the status line plus the hint rows.
const fn chrome_rows(hints: bool) -> u16 {
    if hints { 3 } else { 1 }
}

/// The running editor: one file, one screen.
pub struct QuillApp {
    editor: Editor,
    path: PathBuf,
    /// Rows as last loaded or saved, to tell whether there is unsaved work.
    saved: Vec<Vec<char>>,
    screen: ScreenBuffer,
    hints: bool,
    /// Shown on the status line until the next key.
    message: Option<String>,
    confirming_exit: bool,
}

impl QuillApp {
    #[must_use]
    pub fn new(editor: Editor, path: PathBuf, options: &Options) -> Self {
        let saved = editor.document().rows().to_vec();
        Self {
            editor,
            path,
            saved,
            screen: ScreenBuffer::new(0, 0),
            hints: options.hints,
            message: None,
            confirming_exit: false,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    #[cfg(test)]
    #[must_use]
    pub const fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    #[cfg(test)]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether the document differs from the file on disk.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.editor.document().rows() != self.saved.as_slice()
    }

    fn save(&mut self) -> bool {
        match file::save(&self.path, self.editor.document()) {
            Ok(()) => {
                self.saved = self.editor.document().rows().to_vec();
                self.message = Some(format!("Saved {} rows", self.saved.len()));
                true
            }
            Err(err) => {
                tracing::error!("saving {} failed: {err}", self.path.display());
                self.message = Some(format!("Save failed: {err}"));
                self.screen.bell();
                false
            }
        }
    }

    fn close(&mut self) -> Action {
        if self.is_modified() {
            self.confirming_exit = true;
            Action::Continue
        } else {
            Action::Quit
        }
    }

    fn exit_key(&mut self, key: Key) -> Action {
        match key {
            Key::Char('y' | 'Y') | Key::Enter => {
                self.confirming_exit = false;
                if self.save() { Action::Quit } else { Action::Continue }
            }
            Key::Char('n' | 'N') => Action::Quit,
            Key::Escape => {
                self.confirming_exit = false;
                Action::Continue
            }
            _ => {
                self.screen.bell();
                Action::Continue
            }
        }
    }

    // ─── Chrome ──────────────────────────────────────────────────────────

    fn paint_status(&mut self, y: u16) {
        let width = self.screen.width();
        let style = self.editor.theme().style(Some(StyleTag::Status));
        let pos = self.editor.position();
        let name = file_name(&self.path);
        let modified = if self.is_modified() { " +" } else { "" };
        let left = format!(" {}:{}  {name}{modified}", pos.row + 1, pos.col + 1);

        self.screen.clear_row(y, 0, style);
        let end = self.screen.put_str(0, y, &left, style);

        let right = if self.confirming_exit {
            EXIT_QUESTION
        } else if let Some(message) = self.message.as_deref() {
            message
        } else if self.editor.select_mode() {
            "SELECT"
        } else {
            self.editor.engine().name()
        };
        let len = u16::try_from(right.chars().count()).unwrap_or(u16::MAX);
        let fitted = width.saturating_sub(len.saturating_add(1));
        let x = if self.confirming_exit {
            // The question wins over the position and file name.
            self.screen.clear_row(y, fitted.saturating_sub(1), style);
            fitted
        } else {
            fitted.max(end.saturating_add(2))
        };
        let after = self.screen.put_str(x, y, right, style);

        if self.confirming_exit {
            self.screen.set_cursor(after.min(width.saturating_sub(1)), y);
        }
    }

    fn paint_hints(&mut self, y: u16) {
        let style = self.editor.theme().style(Some(StyleTag::Hint));
        let lines = self.editor.hints().unwrap_or(["", ""]);
        for (i, line) in (0u16..).zip(lines) {
            let row = y + i;
            self.screen.clear_row(row, 0, style);
            self.screen.put_str(1, row, line, style);
        }
    }

    /// Paint the next frame into the screen buffer and diff it.
    fn paint(&mut self) {
        let (width, height) = (self.screen.width(), self.screen.height());
        let chrome = chrome_rows(self.hints).min(height);
        let text_height = height - chrome;

        self.editor.set_size(width, text_height);
        let scroll = self.editor.paint(&mut self.screen);

        if chrome > 0 {
            self.paint_status(text_height);
        }
        if self.hints && chrome == 3 {
            self.paint_hints(text_height + 1);
        }

        let stats = self.screen.draw(scroll);
        tracing::trace!("frame: {stats:?}");
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

impl App for QuillApp {
    fn on_key(&mut self, key: Key) -> Action {
        if self.confirming_exit {
            return self.exit_key(key);
        }

        let outcome = self.editor.handle_key(key);
        self.message = self.editor.take_status();
        match outcome {
            KeyOutcome::Handled => Action::Continue,
            KeyOutcome::Bell => {
                self.screen.bell();
                Action::Continue
            }
            KeyOutcome::Save => {
                self.save();
                Action::Continue
            }
            KeyOutcome::Close => self.close(),
        }
    }

    fn on_resize(&mut self, size: Size) {
        tracing::debug!("resize to {}x{}", size.cols, size.rows);
        self.screen.resize(size.cols, size.rows);
        self.screen.force_redraw();
    }

    fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let mut out = out;
        self.paint();
        self.screen.flush_to(&mut out)?;
        out.flush()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_editor::clipboard::{MemoryClipboard, shared};
    use quill_editor::{Document, language};
    use std::fs;
    use tempfile::TempDir;

    fn app_for(dir: &TempDir, name: &str, text: &str, options: &Options) -> QuillApp {
        let path = dir.path().join(name);
        if !text.is_empty() {
            fs::write(&path, text).unwrap();
        }
        let doc = file::load(&path).unwrap();
        let editor = Editor::new(doc, language::for_path(&path), shared(MemoryClipboard::new()))
            .with_options(options);
        let mut app = QuillApp::new(editor, path, options);
        app.on_resize(Size { cols: 40, rows: 8 });
        app
    }

    fn app(dir: &TempDir, text: &str) -> QuillApp {
        app_for(dir, "main.js", text, &Options::default())
    }

    fn frame(app: &mut QuillApp) -> Vec<u8> {
        let mut out = Vec::new();
        app.render(&mut out).unwrap();
        out
    }

    fn row_text(app: &QuillApp, row: u16) -> String {
        let text: String = app.screen().next().row(row).unwrap().iter().map(|c| c.ch).collect();
        text.trim_end().to_string()
    }

    fn type_str(app: &mut QuillApp, s: &str) {
        for ch in s.chars() {
            assert_eq!(app.on_key(Key::Char(ch)), Action::Continue);
        }
    }

    // ── Layout ────────────────────────────────────────────────────────────

    #[test]
    fn text_status_and_hints() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "let a = 1;\nlet b = 2;");
        frame(&mut app);

        assert_eq!(row_text(&app, 0), "let a = 1;");
        assert_eq!(row_text(&app, 1), "let b = 2;");
        assert_eq!(row_text(&app, 4), "");
        let status = row_text(&app, 5);
        assert!(status.starts_with(" 1:1  main.js"), "{status}");
        assert!(status.ends_with("JavaScript"), "{status}");
        assert!(row_text(&app, 6).starts_with(" ^S save"));
        assert!(row_text(&app, 7).starts_with(" ESC select"));
    }

    #[test]
    fn status_line_is_inverse() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "x");
        frame(&mut app);
        let style = app.screen().next().get(0, 5).unwrap().style;
        assert_eq!(style, app.editor().theme().style(Some(StyleTag::Status)));
    }

    #[test]
    fn nohints_gives_rows_to_text() {
        let dir = TempDir::new().unwrap();
        let options = Options {
            hints: false,
            ..Options::default()
        };
        let text: String = (0..10).map(|i| format!("row {i}\n")).collect();
        let mut app = app_for(&dir, "notes.txt", &text, &options);
        frame(&mut app);

        assert_eq!(row_text(&app, 6), "row 6");
        assert!(row_text(&app, 7).starts_with(" 1:1  notes.txt"));
        assert_eq!(app.editor().viewport().height, 7);
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        for (cols, rows) in [(0, 0), (1, 1), (5, 2), (3, 3)] {
            app.on_resize(Size { cols, rows });
            frame(&mut app);
        }
    }

    #[test]
    fn select_mode_and_messages_on_the_right() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        app.on_key(Key::Escape);
        frame(&mut app);
        assert!(row_text(&app, 5).ends_with("SELECT"));

        app.on_key(Key::Ctrl('l'));
        frame(&mut app);
        assert!(row_text(&app, 5).ends_with("Language: C family"), "{}", row_text(&app, 5));

        // Messages last until the next key.
        app.on_key(Key::Right);
        frame(&mut app);
        assert!(row_text(&app, 5).ends_with("C family"));
    }

    #[test]
    fn cursor_position_in_status() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "ab\ncd");
        app.on_key(Key::Down);
        app.on_key(Key::Right);
        frame(&mut app);
        assert!(row_text(&app, 5).starts_with(" 2:2  main.js"));
    }

    #[test]
    fn bell_is_written_on_no_op() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "a");
        frame(&mut app);
        app.on_key(Key::Up);
        assert!(frame(&mut app).contains(&0x07));
        assert!(!frame(&mut app).contains(&0x07));
    }

    // ── Saving ────────────────────────────────────────────────────────────

    #[test]
    fn save_writes_file_and_reports_rows() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "");
        type_str(&mut app, "hi");
        app.on_key(Key::Enter);
        type_str(&mut app, "there");
        assert!(app.is_modified());
        frame(&mut app);
        assert!(row_text(&app, 5).contains("main.js +"));

        assert_eq!(app.on_key(Key::Ctrl('s')), Action::Continue);
        assert_eq!(app.message(), Some("Saved 2 rows"));
        assert!(!app.is_modified());
        assert_eq!(fs::read_to_string(dir.path().join("main.js")).unwrap(), "hi\nthere");
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let editor = Editor::new(
            Document::from_text("x"),
            language::plain_text(),
            shared(MemoryClipboard::new()),
        );
        let path = dir.path().join("missing").join("x.txt");
        let mut app = QuillApp::new(editor, path, &Options::default());
        app.on_resize(Size { cols: 40, rows: 8 });
        app.on_key(Key::Ctrl('s'));
        assert!(app.message().is_some_and(|m| m.starts_with("Save failed")));
    }

    // ── Exiting ───────────────────────────────────────────────────────────

    #[test]
    fn unmodified_close_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        assert_eq!(app.on_key(Key::Ctrl('q')), Action::Quit);
    }

    #[test]
    fn modified_close_asks_first() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        type_str(&mut app, "x");
        assert_eq!(app.on_key(Key::Ctrl('q')), Action::Continue);
        frame(&mut app);
        assert!(row_text(&app, 5).ends_with(EXIT_QUESTION));

        // Other keys don't edit while the question is up.
        assert_eq!(app.on_key(Key::Char('z')), Action::Continue);
        assert_eq!(app.editor().text(), "xabc");

        assert_eq!(app.on_key(Key::Escape), Action::Continue);
        frame(&mut app);
        assert!(!row_text(&app, 5).ends_with(EXIT_QUESTION));
        assert_eq!(fs::read_to_string(dir.path().join("main.js")).unwrap(), "abc");
    }

    #[test]
    fn exit_question_is_whole_on_a_narrow_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = app_for(&dir, "a-rather-long-file-name.js", "abc", &Options::default());
        app.on_resize(Size { cols: 34, rows: 8 });
        type_str(&mut app, "x");
        app.on_key(Key::Ctrl('q'));
        frame(&mut app);

        // The file name gives way; the question ends one column short of the edge.
        assert_eq!(row_text(&app, 5), format!(" 1:2   {EXIT_QUESTION}"));
    }

    #[test]
    fn answer_yes_saves_and_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        type_str(&mut app, "x");
        app.on_key(Key::Ctrl('q'));
        assert_eq!(app.on_key(Key::Enter), Action::Quit);
        assert_eq!(fs::read_to_string(dir.path().join("main.js")).unwrap(), "xabc");
    }

    #[test]
    fn answer_no_quits_without_saving() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        type_str(&mut app, "x");
        app.on_key(Key::Ctrl('q'));
        assert_eq!(app.on_key(Key::Char('n')), Action::Quit);
        assert_eq!(fs::read_to_string(dir.path().join("main.js")).unwrap(), "abc");
    }

    #[test]
    fn undoing_back_to_saved_is_unmodified() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir, "abc");
        type_str(&mut app, "xy");
        app.on_key(Key::Ctrl('z'));
        assert!(!app.is_modified());
        assert_eq!(app.on_key(Key::Ctrl('q')), Action::Quit);
    }
}
