//! # quill-editor — the editing engine behind quill
//!
//! Everything between a key press and the cells it changes on screen:
//!
//! - **[`document`]** — rows of characters, with `'\r'` standing in for a
//!   row break wherever a flat sequence is needed
//! - **[`position`]** / **[`cursor`]** — (row, col) positions, spans, and
//!   the cursor with its selection anchor
//! - **[`language`]** — per-language lexical state machines
//! - **[`lexer`]** — keeps the lexical state at the cursor, with a snapshot
//!   per row so moving back is a replay, not a rescan
//! - **[`history`]** — undo records and the undo/redo stacks
//! - **[`keymap`]** — keys to commands
//! - **[`editor`]** — the composition root: primitives, key dispatch,
//!   commands, prompts, painting
//!
//! The engine is single-threaded and never touches the terminal or the
//! filesystem itself: it paints into a `quill_term` [`ScreenBuffer`], and
//! the clipboard comes in through the [`ClipboardStore`] trait.
//!
//! [`ScreenBuffer`]: quill_term::screen::ScreenBuffer

mod actions;
pub mod clipboard;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod keymap;
pub mod language;
pub mod lexer;
pub mod options;
pub mod position;
pub mod prompt;
pub mod search;
pub mod theme;
pub mod view;

pub use clipboard::{ClipboardStore, MemoryClipboard, SharedClipboard};
pub use document::{Document, LineEnding};
pub use editor::{Editor, KeyOutcome};
pub use error::{ClipboardError, EditorError, OptionError, SearchError};
pub use options::Options;
pub use position::{Position, Span};
