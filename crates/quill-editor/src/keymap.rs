//! Keymap — the table from keys to commands.
//!
//! Each bound key maps to one [`Binding`]: a [`Command`] and the [`Guard`]
//! that must hold for it to run. A key with no binding, or whose guard
//! fails, falls through to the content commands, tried in order. That is
//! how `[` shifts the selection in selection mode and types a bracket
//! everywhere else.
//!
//! # Standard bindings
//!
//! | Key                                           | Command                |
//! |-----------------------------------------------|------------------------|
//! | `up` `down` `left` `right` `home` `end`       | movement               |
//! | `control-left` `control-right`                | word movement          |
//! | `page-up` `control-up` `control-o`            | page up                |
//! | `page-down` `control-down` `control-p`        | page down              |
//! | `shift-<arrow>`                               | extend selection       |
//! | `escape`                                      | toggle selection mode  |
//! | `enter` `backspace` `tab`                     | editing                |
//! | `control-c` / `control-x` (selection)         | copy / cut             |
//! | `control-v`                                   | paste                  |
//! | `[` / `]` (selection mode)                    | shift rows left/right  |
//! | `c` (selection mode)                          | toggle comments        |
//! | `control-z` / `control-y`                     | undo / redo            |
//! | `control-f` / `control-g`                     | find / find again      |
//! | `control-b`                                   | bracket jump           |
//! | `control-l`                                   | cycle language         |
//! | `control-s` / `control-q`                     | save / close           |
//! | `control-d`                                   | debug dump             |

use std::collections::HashMap;

use quill_term::input::Key;

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    WordLeft,
    WordRight,
    PageUp,
    PageDown,

    SelectUp,
    SelectDown,
    SelectLeft,
    SelectRight,
    ToggleSelectMode,

    Return,
    Backspace,
    Tab,

    Copy,
    Cut,
    Paste,

    ShiftLeft,
    ShiftRight,
    ToggleComment,

    Undo,
    Redo,

    Find,
    FindAgain,
    BracketJump,
    CycleLanguage,
    Save,
    Close,
    DebugDump,
}

impl Command {
    /// Commands that move the cursor vertically keep the sticky column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(
            self,
            Self::Up | Self::Down | Self::PageUp | Self::PageDown | Self::SelectUp | Self::SelectDown
        )
    }
}

/// Commands for keys that insert a character, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCommand {
    /// A closer typed on a blank row dedents the row first.
    ClosedBlock,
    Type,
}

/// When a binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Guard {
    #[default]
    Always,
    /// Only with a non-empty selection.
    Selection,
    /// Only in selection mode (toggled with `escape`).
    SelectMode,
}

/// A command and its guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub command: Command,
    pub guard: Guard,
}

/// Key bindings plus the content commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<Key, Binding>,
    content: Vec<ContentCommand>,
}

impl Keymap {
    /// No bindings, typing only.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
            content: vec![ContentCommand::ClosedBlock, ContentCommand::Type],
        }
    }

    /// The bindings of a document editor.
    #[must_use]
    pub fn standard() -> Self {
        use Command as C;

        let mut map = Self::empty();
        for (key, command) in [
            (Key::Up, C::Up),
            (Key::Down, C::Down),
            (Key::Left, C::Left),
            (Key::Right, C::Right),
            (Key::Home, C::Home),
            (Key::End, C::End),
            (Key::CtrlLeft, C::WordLeft),
            (Key::CtrlRight, C::WordRight),
            (Key::PageUp, C::PageUp),
            (Key::CtrlUp, C::PageUp),
            (Key::Ctrl('o'), C::PageUp),
            (Key::PageDown, C::PageDown),
            (Key::CtrlDown, C::PageDown),
            (Key::Ctrl('p'), C::PageDown),
            (Key::ShiftUp, C::SelectUp),
            (Key::ShiftDown, C::SelectDown),
            (Key::ShiftLeft, C::SelectLeft),
            (Key::ShiftRight, C::SelectRight),
            (Key::Escape, C::ToggleSelectMode),
            (Key::Enter, C::Return),
            (Key::Backspace, C::Backspace),
            (Key::Tab, C::Tab),
            (Key::Ctrl('v'), C::Paste),
            (Key::Ctrl('z'), C::Undo),
            (Key::Ctrl('y'), C::Redo),
            (Key::Ctrl('f'), C::Find),
            (Key::Ctrl('g'), C::FindAgain),
            (Key::Ctrl('b'), C::BracketJump),
            (Key::Ctrl('l'), C::CycleLanguage),
            (Key::Ctrl('s'), C::Save),
            (Key::Ctrl('q'), C::Close),
            (Key::Ctrl('d'), C::DebugDump),
        ] {
            map.bind(key, command, Guard::Always);
        }

        map.bind(Key::Ctrl('c'), C::Copy, Guard::Selection);
        map.bind(Key::Ctrl('x'), C::Cut, Guard::Selection);
        map.bind(Key::Char('['), C::ShiftLeft, Guard::SelectMode);
        map.bind(Key::Char(']'), C::ShiftRight, Guard::SelectMode);
        map.bind(Key::Char('c'), C::ToggleComment, Guard::SelectMode);
        map
    }

    /// The bindings of a one-line prompt field: editing and movement, no
    /// document-level commands.
    #[must_use]
    pub fn field() -> Self {
        let mut map = Self::standard();
        for key in [
            Key::Ctrl('s'),
            Key::Ctrl('q'),
            Key::Ctrl('f'),
            Key::Ctrl('g'),
            Key::Ctrl('l'),
            Key::Ctrl('d'),
            Key::Enter,
        ] {
            map.unbind(key);
        }
        map
    }

    pub fn bind(&mut self, key: Key, command: Command, guard: Guard) {
        self.bindings.insert(key, Binding { command, guard });
    }

    pub fn unbind(&mut self, key: Key) -> Option<Binding> {
        self.bindings.remove(&key)
    }

    #[must_use]
    pub fn lookup(&self, key: Key) -> Option<Binding> {
        self.bindings.get(&key).copied()
    }

    /// Content commands in the order they're tried.
    #[must_use]
    pub fn content(&self) -> &[ContentCommand] {
        &self.content
    }

    /// Every binding, sorted by key name.
    #[must_use]
    pub fn bindings(&self) -> Vec<(Key, Binding)> {
        let mut all: Vec<_> = self.bindings.iter().map(|(&k, &b)| (k, b)).collect();
        all.sort_by_key(|(key, _)| key.name());
        all
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
