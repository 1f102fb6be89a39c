// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw stdin bytes into normalized keys: printable characters, control
// letters, and a small set of named keys (arrows with their shift/control
// variants, editing and paging keys). The editor core only ever sees `Key`
// values, never escape sequences.
//
// Handles:
//
// - C0 control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - Legacy CSI sequences with xterm modifier parameters (`CSI 1;5A`)
// - `~`-terminated editing keys (`CSI 3~`, `CSI 5;2~`)
// - SS3 cursor keys from terminals in application mode
// - UTF-8 multi-byte characters
//
// # Design
//
// The decoder keeps a small byte buffer because escape sequences can span
// multiple `read()` calls. Feed bytes with [`Decoder::advance`]; after a
// timeout with no new bytes, call [`Decoder::flush`] to resolve a lone ESC
// as the Escape key. Sequences we don't know are dropped whole.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A normalized key identifier.
///
/// Every key has a canonical name (see [`Key::name`]) so handler tables and
/// configuration can refer to keys as text:
///
/// ```
/// use quill_term::input::Key;
///
/// assert_eq!(Key::Ctrl('s').to_string(), "control-s");
/// assert_eq!("shift-left".parse::<Key>(), Ok(Key::ShiftLeft));
/// assert_eq!("x".parse::<Key>(), Ok(Key::Char('x')));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Control plus a lowercase ASCII letter.
    Ctrl(char),
    Up,
    Down,
    Left,
    Right,
    ShiftUp,
    ShiftDown,
    ShiftLeft,
    ShiftRight,
    CtrlUp,
    CtrlDown,
    CtrlLeft,
    CtrlRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
}

const NAMED: &[(Key, &str)] = &[
    (Key::Up, "up"),
    (Key::Down, "down"),
    (Key::Left, "left"),
    (Key::Right, "right"),
    (Key::ShiftUp, "shift-up"),
    (Key::ShiftDown, "shift-down"),
    (Key::ShiftLeft, "shift-left"),
    (Key::ShiftRight, "shift-right"),
    (Key::CtrlUp, "control-up"),
    (Key::CtrlDown, "control-down"),
    (Key::CtrlLeft, "control-left"),
    (Key::CtrlRight, "control-right"),
    (Key::Home, "home"),
    (Key::End, "end"),
    (Key::PageUp, "page-up"),
    (Key::PageDown, "page-down"),
    (Key::Enter, "enter"),
    (Key::Tab, "tab"),
    (Key::Backspace, "backspace"),
    (Key::Delete, "delete"),
    (Key::Escape, "escape"),
];

impl Key {
    /// The canonical name: the character itself for [`Key::Char`],
    /// `control-<letter>` for [`Key::Ctrl`], a fixed name otherwise.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Char(ch) => ch.to_string(),
            Self::Ctrl(ch) => format!("control-{ch}"),
            named => NAMED
                .iter()
                .find(|(key, _)| *key == named)
                .map_or_else(String::new, |(_, name)| (*name).to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A key name that isn't recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key name '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((key, _)) = NAMED.iter().find(|(_, name)| *name == s) {
            return Ok(*key);
        }
        if let Some(letter) = s.strip_prefix("control-") {
            let mut chars = letter.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                if ch.is_ascii_lowercase() {
                    return Ok(Self::Ctrl(ch));
                }
            }
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_control() => Ok(Self::Char(ch)),
            _ => Err(UnknownKey(s.to_string())),
        }
    }
}

bitflags! {
    /// Modifier bits from xterm CSI parameters (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Byte-to-key decoder.
///
/// A bare `ESC` byte could be either the Escape key or the start of a
/// sequence. The decoder holds it until more bytes arrive or the caller
/// calls [`flush`](Decoder::flush) after a short timeout.
pub struct Decoder {
    buf: Vec<u8>,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every key that can be decoded.
    ///
    /// Incomplete sequences stay buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match decode(&self.buf[pos..]) {
                Decoded::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Decoded::Incomplete => break,
                Decoded::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Are there buffered bytes waiting for the rest of a sequence?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve buffered bytes after a timeout: a lone ESC becomes
    /// [`Key::Escape`], a partial sequence is dropped.
    pub fn flush(&mut self) -> Vec<Key> {
        let keys = if self.buf.first() == Some(&0x1B) {
            vec![Key::Escape]
        } else {
            Vec::new()
        };
        self.buf.clear();
        keys
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Decoding ─────────────────────────────────────────────────────

enum Decoded {
    /// A key, consuming `usize` bytes.
    Key(Key, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

fn decode(buf: &[u8]) -> Decoded {
    match buf[0] {
        0x1B => decode_escape(buf),
        0x08 | 0x7F => Decoded::Key(Key::Backspace, 1),
        0x09 => Decoded::Key(Key::Tab, 1),
        0x0A | 0x0D => Decoded::Key(Key::Enter, 1),
        b @ 0x01..=0x1A => Decoded::Key(Key::Ctrl(char::from(b + b'a' - 1)), 1),
        b @ 0x20..=0x7E => Decoded::Key(Key::Char(char::from(b)), 1),
        0xC0..=0xFF => decode_utf8(buf),
        _ => Decoded::Skip(1),
    }
}

fn decode_escape(buf: &[u8]) -> Decoded {
    match buf.get(1) {
        None => Decoded::Incomplete,
        Some(b'[') => decode_csi(buf),
        Some(b'O') => decode_ss3(buf),
        // Anything else after ESC: the Escape key, then decode the rest
        // normally.
        Some(_) => Decoded::Key(Key::Escape, 1),
    }
}

fn decode_csi(buf: &[u8]) -> Decoded {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, final
    // byte 0x40..=0x7E.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Decoded::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Decoded::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let key = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => Some(Key::Home),
            3 => Some(Key::Delete),
            4 | 8 => Some(Key::End),
            5 => Some(Key::PageUp),
            6 => Some(Key::PageDown),
            _ => None,
        }
    } else {
        match final_byte {
            b'A' => Some(arrow(Key::Up, modifiers)),
            b'B' => Some(arrow(Key::Down, modifiers)),
            b'C' => Some(arrow(Key::Right, modifiers)),
            b'D' => Some(arrow(Key::Left, modifiers)),
            b'H' => Some(Key::Home),
            b'F' => Some(Key::End),
            _ => None,
        }
    };

    key.map_or(Decoded::Skip(consumed), |key| Decoded::Key(key, consumed))
}

fn decode_ss3(buf: &[u8]) -> Decoded {
    let Some(&b) = buf.get(2) else {
        return Decoded::Incomplete;
    };
    let key = match b {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => return Decoded::Skip(3),
    };
    Decoded::Key(key, 3)
}

fn decode_utf8(buf: &[u8]) -> Decoded {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Decoded::Skip(1);
    }
    if buf.len() < expected {
        return Decoded::Incomplete;
    }
    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Decoded::Skip(1), |ch| Decoded::Key(Key::Char(ch), expected))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Apply shift/control to an arrow key. Other modifiers are ignored.
const fn arrow(base: Key, modifiers: Modifiers) -> Key {
    let shift = modifiers.contains(Modifiers::SHIFT);
    let ctrl = modifiers.contains(Modifiers::CTRL);
    match (base, shift, ctrl) {
        (Key::Up, _, true) => Key::CtrlUp,
        (Key::Down, _, true) => Key::CtrlDown,
        (Key::Left, _, true) => Key::CtrlLeft,
        (Key::Right, _, true) => Key::CtrlRight,
        (Key::Up, true, false) => Key::ShiftUp,
        (Key::Down, true, false) => Key::ShiftDown,
        (Key::Left, true, false) => Key::ShiftLeft,
        (Key::Right, true, false) => Key::ShiftRight,
        (key, _, _) => key,
    }
}

/// Semicolon-separated numeric parameters. Colon sub-parameters and
/// private markers are ignored.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// The encoding is `1 + bitmask`; 0 or 1 means no modifiers.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
