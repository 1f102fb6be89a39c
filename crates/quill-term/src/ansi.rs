// SPDX-License-Identifier: MIT
//
// ANSI/ECMA-48 control sequences.
//
// Every sequence quill sends to the terminal is encoded here and nowhere
// else. The functions write to any `impl Write` and keep no state; deciding
// when a sequence is needed belongs to the `FrameWriter` and `ScreenBuffer`.
//
// Coordinates are 0-based, as everywhere else in the crate; the 1-based
// terminal numbering only exists inside this file. A scroll region is a
// half-open row range `top..bottom`.
//
// Styles go out as one complete SGR sequence that starts with a reset
// (`CSI 0;…m`). That costs a few bytes per style change but means a cell's
// rendition never depends on what was drawn before it.

use std::io::{self, Write};

use crate::cell::{Attr, Style};
use crate::color::CellColor;

/// Control Sequence Introducer.
const CSI: &str = "\x1b[";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: put the cursor at column `x`, row `y`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "{CSI}{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// ED 2: blank the whole screen in the current rendition.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}2J")
}

/// SGR 0: back to the terminal's default rendition.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}0m")
}

#[inline]
pub fn bell(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x07")
}

// ─── Scrolling ───────────────────────────────────────────────────────────────

/// DECSTBM: confine scrolling to rows `top..bottom`. The terminal homes the
/// cursor afterwards.
#[inline]
pub fn set_scroll_region(w: &mut impl Write, top: u16, bottom: u16) -> io::Result<()> {
    debug_assert!(top < bottom, "empty scroll region {top}..{bottom}");
    write!(w, "{CSI}{};{bottom}r", u32::from(top) + 1)
}

/// DECSTBM without parameters: the whole screen scrolls again.
#[inline]
pub fn reset_scroll_region(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}r")
}

/// SU: move the region's rows up by `n`; blank rows enter at the bottom.
#[inline]
pub fn scroll_up(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "{CSI}{n}S")
}

/// SD: move the region's rows down by `n`; blank rows enter at the top.
#[inline]
pub fn scroll_down(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "{CSI}{n}T")
}

/// SL: move the region's columns left by `n`; blank columns enter at the
/// right edge.
#[inline]
pub fn scroll_left(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "{CSI}{n} @")
}

/// SR: move the region's columns right by `n`; blank columns enter at the
/// left edge.
#[inline]
pub fn scroll_right(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "{CSI}{n} A")
}

// ─── Rendition (SGR) ─────────────────────────────────────────────────────────

const ATTR_CODES: [(Attr, u8); 6] = [
    (Attr::BOLD, 1),
    (Attr::DIM, 2),
    (Attr::ITALIC, 3),
    (Attr::UNDERLINE, 4),
    (Attr::INVERSE, 7),
    (Attr::STRIKETHROUGH, 9),
];

/// SGR parameters selecting `color`. `base` is 30 for the foreground and
/// 40 for the background. The default color needs no parameter after a
/// reset, so it writes nothing.
fn color_params(w: &mut impl Write, color: CellColor, base: u8) -> io::Result<()> {
    match color {
        CellColor::Default => Ok(()),
        CellColor::Ansi256(idx @ 0..8) => write!(w, ";{}", base + idx),
        CellColor::Ansi256(idx @ 8..16) => write!(w, ";{}", base + 60 + idx - 8),
        CellColor::Ansi256(idx) => write!(w, ";{};5;{idx}", base + 8),
        CellColor::Rgb(r, g, b) => write!(w, ";{};2;{r};{g};{b}", base + 8),
    }
}

/// Switch to `style` with a single SGR sequence: reset, attributes,
/// foreground, background.
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    write!(w, "{CSI}0")?;
    for (attr, code) in ATTR_CODES {
        if style.attrs.contains(attr) {
            write!(w, ";{code}")?;
        }
    }
    color_params(w, style.fg, 30)?;
    color_params(w, style.bg, 40)?;
    w.write_all(b"m")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Mode 2026: hold output until [`end_sync`] so a frame appears at once.
/// Terminals without the mode ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?2026l")
}

/// Mode 1049: switch to the alternate screen, saving the shell's.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?1049h")
}

/// Leave the alternate screen; the shell's screen comes back.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    write!(w, "{CSI}?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
