// SPDX-License-Identifier: MIT
//
// quill-term — Terminal layer for the quill editor.
//
// Everything between the editor core and the terminal device lives here:
// raw mode and the alternate screen, key decoding, and a double-buffered
// screen that diffs frames cell by cell and turns one-row viewport moves
// into hardware scrolls.
//
// The crate drives the terminal with plain ANSI escape sequences and raw
// termios instead of a TUI framework. The editor core paints into a
// `ScreenBuffer` and never sees an escape sequence.

pub mod ansi;
pub mod cell;
pub mod color;
pub mod event_loop;
pub mod grid;
pub mod input;
pub mod output;
pub mod screen;
pub mod terminal;
