// SPDX-License-Identifier: MIT
//
// FrameWriter — the bytes of one frame, and what the terminal will look
// like once it has processed them.
//
// A frame is built in memory and sent with a single write. While cells are
// appended the writer remembers where the terminal cursor will be and which
// rendition is active, so a run of same-styled cells on one row costs one
// cursor move, one SGR and the characters themselves.
//
// Whatever writes through the `Write` impl (a clear, a scroll, a region
// change) must call `forget` afterwards; the writer can't know what those
// sequences did to the cursor or the rendition.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Cell, Style};

const INITIAL_CAPACITY: usize = 16 * 1024;

/// Frame output buffer with cursor and rendition tracking.
#[derive(Debug)]
pub struct FrameWriter {
    bytes: Vec<u8>,
    /// Where the terminal cursor is after the bytes so far, if known.
    cursor: Option<(u16, u16)>,
    /// The active rendition, if known.
    pen: Option<Style>,
}

impl FrameWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(INITIAL_CAPACITY),
            cursor: None,
            pen: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Start a new frame: drop the bytes (keeping the allocation) and the
    /// tracked state.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.forget();
    }

    /// Stop assuming anything about the cursor or the rendition.
    pub const fn forget(&mut self) {
        self.cursor = None;
        self.pen = None;
    }

    /// Append `cell` at `(x, y)`, moving the cursor and switching the
    /// rendition only when needed.
    pub fn cell(&mut self, x: u16, y: u16, cell: Cell) {
        if self.cursor != Some((x, y)) {
            // Writes to a Vec can't fail.
            let _ = ansi::cursor_to(&mut self.bytes, x, y);
        }
        if self.pen != Some(cell.style) {
            let _ = ansi::style(&mut self.bytes, cell.style);
            self.pen = Some(cell.style);
        }
        let mut utf8 = [0u8; 4];
        self.bytes.extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());
        self.cursor = x.checked_add(1).map(|next| (next, y));
    }

    /// Send the frame to `w` and empty the buffer.
    ///
    /// # Errors
    ///
    /// Returns the writer's error; the bytes are kept for another attempt.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        w.write_all(&self.bytes)?;
        w.flush()?;
        self.bytes.clear();
        Ok(())
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for FrameWriter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
