// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal — raw mode, the alternate screen, and getting both undone.
//
// Two pieces of state have to be put back when the editor exits: the
// termios settings of stdin and the screen the shell was showing. `RawMode`
// owns the first and restores it on drop. `Terminal` owns the second and
// the raw mode guard, and leaves the alternate screen before dropping it.
//
// A panic skips neither: the panic hook writes the restore sequence
// straight to fd 1 (a panic mid-flush may hold the stdout lock) and resets
// termios from a process-wide copy, then hands over to the previous hook
// so the message lands on a usable terminal.
//
// The unsafe calls are tcgetattr, cfmakeraw, tcsetattr, isatty, ioctl and
// write(2); each block wraps a single call.

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Used when stdout isn't a terminal or doesn't report a size.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Ask the kernel for the size of the terminal on stdout. A terminal
/// reporting zero rows or columns counts as unknown.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
        return None;
    }
    (ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdin_is_tty() -> bool {
    false
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Termios as it was before raw mode, for the panic hook.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn set_termios(termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Stdin in raw mode: no echo, no line buffering, no signals from keys,
/// no output post-processing. Restored on drop.
#[cfg(unix)]
struct RawMode {
    original: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch stdin to raw mode. `None` if stdin isn't a terminal.
    fn enable() -> io::Result<Option<Self>> {
        if !stdin_is_tty() {
            return Ok(None);
        }

        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original;
        unsafe { libc::cfmakeraw(&raw mut raw) };
        // Reads block for at least one byte; the event loop polls first.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        set_termios(&raw)?;

        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(original);
        }
        tracing::debug!("raw mode on");
        Ok(Some(Self { original }))
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = set_termios(&self.original) {
            tracing::warn!("restoring termios failed: {err}");
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
        tracing::debug!("raw mode off");
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    #[allow(clippy::unnecessary_wraps)]
    fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

static PANIC_HOOK: Once = Once::new();

/// Everything [`Terminal::leave`] writes, as one byte string: end any
/// synchronized update, drop the scroll region and SGR state, show the
/// cursor, and finally switch back to the shell's screen.
fn restore_sequence() -> Vec<u8> {
    let mut seq = Vec::new();
    // Writes to a Vec can't fail.
    let _ = ansi::end_sync(&mut seq)
        .and_then(|()| ansi::reset_scroll_region(&mut seq))
        .and_then(|()| ansi::reset(&mut seq))
        .and_then(|()| ansi::cursor_show(&mut seq))
        .and_then(|()| ansi::exit_alt_screen(&mut seq));
    seq
}

fn write_to_stdout_fd(bytes: &[u8]) {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            bytes.as_ptr().cast::<libc::c_void>(),
            bytes.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(bytes);
        let _ = stdout.flush();
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let restore = restore_sequence();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_to_stdout_fd(&restore);
            #[cfg(unix)]
            if let Ok(saved) = SAVED_TERMIOS.lock() {
                if let Some(original) = saved.as_ref() {
                    let _ = set_termios(original);
                }
            }
            previous(info);
        }));
    });
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The controlling terminal.
///
/// [`enter`](Self::enter) puts it in raw mode on the alternate screen;
/// [`leave`](Self::leave), dropping the handle, or a panic puts it back.
///
/// # Example
///
/// ```no_run
/// use quill_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // ... draw frames, read keys ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    raw: Option<RawMode>,
    on_alt_screen: bool,
}

impl Terminal {
    /// A handle for the terminal on stdin/stdout, sized from the kernel or
    /// [`Size::FALLBACK`]. Nothing is changed until [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// Infallible on Unix; kept fallible for platforms whose console needs
    /// setting up.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            size: query_size().unwrap_or(Size::FALLBACK),
            raw: None,
            on_alt_screen: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Query the size again, keeping the last known one if the query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = query_size() {
            self.size = size;
        }
        self.size
    }

    /// Whether the terminal is on the alternate screen.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.on_alt_screen
    }

    /// Raw mode, alternate screen, cursor hidden, screen cleared. Does
    /// nothing if already active.
    ///
    /// # Errors
    ///
    /// Fails if termios can't be changed or stdout can't be written; raw
    /// mode is undone in that case.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.on_alt_screen {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;

        let mut out = io::stdout().lock();
        let switched = ansi::enter_alt_screen(&mut out)
            .and_then(|()| ansi::cursor_hide(&mut out))
            .and_then(|()| ansi::clear_screen(&mut out))
            .and_then(|()| out.flush());
        if let Err(err) = switched {
            self.raw = None;
            return Err(err);
        }

        self.on_alt_screen = true;
        Ok(())
    }

    /// Back to the shell's screen and cooked mode. Does nothing if not
    /// active.
    ///
    /// # Errors
    ///
    /// Fails if stdout can't be written. Termios is restored regardless.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.on_alt_screen {
            return Ok(());
        }
        self.on_alt_screen = false;

        let mut out = io::stdout().lock();
        let written = out.write_all(&restore_sequence()).and_then(|()| out.flush());
        drop(out);
        drop(self.raw.take());
        written
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn restore_text() -> String {
        String::from_utf8(restore_sequence()).unwrap()
    }

    // ── Restore sequence ──────────────────────────────────────────────

    #[test]
    fn restore_leaves_alt_screen_last() {
        assert!(restore_text().ends_with("\x1b[?1049l"));
    }

    #[test]
    fn restore_undoes_everything_a_frame_can_leave_behind() {
        let seq = restore_text();
        for (needle, what) in [
            ("\x1b[?2026l", "synchronized update"),
            ("\x1b[r", "scroll region"),
            ("\x1b[0m", "SGR state"),
            ("\x1b[?25h", "hidden cursor"),
        ] {
            assert!(seq.contains(needle), "{what} not reset: {seq:?}");
        }
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[test]
    fn queries_do_not_panic_without_a_terminal() {
        let _ = query_size();
        let _ = stdin_is_tty();
    }

    // ── Terminal ──────────────────────────────────────────────────────

    #[test]
    fn new_terminal_is_inactive_and_sized() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
        assert!(term.size().cols > 0 && term.size().rows > 0);
    }

    #[test]
    fn refresh_keeps_a_usable_size() {
        let mut term = Terminal::new().unwrap();
        let size = term.refresh_size();
        assert_eq!(size, term.size());
        assert!(size.cols > 0 && size.rows > 0);
    }

    #[test]
    fn enter_and_leave_are_idempotent() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }
}
