// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — keys in, frames out, one thread.
//
// Each turn of the loop waits in poll(2) for stdin, decodes the bytes that
// arrived, feeds every key to the application and then renders once. A
// paste of a hundred characters is a hundred `on_key` calls and one frame.
// Nothing happens while the user is idle: the loop only wakes for input,
// for a resize, or when an escape sequence is left half-read.
//
// Resizes arrive as SIGWINCH. The handler just raises a flag; poll(2) is
// interrupted by the signal (the handler is installed without SA_RESTART),
// and the loop re-reads the terminal size before the next frame.
//
// An ESC byte on its own could be the Escape key or the first byte of an
// arrow key's sequence. The decoder keeps it pending and the loop polls
// again with a short timeout; if nothing follows, the pending bytes are
// flushed as keys.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::{Decoder, Key};
use crate::terminal::{Size, Terminal};

// ─── Resize signal ───────────────────────────────────────────────────────────

/// Raised by the SIGWINCH handler, lowered by the loop.
static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigwinch(_signal: libc::c_int) {
    // Only an atomic store: anything more isn't async-signal-safe.
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn watch_resizes() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigwinch as *const () as usize;
        libc::sigemptyset(&raw mut action.sa_mask);
        // No SA_RESTART: the signal must cut the poll short.
        action.sa_flags = 0;
        libc::sigaction(libc::SIGWINCH, &raw const action, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
fn watch_resizes() {}

// ─── Application side ────────────────────────────────────────────────────────

/// Whether the loop keeps going after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// What the event loop drives.
///
/// Before the first frame the loop reports the terminal size through
/// [`on_resize`](App::on_resize); after that, whenever it changes. Every
/// batch of keys is followed by exactly one [`render`](App::render).
pub trait App {
    /// One decoded key.
    fn on_key(&mut self, key: Key) -> Action;

    fn on_resize(&mut self, size: Size);

    /// Write a frame to `out`.
    ///
    /// # Errors
    ///
    /// Returns the writer's error.
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

// ─── Timing ──────────────────────────────────────────────────────────────────

/// Poll timeouts, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// How long a lone ESC waits for the rest of a sequence.
    pub escape_timeout_ms: u16,

    /// Upper bound on a poll with nothing pending. Also bounds how late a
    /// resize is noticed where signals don't interrupt poll(2).
    pub idle_timeout_ms: u16,
}

impl LoopConfig {
    /// The timeout for the next poll.
    #[inline]
    #[must_use]
    pub const fn poll_timeout(&self, escape_pending: bool) -> u16 {
        if escape_pending { self.escape_timeout_ms } else { self.idle_timeout_ms }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout_ms: 25,
            idle_timeout_ms: 250,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// What a poll(2) on stdin came back with.
enum Poll {
    Readable,
    TimedOut,
    /// A signal (usually SIGWINCH) cut the wait short.
    Interrupted,
}

/// Owns the terminal and the key decoder for the duration of a session.
///
/// ```no_run
/// use std::io::{self, Write};
/// use quill_term::event_loop::{Action, App, EventLoop};
/// use quill_term::input::Key;
/// use quill_term::terminal::Size;
///
/// struct Counter(usize);
///
/// impl App for Counter {
///     fn on_key(&mut self, key: Key) -> Action {
///         self.0 += 1;
///         if key == Key::Ctrl('q') { Action::Quit } else { Action::Continue }
///     }
///     fn on_resize(&mut self, _size: Size) {}
///     fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
///         write!(out, "\x1b[H{} keys", self.0)
///     }
/// }
///
/// EventLoop::new()?.run(&mut Counter(0))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    decoder: Decoder,
    config: LoopConfig,
}

impl EventLoop {
    /// # Errors
    ///
    /// Fails if the terminal handle can't be created.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// # Errors
    ///
    /// Fails if the terminal handle can't be created.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            decoder: Decoder::new(),
            config,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and drive `app` until it quits or stdin
    /// reaches end of file. The terminal is given back even when the loop
    /// fails.
    ///
    /// # Errors
    ///
    /// Terminal setup, stdin and render errors end the loop and are
    /// returned after the terminal is restored.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        watch_resizes();
        tracing::debug!("event loop start, terminal {:?}", self.terminal.size());

        let outcome = self.turn_until_quit(app);
        let restored = self.terminal.leave();
        tracing::debug!("event loop end");
        outcome.and(restored)
    }

    fn turn_until_quit(&mut self, app: &mut impl App) -> io::Result<()> {
        app.on_resize(self.terminal.size());
        render_frame(app)?;

        let mut input = [0u8; 1024];
        loop {
            let pending = self.decoder.has_pending();
            let keys = match poll_stdin(self.config.poll_timeout(pending))? {
                Poll::Readable => match read_stdin(&mut input)? {
                    0 => {
                        tracing::debug!("stdin closed");
                        return Ok(());
                    }
                    n => self.decoder.advance(&input[..n]),
                },
                Poll::TimedOut if pending => self.decoder.flush(),
                Poll::TimedOut | Poll::Interrupted => Vec::new(),
            };

            let mut changed = !keys.is_empty();
            for key in keys {
                if app.on_key(key) == Action::Quit {
                    return Ok(());
                }
            }

            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!("terminal resized to {size:?}");
                app.on_resize(size);
                changed = true;
            }

            if changed {
                render_frame(app)?;
            }
        }
    }
}

fn render_frame(app: &mut impl App) -> io::Result<()> {
    let mut out = io::stdout().lock();
    app.render(&mut out)?;
    out.flush()
}

// ─── Stdin ───────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn poll_stdin(timeout_ms: u16) -> io::Result<Poll> {
    let mut fds = [libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    }];
    match unsafe { libc::poll(fds.as_mut_ptr(), 1, libc::c_int::from(timeout_ms)) } {
        0 => Ok(Poll::TimedOut),
        ready if ready > 0 => Ok(Poll::Readable),
        _ => match io::Error::last_os_error() {
            err if err.kind() == io::ErrorKind::Interrupted => Ok(Poll::Interrupted),
            err => Err(err),
        },
    }
}

/// Read whatever is available, retrying reads cut short by a signal.
#[cfg(unix)]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    loop {
        let read = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if let Ok(n) = usize::try_from(read) {
            return Ok(n);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn poll_stdin(_timeout_ms: u16) -> io::Result<Poll> {
    Ok(Poll::Readable)
}

#[cfg(not(unix))]
fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    use std::io::Read;
    io::stdin().read(buf)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Timing ──────────────────────────────────────────────────────────

    #[test]
    fn pending_escape_polls_briefly() {
        let config = LoopConfig::default();
        assert_eq!(config.poll_timeout(true), 25);
        assert_eq!(config.poll_timeout(false), 250);
    }

    #[test]
    fn custom_timeouts() {
        let config = LoopConfig {
            escape_timeout_ms: 5,
            idle_timeout_ms: 1000,
        };
        assert_eq!(config.poll_timeout(true), 5);
        assert_eq!(config.poll_timeout(false), 1000);
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_loop_knows_a_size_without_entering() {
        let event_loop = EventLoop::new().unwrap();
        let Size { cols, rows } = event_loop.size();
        assert!(cols > 0 && rows > 0);
    }

    // ── Resize flag ─────────────────────────────────────────────────────

    #[test]
    fn resize_flag_is_consumed_once() {
        RESIZED.store(true, Ordering::Relaxed);
        assert!(RESIZED.swap(false, Ordering::Relaxed));
        assert!(!RESIZED.swap(false, Ordering::Relaxed));
    }

    // ── App contract ────────────────────────────────────────────────────

    /// Records calls the way the loop makes them.
    #[derive(Default)]
    struct Log {
        events: Vec<String>,
    }

    impl App for Log {
        fn on_key(&mut self, key: Key) -> Action {
            self.events.push(key.to_string());
            if key == Key::Ctrl('q') { Action::Quit } else { Action::Continue }
        }

        fn on_resize(&mut self, size: Size) {
            self.events.push(format!("{}x{}", size.cols, size.rows));
        }

        fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
            self.events.push("frame".into());
            write!(out, "{}", self.events.len())
        }
    }

    #[test]
    fn render_writes_into_any_writer() {
        let mut app = Log::default();
        app.on_resize(Size { cols: 10, rows: 4 });
        assert_eq!(app.on_key(Key::Char('a')), Action::Continue);
        assert_eq!(app.on_key(Key::Ctrl('q')), Action::Quit);

        let mut out = Vec::new();
        app.render(&mut out).unwrap();
        assert_eq!(out, b"4");
        assert_eq!(app.events, ["10x4", "a", "control-q", "frame"]);
    }
}
