// SPDX-License-Identifier: MIT
//
// File logging through `tracing`.
//
// The terminal belongs to the editor, so nothing may be printed while it
// runs. Events go to `<state-dir>/quill/quill.log` instead, one line each:
//
//   2026-10-19T09:41:07.123456Z  WARN quill_editor::editor: control-c: clipboard is locked
//
// A log file that can't be opened leaves no subscriber installed and every
// event is dropped; losing the log never stops the editor.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// An appender that writes every event to `path`, appending to what is
/// already there. Missing parent directories are created.
///
/// # Errors
///
/// Fails if the file can't be opened for appending.
pub fn open_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "quill.log".into(), |name| name.to_string_lossy().into_owned());
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}

/// Plain-text lines at or above `level`, written through `writer`.
pub fn subscriber<W>(writer: W, level: LevelFilter) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(level)
        .finish()
}

/// Install the file subscriber for `path` as the global default. Records
/// from crates still on the `log` facade are forwarded to it.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), TryInitError> {
    // Nowhere to report a file that won't open.
    let Ok(appender) = open_appender(path) else {
        return Ok(());
    };
    subscriber(appender, level).try_init()?;
    tracing::info!("logging to {} at {level}", path.display());
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
