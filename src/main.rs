// SPDX-License-Identifier: MIT
//
// quill — a small terminal text editor.
//
// This binary wires the crates together:
//
//   quill-term   → raw mode, key decoding, event loop, diffing screen buffer
//   quill-editor → document, incremental lexer, undo history, prompts
//
// and adds what only a process has: command-line arguments, the config
// file, the log file, the file being edited and a clipboard shared with
// other quill processes.
//
// Startup order matters. Options are needed to pick the log level, so the
// config file is read before the logger exists and its warnings are held
// back until the logger is up.

mod app;
mod clipboard;
mod config;
mod file;
mod logger;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;

use quill_editor::clipboard::shared;
use quill_editor::{Editor, Options, language};
use quill_term::event_loop::EventLoop;

use crate::app::QuillApp;
use crate::clipboard::FileClipboard;

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "A small terminal text editor")]
#[command(version)]
struct Cli {
    /// File to edit (created on first save if it doesn't exist)
    file: PathBuf,

    /// Option directives applied after the config file, e.g. "ts=4 nohints"
    #[arg(long = "set", value_name = "DIRECTIVES")]
    set: Vec<String>,

    /// Log level for the log file (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<LevelFilter>,
}

/// Resolve options from the config file and the command line. Returns the
/// config file's warnings for logging later.
fn resolve_options(cli: &Cli) -> Result<(Options, Vec<String>)> {
    let mut options = Options::default();
    let mut warnings = Vec::new();

    if let Some(path) = config::config_path() {
        match config::load(&path, &mut options) {
            Ok(found) => warnings = found,
            Err(err) => warnings.push(format!("{}: {err}", path.display())),
        }
    }

    for directives in &cli.set {
        options
            .apply_all(directives)
            .with_context(|| format!("invalid --set {directives:?}"))?;
    }
    if let Some(level) = cli.log_level {
        options.log_level = level;
    }
    Ok((options, warnings))
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (options, warnings) = resolve_options(&cli)?;

    let state_dir = config::state_dir();
    logger::init(&state_dir.join("quill.log"), options.log_level)
        .context("failed to install the logger")?;
    for warning in &warnings {
        tracing::warn!("config: {warning}");
    }
    tracing::debug!("options: {options:?}");

    let doc = file::load(&cli.file).with_context(|| format!("failed to open {}", cli.file.display()))?;
    let engine = language::for_path(&cli.file);
    tracing::info!("language: {}", engine.name());

    let clipboard = FileClipboard::new(state_dir.join("clipboard.json"));
    tracing::debug!("clipboard: {}", clipboard.path().display());
    let clipboard = shared(clipboard);
    let editor = Editor::new(doc, engine, clipboard).with_options(&options);
    let mut app = QuillApp::new(editor, cli.file, &options);

    let mut event_loop = EventLoop::new().context("failed to initialize the terminal")?;
    event_loop.run(&mut app).context("terminal I/O failed")?;
    tracing::info!("exit");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
