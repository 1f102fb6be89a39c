// SPDX-License-Identifier: MIT
//
// Configuration file and per-user directories.
//
// `<config-dir>/quill/config` holds option directives in the same grammar
// as `--set`, any number per line:
//
//   # two-space indents, no hint rows
//   tabspaces=2 nohints
//   loglevel=debug
//
// A bad directive is skipped with a warning instead of refusing to start;
// the warnings are returned because the logger isn't up yet when the file
// is read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quill_editor::options::parse_set;
use quill_editor::Options;

const APP_DIR: &str = "quill";

/// `<config-dir>/quill/config`, if the platform has a config directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config"))
}

/// `<state-dir>/quill`: log file and clipboard. Platforms without a state
/// directory get `~/.local/state/quill`, then the temp directory.
#[must_use]
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Apply the directives in the file at `path` to `options`. A missing file
/// changes nothing. Returns one warning per rejected directive.
///
/// # Errors
///
/// Fails only if the file exists but can't be read.
pub fn load(path: &Path, options: &mut Options) -> io::Result<Vec<String>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    Ok(apply_text(&text, path, options))
}

fn apply_text(text: &str, path: &Path, options: &mut Options) -> Vec<String> {
    let mut warnings = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.split_once('#').map_or(line, |(before, _)| before);
        for directive in parse_set(line) {
            if let Err(err) = options.apply(&directive) {
                warnings.push(format!("{}:{}: {err}", path.display(), index + 1));
            }
        }
    }
    warnings
}

// ─── Tests ──────────────────────────────────────────────────────────────────
