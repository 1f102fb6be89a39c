// SPDX-License-Identifier: MIT
//
// Loading and saving the edited file.
//
// A file that doesn't exist yet is an empty document; it is created on the
// first save. Saving writes a sibling temp file and renames it over the
// target, so a crash mid-save leaves either the old or the new contents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quill_editor::Document;

/// Read `path` into a document. A missing file is an empty document.
///
/// # Errors
///
/// Fails if the file exists but can't be read, or isn't UTF-8.
pub fn load(path: &Path) -> io::Result<Document> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let doc = Document::from_text(&text);
            tracing::info!(
                "loaded {}: {} rows, {} line endings",
                path.display(),
                doc.row_count(),
                doc.line_ending()
            );
            Ok(doc)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!("{} does not exist, starting empty", path.display());
            Ok(Document::new())
        }
        Err(err) => Err(err),
    }
}

/// Write `doc` to `path`, rows joined with the document's line ending.
///
/// # Errors
///
/// Fails if the temp file can't be written or renamed over `path`. The
/// temp file is removed on failure.
pub fn save(path: &Path, doc: &Document) -> io::Result<()> {
    let temp = temp_path(path)?;
    fs::write(&temp, doc.to_text())?;
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    tracing::info!("saved {}: {} rows", path.display(), doc.row_count());
    Ok(())
}

/// `.<name>.<pid>.tmp` next to `path`.
fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a file path: {}", path.display()),
        )
    })?;
    let mut temp = std::ffi::OsString::from(".");
    temp.push(name);
    temp.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(temp))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
