//! Error types.
//!
//! Only collaborator and configuration failures are errors. Doing nothing
//! (moving past the document edge, finding no match) is a `bool` or `None`,
//! and misuse of the editor's primitives is a panic.

use std::io;
use std::path::PathBuf;

/// A clipboard store failed.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// Another process held the clipboard lock for every attempt.
    #[error("clipboard is locked: {} (gave up after {attempts} attempts)", path.display())]
    LockTimeout { path: PathBuf, attempts: u32 },

    #[error("clipboard I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The stored data isn't a character sequence.
    #[error("clipboard data is corrupt: {0}")]
    Corrupt(String),
}

/// A search pattern didn't compile.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid pattern")]
    InvalidPattern(#[from] regex::Error),
}

/// A configuration directive was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// An editor action failed because a collaborator did.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Search(#[from] SearchError),
}
