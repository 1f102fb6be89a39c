//! Clipboard store interface.
//!
//! The editor reads and writes the clipboard as a flat character sequence
//! with `'\r'` marking row breaks, exactly what
//! [`Document::span_chars`](crate::document::Document::span_chars) produces.
//! Persistence (and the cross-process locking it needs) belongs to the
//! store implementation; the editor only sees this trait.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ClipboardError;

/// Where cut and copied text goes.
pub trait ClipboardStore {
    /// The stored characters, or `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Fails when the backing store can't be read or locked.
    fn get(&mut self) -> Result<Option<Vec<char>>, ClipboardError>;

    /// Replace the stored characters.
    ///
    /// # Errors
    ///
    /// Fails when the backing store can't be written or locked.
    fn set(&mut self, chars: &[char]) -> Result<(), ClipboardError>;
}

/// A clipboard shared by an editor and its prompt fields.
pub type SharedClipboard = Rc<RefCell<dyn ClipboardStore>>;

/// Wrap a store for sharing.
#[must_use]
pub fn shared(store: impl ClipboardStore + 'static) -> SharedClipboard {
    Rc::new(RefCell::new(store))
}

/// An in-process clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    chars: Option<Vec<char>>,
}

impl MemoryClipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self { chars: None }
    }
}

impl ClipboardStore for MemoryClipboard {
    fn get(&mut self) -> Result<Option<Vec<char>>, ClipboardError> {
        Ok(self.chars.clone())
    }

    fn set(&mut self, chars: &[char]) -> Result<(), ClipboardError> {
        self.chars = Some(chars.to_vec());
        Ok(())
    }
}
