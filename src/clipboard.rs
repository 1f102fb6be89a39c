// SPDX-License-Identifier: MIT
//
// File-backed clipboard shared by every quill process of the same user.
//
// The clipboard lives in `<state-dir>/quill/clipboard.json` as a JSON array
// of one-character strings, `'\r'` marking row breaks. Every read and write
// takes an exclusive lock on `clipboard.json.lock` first. The lock is tried
// without blocking a fixed number of times; an editor never hangs on a
// clipboard another process forgot to release.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use quill_editor::{ClipboardError, ClipboardStore};

/// Lock attempts before giving up.
const LOCK_ATTEMPTS: u32 = 20;

/// Pause between lock attempts.
const LOCK_RETRY: Duration = Duration::from_millis(50);

// ─── Lock guard ─────────────────────────────────────────────────────────────

/// An exclusive lock on the clipboard's lock file, released on drop.
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!("clipboard unlock failed: {err}");
        }
    }
}

// ─── FileClipboard ──────────────────────────────────────────────────────────

/// A [`ClipboardStore`] persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
    lock_path: PathBuf,
    attempts: u32,
    retry: Duration,
}

impl FileClipboard {
    /// A clipboard stored at `path`, locked through `<path>.lock`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self {
            path,
            lock_path,
            attempts: LOCK_ATTEMPTS,
            retry: LOCK_RETRY,
        }
    }

    /// Override how hard to try for the lock.
    #[cfg(test)]
    #[must_use]
    pub const fn with_retry(mut self, attempts: u32, retry: Duration) -> Self {
        self.attempts = attempts;
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn lock(&self) -> Result<LockGuard, ClipboardError> {
        if let Some(dir) = self.lock_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;

        for attempt in 1..=self.attempts {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(LockGuard { file }),
                Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                    tracing::debug!("clipboard locked, attempt {attempt}/{}", self.attempts);
                    if attempt < self.attempts {
                        thread::sleep(self.retry);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!("giving up on clipboard lock {}", self.lock_path.display());
        Err(ClipboardError::LockTimeout {
            path: self.lock_path.clone(),
            attempts: self.attempts,
        })
    }
}

impl ClipboardStore for FileClipboard {
    fn get(&mut self) -> Result<Option<Vec<char>>, ClipboardError> {
        let _guard = self.lock()?;
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let chars: Vec<char> =
            serde_json::from_str(&json).map_err(|err| ClipboardError::Corrupt(err.to_string()))?;
        tracing::debug!("clipboard read: {} chars", chars.len());
        Ok(Some(chars))
    }

    fn set(&mut self, chars: &[char]) -> Result<(), ClipboardError> {
        let _guard = self.lock()?;
        let json =
            serde_json::to_string(chars).map_err(|err| ClipboardError::Corrupt(err.to_string()))?;
        fs::write(&self.path, json)?;
        tracing::debug!("clipboard written: {} chars", chars.len());
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileClipboard {
        FileClipboard::new(dir.path().join("clipboard.json"))
    }

    // ── Paths ─────────────────────────────────────────────────────────────

    #[test]
    fn lock_file_sits_next_to_the_data() {
        let clip = FileClipboard::new("/state/quill/clipboard.json");
        assert_eq!(clip.lock_path(), Path::new("/state/quill/clipboard.json.lock"));
    }

    // ── Reading and writing ───────────────────────────────────────────────

    #[test]
    fn missing_file_is_empty_clipboard() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).get().unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut clip = store(&dir);
        let chars: Vec<char> = "ab\rc".chars().collect();
        clip.set(&chars).unwrap();
        assert_eq!(clip.get().unwrap(), Some(chars));
    }

    #[test]
    fn stored_as_array_of_one_char_strings() {
        let dir = TempDir::new().unwrap();
        let mut clip = store(&dir);
        clip.set(&['x', '\r', 'y']).unwrap();
        let json = fs::read_to_string(clip.path()).unwrap();
        assert_eq!(json, r#"["x","\r","y"]"#);
    }

    #[test]
    fn reads_what_another_process_wrote() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("clipboard.json"), r#"["h","i"]"#).unwrap();
        assert_eq!(store(&dir).get().unwrap(), Some(vec!['h', 'i']));
    }

    #[test]
    fn corrupt_data_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("clipboard.json"), "{not json").unwrap();
        let err = store(&dir).get().unwrap_err();
        assert!(matches!(err, ClipboardError::Corrupt(_)), "{err}");
    }

    #[test]
    fn creates_missing_state_directory() {
        let dir = TempDir::new().unwrap();
        let mut clip = FileClipboard::new(dir.path().join("nested").join("clipboard.json"));
        clip.set(&['z']).unwrap();
        assert_eq!(clip.get().unwrap(), Some(vec!['z']));
    }

    // ── Locking ───────────────────────────────────────────────────────────

    #[test]
    fn held_lock_times_out() {
        let dir = TempDir::new().unwrap();
        let mut clip = store(&dir).with_retry(3, Duration::from_millis(1));
        let holder = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(clip.lock_path())
            .unwrap();
        holder.lock_exclusive().unwrap();

        let err = clip.set(&['a']).unwrap_err();
        match err {
            ClipboardError::LockTimeout { path, attempts } => {
                assert_eq!(path, clip.lock_path());
                assert_eq!(attempts, 3);
            }
            other => panic!("expected LockTimeout, got {other}"),
        }
        assert!(!clip.path().exists());

        FileExt::unlock(&holder).unwrap();
        clip.set(&['a']).unwrap();
        assert_eq!(clip.get().unwrap(), Some(vec!['a']));
    }

    #[test]
    fn lock_is_released_after_each_access() {
        let dir = TempDir::new().unwrap();
        let mut first = store(&dir).with_retry(1, Duration::ZERO);
        let mut second = store(&dir).with_retry(1, Duration::ZERO);
        first.set(&['1']).unwrap();
        second.set(&['2']).unwrap();
        assert_eq!(first.get().unwrap(), Some(vec!['2']));
    }
}
