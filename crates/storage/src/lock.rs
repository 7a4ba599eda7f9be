//! Advisory single-process lock over a store root.
//!
//! The engine's concurrency model is single-writer (spec §5): correctness
//! inside one process comes from `&mut self` on [`Store`](crate::Store),
//! but nothing stops a second *process* from opening the same root. This
//! lock closes that gap with an exclusive-create sentinel file, removed on
//! `Drop` so a crashed process doesn't wedge the root forever — the lock
//! only has to survive the lifetime of one `Store` handle, not a crash.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

const LOCK_FILE_NAME: &str = "LOCK";

/// Holds the store root locked for as long as it is alive.
pub(crate) struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `root`, failing with [`StoreError::LockHeld`] if
    /// another live handle already holds it.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE_NAME);
        match File::options().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(FileLock { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::LockHeld {
                    path: root.to_path_buf(),
                })
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
