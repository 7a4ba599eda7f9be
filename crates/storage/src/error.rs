//! Error vocabulary for the storage layer.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for fallible storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the L0 store and L1 typed views.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation on the journal or lock file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was performed against.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A journal record failed its checksum somewhere other than the
    /// trailing (possibly torn-by-crash) record, or a stored value did not
    /// deserialize into the type a view expected (spec §7,
    /// `CorruptedStateError`: the engine must surface this, never silently
    /// repair it).
    #[error("corrupted store state: {0}")]
    Corrupted(String),

    /// Another process already holds the store open at this root (spec
    /// §5: "only one engine instance at a time may hold it open").
    #[error("store at {path} is already locked by another process")]
    LockHeld {
        /// Root directory of the locked store.
        path: PathBuf,
    },

    /// A value could not be serialized to or deserialized from JSON.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
