//! [`EngineError`]: the single error type a consumer of the root crate
//! needs to match on (spec §7).

use ripplegraph_schema::SchemaError;
use ripplegraph_storage::StoreError;
use thiserror::Error;

/// Result alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Every way a public [`Engine`](crate::Engine) operation can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Schema compilation or node-key resolution failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The queried node key's head and argument count matched no schema.
    #[error("no schema matches node key {node_key:?}")]
    UnknownSchema {
        /// The node key text that was queried.
        node_key: String,
    },

    /// A computor returned `Err`. No state was committed for this `pull`.
    #[error("computor for {node_key:?} failed: {source}")]
    Computor {
        /// The node being computed when the computor failed.
        node_key: String,
        /// The computor's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored record did not have the shape the engine expected, or a
    /// computor violated the `Unchanged` contract (spec §4.4.4, §7
    /// `CorruptedStateError`). Never silently repaired.
    #[error("corrupted state at {node_key:?}: {detail}")]
    Corrupted {
        /// The node whose stored state was inconsistent.
        node_key: String,
        /// Human-readable description of the inconsistency.
        detail: String,
    },
}
