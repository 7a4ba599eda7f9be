//! Shared error vocabulary for the core type layer.
//!
//! Higher layers (`ripplegraph-storage`, `ripplegraph-schema`,
//! `ripplegraph-engine`) define their own error enums and wrap this one with
//! `#[from]`, the same composition pattern the storage/engine split uses
//! throughout this codebase.

use thiserror::Error;

/// Result alias for fallible operations over core types.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can arise from core type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A node key string did not parse as `head(arg1, arg2, ...)`.
    #[error("malformed node key {0:?}")]
    MalformedNodeKey(String),

    /// A computed value was not a JSON object at the top level.
    ///
    /// I3/spec §3.1 require `ComputedValue` to be an object so it can never
    /// be confused with the `Unchanged` control sentinel.
    #[error("computed value must be a JSON object, got {kind}")]
    ValueNotAnObject {
        /// Human-readable description of what was found instead.
        kind: &'static str,
    },

    /// A JSON value could not be canonicalized (e.g. contained `NaN`).
    #[error("value is not canonicalizable: {0}")]
    NotCanonicalizable(String),
}
