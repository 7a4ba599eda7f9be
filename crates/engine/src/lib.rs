//! The evaluation core (L4): [`Engine::pull`], [`Engine::set`],
//! [`Engine::invalidate`], and debug introspection, built on the schema
//! compiler (L3) and per-schema storage (L2).
//!
//! This is the only crate in the workspace that opens `tracing` spans
//! around its public operations; `ripplegraph-core` and
//! `ripplegraph-schema` are pure types and validation, and log nothing.

mod engine;
mod error;
mod pull;

pub use engine::Engine;
pub use error::{EngineError, Result};

// Re-exported so a consumer of this crate can build a `Schema` and supply
// `JsonValue`s without a direct `serde_json` dependency of their own.
pub use ripplegraph_core::JsonValue;
pub use ripplegraph_schema::{Computor, ComputorOutput, Schema, SchemaHash};
pub use ripplegraph_storage::{DurabilityMode, StoreConfig};
