//! Schema compiler (L3) and per-schema storage (L2) for ripplegraph.
//!
//! [`compile`] turns a user-supplied [`Schema`] list into an immutable
//! [`CompiledGraph`], rejecting cycles, output overlap, and malformed
//! variable shapes before the engine ever evaluates a node. [`resolve`]
//! is the reverse direction: given a node key string and a compiled
//! graph, find the schema that owns it and the bindings it was called
//! with. [`SchemaStorage`] is the atomic, per-schema-hash view bundle the
//! evaluation core reads and writes through.
//!
//! No `tracing` instrumentation lives in this crate: compilation and
//! resolution are pure validation, and the engine layer's spans around
//! the call boundary already capture what an operator needs.

mod compiler;
mod computor;
mod error;
mod hash;
mod name_template;
mod storage;

pub use compiler::{compile, resolve, resolve_dependency, CompiledGraph, CompiledSchema, ResolvedNode};
pub use computor::{Computor, ComputorOutput, Schema};
pub use error::{Result, SchemaError};
pub use hash::SchemaHash;
pub use name_template::NameTemplate;
pub use storage::{known_schema_hashes, SchemaStorage, StorageOp};
