//! Core types for the incremental computation engine.
//!
//! This crate defines the foundational vocabulary shared by every other
//! layer of ripplegraph:
//! - [`NodeKey`]: canonical textual identity of one node instance
//! - [`Bindings`]: the ordered argument list a node is pulled with
//! - [`ComputedValue`]: the opaque JSON object a computor produces
//! - [`Counter`] / [`Freshness`]: the change-tracking protocol
//! - [`InputsRecord`] / [`RevdepsRecord`]: the dependency edges the engine persists
//! - [`Error`]: the shared error vocabulary other crates build on
//!
//! Nothing in this crate knows about storage, schemas, or evaluation; it is
//! pure data plus the canonicalization rules that make two references to the
//! same node produce byte-identical keys.

pub mod canonical;
pub mod error;
pub mod freshness;
pub mod node_key;
pub mod records;
pub mod value;

pub use canonical::canonical_json;
pub use error::{Error, Result};
pub use freshness::{Freshness, FreshnessState};
pub use node_key::{Bindings, Counter, NodeKey};
pub use records::{InputsRecord, RevdepsRecord};
pub use value::ComputedValue;

/// Re-export of the JSON value type used at every public boundary, so
/// downstream crates never need their own direct `serde_json` dependency
/// just to build a schema or a [`ComputedValue`].
pub use serde_json::Value as JsonValue;
