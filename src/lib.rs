//! # ripplegraph
//!
//! A persistent, demand-driven incremental computation engine: declare a
//! graph of schemas once, then `pull` any node and get back an up-to-date
//! value, recomputing only what actually changed.
//!
//! ```no_run
//! use ripplegraph::{ComputorOutput, DurabilityMode, Engine, Schema, StoreConfig};
//! use serde_json::json;
//!
//! fn main() -> ripplegraph::Result<()> {
//!     let doubled = Schema::new(
//!         "doubled",
//!         vec!["source".into()],
//!         |inputs: &[serde_json::Value], _: Option<&serde_json::Value>, _: &[serde_json::Value]| {
//!             let n = inputs[0]["n"].as_i64().unwrap_or(0);
//!             Ok(ComputorOutput::Value(json!({ "n": n * 2 })))
//!         },
//!     );
//!     let source = Schema::new(
//!         "source",
//!         vec![],
//!         |_: &[serde_json::Value], _: Option<&serde_json::Value>, _: &[serde_json::Value]| {
//!             Ok(ComputorOutput::Value(json!({ "n": 0 })))
//!         },
//!     );
//!
//!     let config = StoreConfig {
//!         root: std::path::PathBuf::from("./ripplegraph-data"),
//!         durability: DurabilityMode::Strict,
//!     };
//!     let mut engine = Engine::open(config, vec![source, doubled])?;
//!
//!     engine.set("source", json!({ "n": 21 }))?;
//!     assert_eq!(engine.pull("doubled", &[])?, json!({ "n": 42 }));
//!     Ok(())
//! }
//! ```
//!
//! # Layers
//!
//! | Layer | Crate | Responsibility |
//! |-------|-------|-----------------|
//! | L0/L1 | `ripplegraph-storage` | durable ordered key-value store, typed views |
//! | L2/L3 | `ripplegraph-schema` | per-schema storage, schema compiler |
//! | L4 | `ripplegraph-engine` | `pull`/`set`/`invalidate`, the evaluation algorithm |
//!
//! Only [`Engine`] and the types needed to construct and drive it are
//! exposed here; the layer crates are internal building blocks.

pub use ripplegraph_engine::{
    Computor, ComputorOutput, DurabilityMode, Engine, EngineError, JsonValue, Result, Schema,
    SchemaHash, StoreConfig,
};

/// Re-exported so a caller matching on [`Engine::debug_get_freshness`]'s
/// result doesn't need its own direct dependency on `ripplegraph-core`.
pub use ripplegraph_core::FreshnessState;
