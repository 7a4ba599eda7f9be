//! Durable ordered key-value store (L0) and typed storage views (L1).
//!
//! This crate implements the bottom two layers of the engine:
//!
//! - [`Store`]: an ordered `String -> serde_json::Value` map, kept in memory
//!   and made durable by an append-only journal. `Store::open` on an
//!   existing root replays the journal to rebuild the in-memory index,
//!   which is what makes the engine restart-safe (spec §5, §8 scenarios
//!   9–10).
//! - [`View`]: a strongly-typed wrapper over one "sublevel" (a key prefix)
//!   of a `Store`, offering `get` / `put` / `delete` / `keys` / `clear`.
//!   Multiple views compose into one atomic [`Store::batch`] via
//!   [`WriteOp`], which is how `ripplegraph-schema`'s `SchemaStorage`
//!   bundles five views under one commit (spec §4.3).
//!
//! Every mutation — single-key or batched — goes through [`Store::batch`],
//! so there is exactly one code path that appends to the journal and
//! exactly one that can ever partially apply (invariant I6, spec §3.2).

mod error;
mod journal;
mod lock;
mod store;
mod view;

pub use error::{Result, StoreError};
pub use store::{DurabilityMode, Op, Store, StoreConfig, WriteOp};
pub use view::View;
