//! Shared fixtures for the scenario and property test binaries.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ripplegraph_engine::{DurabilityMode, Engine, Schema, StoreConfig};
use serde_json::Value as JsonValue;
use tempfile::TempDir;

/// Open a fresh, empty engine under a throwaway directory. The `TempDir`
/// guard must be kept alive for as long as the engine is open.
pub fn temp_engine(schemas: Vec<Schema>) -> (Engine, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let engine = engine_at(dir.path(), schemas);
    (engine, dir)
}

/// Open an engine at a caller-chosen root, for tests that reopen the same
/// store across a `close()`/`open()` cycle.
pub fn engine_at(root: &std::path::Path, schemas: Vec<Schema>) -> Engine {
    let config = StoreConfig {
        root: root.to_path_buf(),
        durability: DurabilityMode::InMemory,
    };
    Engine::open(config, schemas).expect("open engine")
}

/// A [`Computor`](ripplegraph_engine::Computor) that counts its own
/// invocations, for asserting early cutoff skipped a recompute.
pub struct CountingComputor<F> {
    pub calls: Arc<AtomicUsize>,
    f: F,
}

impl<F> ripplegraph_engine::Computor for CountingComputor<F>
where
    F: Fn(
            &[JsonValue],
            Option<&JsonValue>,
            &[JsonValue],
        ) -> Result<ripplegraph_engine::ComputorOutput, Box<dyn std::error::Error + Send + Sync>>
        + Send,
{
    fn compute(
        &self,
        inputs: &[JsonValue],
        previous: Option<&JsonValue>,
        bindings: &[JsonValue],
    ) -> Result<ripplegraph_engine::ComputorOutput, Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(inputs, previous, bindings)
    }
}

/// Build a schema whose computor tracks how many times it was invoked.
/// Returns the schema and a shared call counter the test can assert on.
pub fn counted_schema<F>(
    output: impl Into<String>,
    inputs: Vec<String>,
    f: F,
) -> (Schema, Arc<AtomicUsize>)
where
    F: Fn(
            &[JsonValue],
            Option<&JsonValue>,
            &[JsonValue],
        ) -> Result<ripplegraph_engine::ComputorOutput, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let computor = CountingComputor {
        calls: calls.clone(),
        f,
    };
    (Schema::new(output, inputs, computor), calls)
}

/// A source schema with no inputs, whose computor is never expected to
/// run (every value reaches it through `Engine::set`).
pub fn source_schema(output: impl Into<String>) -> Schema {
    fn never_called(
        _inputs: &[JsonValue],
        _previous: Option<&JsonValue>,
        _bindings: &[JsonValue],
    ) -> Result<ripplegraph_engine::ComputorOutput, Box<dyn std::error::Error + Send + Sync>> {
        Err("source node has no computor; set() should have supplied its value".into())
    }
    Schema::new(output, Vec::new(), never_called)
}

/// A computor that adds one to the single numeric input's `"count"` field.
pub fn increment_count(
    inputs: &[JsonValue],
    _previous: Option<&JsonValue>,
    _bindings: &[JsonValue],
) -> Result<ripplegraph_engine::ComputorOutput, Box<dyn std::error::Error + Send + Sync>> {
    let n = inputs[0]["count"].as_i64().ok_or("missing count")?;
    Ok(ripplegraph_engine::ComputorOutput::Value(
        serde_json::json!({ "count": n + 1 }),
    ))
}
