//! [`Engine`]: the public entry point — `open`, `pull`, `set`,
//! `invalidate`, debug introspection, `close` (spec §4.4, §6.1).

use std::collections::{HashSet, VecDeque};

use ripplegraph_core::{Bindings, Freshness, FreshnessState, JsonValue, NodeKey};
use ripplegraph_schema::{
    compile, resolve, resolve_dependency, CompiledGraph, Schema, SchemaError, SchemaHash,
    SchemaStorage, StorageOp,
};
use ripplegraph_storage::{Store, StoreConfig};
use tracing::{debug, debug_span};

use crate::error::{EngineError, Result};
use crate::pull::Evaluator;

/// The demand-driven incremental computation engine.
///
/// Every public method takes `&mut self`: the Rust borrow checker is what
/// enforces "one operation runs to completion before another starts" for
/// this single-writer, single-process engine handle (spec §5).
pub struct Engine {
    store: Store,
    compiled: CompiledGraph,
    storage: SchemaStorage,
}

impl Engine {
    /// Compile `schemas` and open the durable store at `config.root`.
    ///
    /// Fails with [`EngineError::Schema`] if the schema list has a cycle,
    /// output overlap, or a shape error; with [`EngineError::Store`] if the
    /// store cannot be opened (including another process already holding
    /// it open).
    pub fn open(config: StoreConfig, schemas: Vec<Schema>) -> Result<Self> {
        let compiled = compile(schemas)?;
        let store = Store::open(config)?;
        let storage = SchemaStorage::open(compiled.schema_hash());
        debug!(schema_hash = %compiled.schema_hash(), "engine opened");
        Ok(Engine {
            store,
            compiled,
            storage,
        })
    }

    /// This engine's schema fingerprint (spec §3.1; used by debug tooling
    /// to confirm schema isolation across restarts).
    pub fn debug_schema_hash(&self) -> SchemaHash {
        self.compiled.schema_hash()
    }

    /// Resolve `node_key` (optionally with explicit `bindings`) to its
    /// up-to-date value, recomputing only what is necessary (spec §4.4.2).
    pub fn pull(&mut self, node_key: &str, bindings: &[JsonValue]) -> Result<JsonValue> {
        let _span = debug_span!("pull", node_key).entered();
        let resolved = resolve_or_unknown(node_key, &self.compiled, &Bindings::from(bindings.to_vec()))?;
        let mut evaluator = Evaluator::new(&mut self.store, &self.compiled, &self.storage);
        let (value, _counter) =
            evaluator.pull(resolved.canonical_key, resolved.schema_index, resolved.bindings)?;
        Ok(value.into_json())
    }

    /// Write `value` to `node_key`, mark it up-to-date, bump its counter
    /// if the value changed, and cascade `potentially-outdated` to every
    /// transitive dependent (spec §4.4.1, §4.4.3).
    pub fn set(&mut self, node_key: &str, value: JsonValue) -> Result<()> {
        let _span = debug_span!("set", node_key).entered();
        let resolved = resolve_or_unknown(node_key, &self.compiled, &Bindings::empty())?;
        let key = resolved.canonical_key;

        let computed = ripplegraph_core::ComputedValue::new(value).map_err(|e| EngineError::Corrupted {
            node_key: key.to_string(),
            detail: e.to_string(),
        })?;
        let previous = self.storage.get_value(&self.store, &key)?;
        let unchanged = previous.as_ref().is_some_and(|p| p.deep_eq(&computed));
        let prior_counter = self.storage.get_counter(&self.store, &key)?;
        let counter = if unchanged { prior_counter } else { prior_counter.next() };

        let mut ops = vec![
            StorageOp::PutValue(key.clone(), computed),
            StorageOp::PutFreshness(key.clone(), Freshness::UpToDate),
            StorageOp::PutCounter(key.clone(), counter),
        ];

        if !unchanged {
            debug!(node = %key, "set: value changed, cascading");
            let dependents = self.cascade_closure(&key)?;
            ops.extend(self.downgrade_ops(&dependents)?);
        }

        self.storage.batch(&mut self.store, ops)?;
        Ok(())
    }

    /// Mark `node_key` and every transitive dependent as
    /// `potentially-outdated` without recomputing (spec §4.4.1, §4.4.3).
    pub fn invalidate(&mut self, node_key: &str) -> Result<()> {
        let _span = debug_span!("invalidate", node_key).entered();
        let resolved = resolve_or_unknown(node_key, &self.compiled, &Bindings::empty())?;
        let key = resolved.canonical_key;

        let was_materialized = self.storage.get_freshness(&self.store, &key)?.is_some()
            || self.storage.get_value(&self.store, &key)?.is_some();

        let mut nodes = self.cascade_closure(&key)?;
        nodes.push(key.clone());
        let mut ops = self.downgrade_ops(&nodes)?;

        if !was_materialized {
            debug!(node = %key, "invalidate: first touch, registering input revdeps");
            let schema = self.compiled.schema(resolved.schema_index);
            for i in 0..schema.inputs.len() {
                let dep = resolve_dependency(&self.compiled, resolved.schema_index, i, &resolved.bindings)?;
                let mut revdeps = self.storage.get_revdeps(&self.store, &dep.canonical_key)?;
                if revdeps.insert(key.clone()) {
                    ops.push(StorageOp::PutRevdeps(dep.canonical_key, revdeps));
                }
            }
        }

        self.storage.batch(&mut self.store, ops)?;
        Ok(())
    }

    /// The freshness of `node_key`: `missing` if never materialized (spec
    /// §4.4.1, `debugGetFreshness`).
    pub fn debug_get_freshness(&mut self, node_key: &str) -> Result<FreshnessState> {
        let resolved = resolve_or_unknown(node_key, &self.compiled, &Bindings::empty())?;
        let freshness = self.storage.get_freshness(&self.store, &resolved.canonical_key)?;
        Ok(FreshnessState::from(freshness))
    }

    /// Every node key with a stored value (spec §4.4.1,
    /// `debugListMaterializedNodes`).
    pub fn debug_list_materialized_nodes(&self) -> Result<Vec<String>> {
        Ok(self
            .storage
            .materialized_nodes(&self.store)
            .map(NodeKey::into_string)
            .collect())
    }

    /// Release the store's file lock. Buffered journal writes are flushed
    /// regardless of durability mode.
    pub fn close(self) -> Result<()> {
        Ok(self.store.close()?)
    }

    /// Breadth-first transitive dependents of `start` via `revdeps`,
    /// excluding `start` itself (spec §4.4.3 step 2).
    fn cascade_closure(&self, start: &NodeKey) -> Result<Vec<NodeKey>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start.clone());

        let mut order = Vec::new();
        while let Some(node) = queue.pop_front() {
            let revdeps = self.storage.get_revdeps(&self.store, &node)?;
            for dep in revdeps.iter() {
                if visited.insert(dep.clone()) {
                    order.push(dep.clone());
                    queue.push_back(dep.clone());
                }
            }
        }
        Ok(order)
    }

    /// Build the `freshness = potentially-outdated` writes for `nodes`,
    /// skipping any node already `potentially-outdated` or never
    /// materialized with no stored value (spec §4.4.3 step 3).
    fn downgrade_ops(&self, nodes: &[NodeKey]) -> Result<Vec<StorageOp>> {
        let mut ops = Vec::new();
        for node in nodes {
            let freshness = self.storage.get_freshness(&self.store, node)?;
            let should_mark = match freshness {
                Some(Freshness::UpToDate) => true,
                Some(Freshness::PotentiallyOutdated) => false,
                None => self.storage.get_value(&self.store, node)?.is_some(),
            };
            if should_mark {
                ops.push(StorageOp::PutFreshness(node.clone(), Freshness::PotentiallyOutdated));
            }
        }
        Ok(ops)
    }
}

fn resolve_or_unknown(
    node_key: &str,
    compiled: &CompiledGraph,
    bindings: &Bindings,
) -> Result<ripplegraph_schema::ResolvedNode> {
    resolve(node_key, compiled, bindings).map_err(|e| match e {
        SchemaError::UnknownSchema { .. } => EngineError::UnknownSchema {
            node_key: node_key.to_string(),
        },
        other => EngineError::Schema(other),
    })
}
