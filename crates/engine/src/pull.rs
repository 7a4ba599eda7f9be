//! The demand-driven evaluation algorithm (spec §4.4.2): resolve freshness,
//! validate cheaply where possible, recompute only when necessary.

use std::collections::HashMap;

use ripplegraph_core::{Bindings, ComputedValue, Counter, Freshness, InputsRecord, JsonValue, NodeKey};
use ripplegraph_schema::{resolve, resolve_dependency, CompiledGraph, ComputorOutput, SchemaStorage};
use ripplegraph_storage::Store;
use tracing::trace;

use crate::error::{EngineError, Result};

/// One `pull` call's working state: a mutable store handle, the immutable
/// compiled graph and schema storage, and a per-call memo so a dependency
/// pulled once by one consumer is reused by every other consumer in the
/// same top-level call (spec §4.4.2, "Ordering tie-break").
pub(crate) struct Evaluator<'a> {
    store: &'a mut Store,
    compiled: &'a CompiledGraph,
    storage: &'a SchemaStorage,
    memo: HashMap<NodeKey, (ComputedValue, Counter)>,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a mut Store, compiled: &'a CompiledGraph, storage: &'a SchemaStorage) -> Self {
        Evaluator {
            store,
            compiled,
            storage,
            memo: HashMap::new(),
        }
    }

    /// Pull one node, returning its up-to-date value and counter.
    pub fn pull(
        &mut self,
        key: NodeKey,
        schema_index: usize,
        bindings: Bindings,
    ) -> Result<(ComputedValue, Counter)> {
        if let Some(cached) = self.memo.get(&key) {
            return Ok(cached.clone());
        }

        let freshness = self.storage.get_freshness(self.store, &key)?;
        let result = match freshness {
            Some(Freshness::UpToDate) => {
                trace!(node = %key, "pull: already up-to-date");
                let value = self.stored_value_or_corrupted(&key)?;
                let counter = self.storage.get_counter(self.store, &key)?;
                (value, counter)
            }
            Some(Freshness::PotentiallyOutdated) => {
                trace!(node = %key, "pull: validating");
                self.validate_or_recompute(&key, schema_index, &bindings)?
            }
            None => {
                trace!(node = %key, "pull: never materialized, recomputing");
                self.recompute(&key, schema_index, &bindings)?
            }
        };

        self.memo.insert(key, result.clone());
        Ok(result)
    }

    fn stored_value_or_corrupted(&self, key: &NodeKey) -> Result<ComputedValue> {
        self.storage
            .get_value(self.store, key)?
            .ok_or_else(|| EngineError::Corrupted {
                node_key: key.to_string(),
                detail: "freshness record present but value missing".to_string(),
            })
    }

    /// Cheap-path validation (spec §4.4.2 step 3): a node's recorded
    /// inputs are re-pulled; if every dependency's counter still matches
    /// what was recorded, the node is upgraded to up-to-date without
    /// invoking its own computor (early cutoff).
    fn validate_or_recompute(
        &mut self,
        key: &NodeKey,
        schema_index: usize,
        bindings: &Bindings,
    ) -> Result<(ComputedValue, Counter)> {
        if let Some(record) = self.storage.get_inputs(self.store, key)? {
            let mut all_match = true;
            for (dep_key, recorded_counter) in record.pairs() {
                let resolved = resolve(dep_key.as_str(), self.compiled, &Bindings::empty())?;
                let (_, dep_counter) =
                    self.pull(resolved.canonical_key, resolved.schema_index, resolved.bindings)?;
                if dep_counter != recorded_counter {
                    all_match = false;
                }
            }
            if all_match {
                trace!(node = %key, "pull: validation succeeded, cutting off recompute");
                let value = self.stored_value_or_corrupted(key)?;
                let counter = self.storage.get_counter(self.store, key)?;
                self.storage.batch(
                    self.store,
                    vec![ripplegraph_schema::StorageOp::PutFreshness(
                        key.clone(),
                        Freshness::UpToDate,
                    )],
                )?;
                return Ok((value, counter));
            }
        }
        self.recompute(key, schema_index, bindings)
    }

    /// Full recompute (spec §4.4.2 step 4): pull every declared
    /// dependency, invoke the computor, and commit the new value,
    /// counter, freshness, inputs, and revdeps in one batch.
    fn recompute(
        &mut self,
        key: &NodeKey,
        schema_index: usize,
        bindings: &Bindings,
    ) -> Result<(ComputedValue, Counter)> {
        let n_inputs = self.compiled.schema(schema_index).inputs.len();
        let mut dep_values = Vec::with_capacity(n_inputs);
        let mut dep_pairs = Vec::with_capacity(n_inputs);
        for i in 0..n_inputs {
            let resolved = resolve_dependency(self.compiled, schema_index, i, bindings)?;
            let (value, counter) =
                self.pull(resolved.canonical_key.clone(), resolved.schema_index, resolved.bindings)?;
            dep_pairs.push((resolved.canonical_key, counter));
            dep_values.push(value.into_json());
        }

        let previous = self.storage.get_value(self.store, key)?;
        let previous_json: Option<JsonValue> = previous.as_ref().map(|v| v.as_json().clone());

        let schema = self.compiled.schema(schema_index);
        let output = schema
            .computor
            .compute(&dep_values, previous_json.as_ref(), bindings.as_slice())
            .map_err(|source| EngineError::Computor {
                node_key: key.to_string(),
                source,
            })?;

        let (new_value, counter) = match output {
            ComputorOutput::Unchanged => {
                trace!(node = %key, "recompute: computor returned Unchanged");
                let value = previous.ok_or_else(|| EngineError::Corrupted {
                    node_key: key.to_string(),
                    detail: "computor returned Unchanged with no previous stored value".to_string(),
                })?;
                let counter = self.storage.get_counter(self.store, key)?;
                (value, counter)
            }
            ComputorOutput::Value(json) => {
                let computed = ComputedValue::new(json).map_err(|e| EngineError::Corrupted {
                    node_key: key.to_string(),
                    detail: e.to_string(),
                })?;
                let prior_counter = self.storage.get_counter(self.store, key)?;
                let is_unchanged = previous.as_ref().is_some_and(|p| p.deep_eq(&computed));
                let counter = if is_unchanged { prior_counter } else { prior_counter.next() };
                (computed, counter)
            }
        };

        let inputs_record = InputsRecord::from_pairs(dep_pairs.clone());
        let mut ops = vec![
            ripplegraph_schema::StorageOp::PutValue(key.clone(), new_value.clone()),
            ripplegraph_schema::StorageOp::PutFreshness(key.clone(), Freshness::UpToDate),
            ripplegraph_schema::StorageOp::PutCounter(key.clone(), counter),
            ripplegraph_schema::StorageOp::PutInputs(key.clone(), inputs_record),
        ];
        for (dep_key, _) in &dep_pairs {
            let mut revdeps = self.storage.get_revdeps(self.store, dep_key)?;
            if revdeps.insert(key.clone()) {
                ops.push(ripplegraph_schema::StorageOp::PutRevdeps(dep_key.clone(), revdeps));
            }
        }
        self.storage.batch(self.store, ops)?;

        Ok((new_value, counter))
    }
}
