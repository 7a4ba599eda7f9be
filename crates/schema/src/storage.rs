//! [`SchemaStorage`]: the L2 per-schema-hash container bundling the five
//! L1 views into one atomic `batch` (spec §4.3, §6.2).

use ripplegraph_core::{Counter, Freshness, InputsRecord, NodeKey, RevdepsRecord};
use ripplegraph_storage::{Op, Store, View, WriteOp};

use crate::error::Result;
use crate::hash::SchemaHash;

const SCHEMAS_INDEX_PREFIX: &str = "schemas/";

/// One pending mutation to a [`SchemaStorage`] view, collected by callers
/// building up an atomic batch (spec §4.3: `{view, kind: put|del, key,
/// value?}`).
pub enum StorageOp {
    /// Set a node's stored value.
    PutValue(NodeKey, ripplegraph_core::ComputedValue),
    /// Set a node's freshness state.
    PutFreshness(NodeKey, Freshness),
    /// Set a node's counter.
    PutCounter(NodeKey, Counter),
    /// Set a node's recorded dependency edges.
    PutInputs(NodeKey, InputsRecord),
    /// Set a node's recorded reverse-dependency set.
    PutRevdeps(NodeKey, RevdepsRecord),
}

/// The five typed views for one schema hash, plus the root schema index
/// entry that records this hash exists.
pub struct SchemaStorage {
    hash: SchemaHash,
    values: View<ripplegraph_core::ComputedValue>,
    freshness: View<Freshness>,
    counters: View<Counter>,
    inputs: View<InputsRecord>,
    revdeps: View<RevdepsRecord>,
}

impl SchemaStorage {
    /// Open (lazily creating) the storage for `hash`. Creation is lazy in
    /// the sense that no keys are written until the first [`batch`] call;
    /// opening just builds the five view handles.
    pub fn open(hash: SchemaHash) -> Self {
        let root = hash.to_hex();
        SchemaStorage {
            hash,
            values: View::new(format!("{root}/values/")),
            freshness: View::new(format!("{root}/freshness/")),
            counters: View::new(format!("{root}/counters/")),
            inputs: View::new(format!("{root}/inputs/")),
            revdeps: View::new(format!("{root}/revdeps/")),
        }
    }

    /// This storage's schema hash.
    pub fn hash(&self) -> SchemaHash {
        self.hash
    }

    /// The stored value for `key`, if any.
    pub fn get_value(&self, store: &Store, key: &NodeKey) -> Result<Option<ripplegraph_core::ComputedValue>> {
        Ok(self.values.get(store, key.as_str())?)
    }

    /// The freshness state for `key` (`None` means never materialized).
    pub fn get_freshness(&self, store: &Store, key: &NodeKey) -> Result<Option<Freshness>> {
        Ok(self.freshness.get(store, key.as_str())?)
    }

    /// The counter for `key`, defaulting to [`Counter::ZERO`] if absent.
    pub fn get_counter(&self, store: &Store, key: &NodeKey) -> Result<Counter> {
        Ok(self.counters.get(store, key.as_str())?.unwrap_or(Counter::ZERO))
    }

    /// The recorded dependency edges for `key`, if any.
    pub fn get_inputs(&self, store: &Store, key: &NodeKey) -> Result<Option<InputsRecord>> {
        Ok(self.inputs.get(store, key.as_str())?)
    }

    /// The recorded reverse-dependency set for `key`, defaulting to empty.
    pub fn get_revdeps(&self, store: &Store, key: &NodeKey) -> Result<RevdepsRecord> {
        Ok(self.revdeps.get(store, key.as_str())?.unwrap_or_else(RevdepsRecord::empty))
    }

    /// Every node key with a stored value, in lexicographic key order
    /// (spec §4.4.1, `debugListMaterializedNodes`).
    pub fn materialized_nodes<'a>(&'a self, store: &'a Store) -> impl Iterator<Item = NodeKey> + 'a {
        self.values.keys(store).map(|s| NodeKey::new_canonical(s.to_string()))
    }

    /// Remove every key belonging to this schema hash, across all five
    /// views and the root `/schemas/<hash>` presence marker, as a single
    /// atomic batch (spec §4.3's `clear`, applied whole-schema).
    pub fn clear_all(&self, store: &mut Store) -> Result<()> {
        let mut writes: Vec<WriteOp> = Vec::new();
        writes.extend(self.values.keys(store).map(|s| self.values.delete_op(s)));
        writes.extend(self.freshness.keys(store).map(|s| self.freshness.delete_op(s)));
        writes.extend(self.counters.keys(store).map(|s| self.counters.delete_op(s)));
        writes.extend(self.inputs.keys(store).map(|s| self.inputs.delete_op(s)));
        writes.extend(self.revdeps.keys(store).map(|s| self.revdeps.delete_op(s)));
        let index_key = format!("{}{}", SCHEMAS_INDEX_PREFIX, self.hash.to_hex());
        if store.get(&index_key).is_some() {
            writes.push(WriteOp {
                key: index_key,
                op: Op::Delete,
            });
        }
        Ok(store.batch(writes)?)
    }

    /// Apply `ops` to `store` as a single atomic batch.
    ///
    /// If this is the first batch ever written for this schema hash, the
    /// root `/schemas/<hash>` presence marker is appended to the same
    /// batch, so a crash between "schema first touched" and "first write
    /// durable" cannot leave a dangling, unindexed namespace (spec §4.3).
    pub fn batch(&self, store: &mut Store, ops: Vec<StorageOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let mut writes = Vec::with_capacity(ops.len() + 1);
        let index_key = format!("{}{}", SCHEMAS_INDEX_PREFIX, self.hash.to_hex());
        if store.get(&index_key).is_none() {
            writes.push(WriteOp {
                key: index_key,
                op: Op::Put(serde_json::Value::Bool(true)),
            });
        }
        for op in ops {
            writes.push(self.encode(op)?);
        }
        Ok(store.batch(writes)?)
    }

    fn encode(&self, op: StorageOp) -> Result<WriteOp> {
        Ok(match op {
            StorageOp::PutValue(key, value) => self.values.put_op(key.as_str(), &value)?,
            StorageOp::PutFreshness(key, freshness) => {
                self.freshness.put_op(key.as_str(), &freshness)?
            }
            StorageOp::PutCounter(key, counter) => self.counters.put_op(key.as_str(), &counter)?,
            StorageOp::PutInputs(key, record) => self.inputs.put_op(key.as_str(), &record)?,
            StorageOp::PutRevdeps(key, record) => self.revdeps.put_op(key.as_str(), &record)?,
        })
    }
}

/// Every schema hash that has ever had a durable write in `store` (spec
/// §4.3's root `/schemas` index).
pub fn known_schema_hashes(store: &Store) -> Vec<String> {
    store
        .keys_prefix(SCHEMAS_INDEX_PREFIX)
        .map(|k| k[SCHEMAS_INDEX_PREFIX.len()..].to_string())
        .collect()
}
