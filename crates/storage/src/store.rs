//! [`Store`]: the L0 durable ordered key-value map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::journal::{Journal, Record};
use crate::lock::FileLock;

/// How aggressively the journal is synced to disk.
///
/// This is a synchronous, single-process crate with no background thread,
/// so there is no time-based ("every N milliseconds") sync policy — only
/// write-count-based batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Never sync; durable only as long as the process is alive. Useful for
    /// tests and throwaway scratch stores.
    InMemory,
    /// Sync after every batch. The default: every `Store::batch` call that
    /// returns `Ok` is guaranteed on disk.
    #[default]
    Strict,
    /// Sync once every `batch_size` batches.
    Batched {
        /// Number of batches between syncs.
        batch_size: u32,
    },
}

/// A single key mutation within a [`WriteOp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    /// Set `key` to the given JSON value.
    Put(Value),
    /// Remove `key`, if present.
    Delete,
}

/// One key's mutation within an atomic [`Store::batch`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOp {
    /// The store key this mutation applies to.
    pub key: String,
    /// The mutation itself.
    pub op: Op,
}

/// Configuration for opening a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory holding the journal and lock file.
    pub root: PathBuf,
    /// Durability policy governing journal fsync cadence.
    pub durability: DurabilityMode,
}

impl StoreConfig {
    /// A config pointing at `root` with [`DurabilityMode::Strict`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StoreConfig {
            root: root.into(),
            durability: DurabilityMode::default(),
        }
    }

    /// Override the durability mode.
    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }
}

/// The durable ordered `String -> Value` map underlying every view in
/// `ripplegraph-storage` and, through it, every typed view in
/// `ripplegraph-schema` and `ripplegraph-engine`.
///
/// All mutation goes through [`Store::batch`] (a single-key `put`/`delete`
/// is a batch of one): this is the one code path that appends to the
/// journal, so there is exactly one place a partial write could ever occur,
/// and the journal's checksum-and-replay protocol is what rules that out on
/// restart (invariant I6).
pub struct Store {
    index: BTreeMap<String, Value>,
    journal: Journal,
    _lock: FileLock,
}

impl Store {
    /// Open (creating if absent) the store at `config.root`.
    ///
    /// Replays the journal to rebuild the in-memory index exactly as it
    /// stood at the last successful commit, which is what makes the engine
    /// restart-safe across process crashes (spec §8, scenarios 9–10).
    #[instrument(skip(config), fields(root = %config.root.display()))]
    pub fn open(config: StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.root)
            .map_err(|e| crate::error::StoreError::io(&config.root, e))?;
        let lock = FileLock::acquire(&config.root)?;

        let mut index = BTreeMap::new();
        let journal = Journal::open(&config.root, config.durability, |record| {
            apply_record(&mut index, record);
        })?;

        debug!(keys = index.len(), "store opened");
        Ok(Store {
            index,
            journal,
            _lock: lock,
        })
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key)
    }

    /// Set `key` to `value`, durably, as a batch of one.
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.batch(vec![WriteOp {
            key: key.into(),
            op: Op::Put(value),
        }])
    }

    /// Remove `key`, durably, as a batch of one.
    pub fn delete(&mut self, key: impl Into<String>) -> Result<()> {
        self.batch(vec![WriteOp {
            key: key.into(),
            op: Op::Delete,
        }])
    }

    /// Apply all of `ops` atomically: one journal record, one fsync
    /// decision, applied to the in-memory index only after the journal
    /// append succeeds.
    #[instrument(skip(self, ops), fields(n = ops.len()))]
    pub fn batch(&mut self, ops: Vec<WriteOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let record = Record { ops };
        self.journal.append(&record)?;
        apply_record(&mut self.index, record);
        Ok(())
    }

    /// Iterate `(key, value)` pairs whose key starts with `prefix`, in
    /// lexicographic key order.
    pub fn scan_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.index
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Like [`Store::scan_prefix`] but keys only.
    pub fn keys_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.scan_prefix(prefix).map(|(k, _)| k)
    }

    /// Force any buffered journal writes to disk, regardless of durability
    /// mode. Called when the owning `Store` (or engine) is closed.
    pub fn close(mut self) -> Result<()> {
        self.journal.flush()
    }
}

fn apply_record(index: &mut BTreeMap<String, Value>, record: Record) {
    for write in record.ops {
        match write.op {
            Op::Put(value) => {
                index.insert(write.key, value);
            }
            Op::Delete => {
                index.remove(&write.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open(dir: &Path) -> Store {
        Store::open(StoreConfig::new(dir)).unwrap()
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.put("a", json!({"n": 1})).unwrap();
        assert_eq!(store.get("a"), Some(&json!({"n": 1})));
    }

    #[test]
    fn delete_removes_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.put("a", json!(1)).unwrap();
        store.delete("a").unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn scan_prefix_is_ordered_and_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.put("values/b", json!(2)).unwrap();
        store.put("values/a", json!(1)).unwrap();
        store.put("other/x", json!(9)).unwrap();
        let got: Vec<_> = store.scan_prefix("values/").map(|(k, _)| k).collect();
        assert_eq!(got, vec!["values/a", "values/b"]);
    }

    #[test]
    fn batch_is_all_or_nothing_on_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store
            .batch(vec![
                WriteOp { key: "a".into(), op: Op::Put(json!(1)) },
                WriteOp { key: "b".into(), op: Op::Put(json!(2)) },
            ])
            .unwrap();
        assert_eq!(store.get("a"), Some(&json!(1)));
        assert_eq!(store.get("b"), Some(&json!(2)));
    }

    #[test]
    fn reopen_replays_journal() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.put("a", json!("x")).unwrap();
            store.close().unwrap();
        }
        let store = open(dir.path());
        assert_eq!(store.get("a"), Some(&json!("x")));
    }

    #[test]
    fn second_open_while_first_live_is_locked() {
        let dir = tempfile::tempdir().unwrap();
        let _first = open(dir.path());
        assert!(Store::open(StoreConfig::new(dir.path())).is_err());
    }
}
