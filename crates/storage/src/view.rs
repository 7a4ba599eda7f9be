//! [`View`]: a strongly-typed wrapper over one key prefix of a [`Store`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::error::{Result, StoreError};
use crate::store::{Op, Store, WriteOp};

/// A typed projection of one "sublevel" of a [`Store`]: every key the view
/// touches is `{prefix}{suffix}`. Five of these, one per sublevel, are what
/// `ripplegraph-schema`'s `SchemaStorage` bundles into one atomic
/// [`Store::batch`] (spec §4.3: values, freshness, counters, inputs,
/// revdeps all commit together).
pub struct View<T> {
    prefix: String,
    _marker: PhantomData<T>,
}

impl<T> View<T>
where
    T: Serialize + DeserializeOwned,
{
    /// A view over every key starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        View {
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    /// The full store key for `suffix` within this view.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    /// Read and deserialize the value at `suffix`, if present.
    pub fn get(&self, store: &Store, suffix: &str) -> Result<Option<T>> {
        match store.get(&self.key(suffix)) {
            Some(value) => {
                let decoded = serde_json::from_value(value.clone())
                    .map_err(|e| StoreError::Corrupted(format!(
                        "value at {} failed to decode: {e}",
                        self.key(suffix)
                    )))?;
                Ok(Some(decoded))
            }
            None => Ok(None),
        }
    }

    /// Build the [`WriteOp`] that sets `suffix` to `value`, without
    /// applying it — for composing into a multi-view atomic batch.
    pub fn put_op(&self, suffix: &str, value: &T) -> Result<WriteOp> {
        let encoded = serde_json::to_value(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(WriteOp {
            key: self.key(suffix),
            op: Op::Put(encoded),
        })
    }

    /// Build the [`WriteOp`] that removes `suffix`.
    pub fn delete_op(&self, suffix: &str) -> WriteOp {
        WriteOp {
            key: self.key(suffix),
            op: Op::Delete,
        }
    }

    /// Set `suffix` to `value` immediately, as a batch of one.
    pub fn put(&self, store: &mut Store, suffix: &str, value: &T) -> Result<()> {
        let op = self.put_op(suffix, value)?;
        store.batch(vec![op])
    }

    /// Remove `suffix` immediately, as a batch of one.
    pub fn delete(&self, store: &mut Store, suffix: &str) -> Result<()> {
        store.batch(vec![self.delete_op(suffix)])
    }

    /// Every suffix currently present under this view, in key order.
    pub fn keys<'a>(&'a self, store: &'a Store) -> impl Iterator<Item = &'a str> + 'a {
        store
            .keys_prefix(&self.prefix)
            .map(move |k| &k[self.prefix.len()..])
    }

    /// Remove every key under this view's prefix, as a single atomic batch.
    /// Leaves the rest of the store untouched.
    pub fn clear(&self, store: &mut Store) -> Result<()> {
        let ops: Vec<WriteOp> = self
            .keys(store)
            .map(|suffix| self.delete_op(suffix))
            .collect();
        store.batch(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreConfig};

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Counter(u64);

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let view: View<Counter> = View::new("counters/");
        view.put(&mut store, "n1", &Counter(3)).unwrap();
        assert_eq!(view.get(&store, "n1").unwrap(), Some(Counter(3)));
    }

    #[test]
    fn views_with_different_prefixes_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let a: View<Counter> = View::new("a/");
        let b: View<Counter> = View::new("b/");
        a.put(&mut store, "x", &Counter(1)).unwrap();
        b.put(&mut store, "x", &Counter(2)).unwrap();
        assert_eq!(a.get(&store, "x").unwrap(), Some(Counter(1)));
        assert_eq!(b.get(&store, "x").unwrap(), Some(Counter(2)));
    }

    #[test]
    fn keys_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let view: View<Counter> = View::new("counters/");
        view.put(&mut store, "n1", &Counter(1)).unwrap();
        view.put(&mut store, "n2", &Counter(2)).unwrap();
        let mut keys: Vec<_> = view.keys(&store).collect();
        keys.sort();
        assert_eq!(keys, vec!["n1", "n2"]);
    }

    #[test]
    fn clear_removes_every_key_but_leaves_other_views_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let a: View<Counter> = View::new("a/");
        let b: View<Counter> = View::new("b/");
        a.put(&mut store, "n1", &Counter(1)).unwrap();
        a.put(&mut store, "n2", &Counter(2)).unwrap();
        b.put(&mut store, "n1", &Counter(9)).unwrap();

        a.clear(&mut store).unwrap();

        assert_eq!(a.keys(&store).count(), 0);
        assert_eq!(b.get(&store, "n1").unwrap(), Some(Counter(9)));
    }
}
