//! [`InputsRecord`] and [`RevdepsRecord`]: the dependency edges persisted
//! alongside each node (spec §3.1 invariants I4, I5).

use serde::{Deserialize, Serialize};

use crate::node_key::{Counter, NodeKey};

/// The exact dependency edges observed during a node's last successful
/// computation, along with the counter each dependency had at that time.
///
/// Stored per dependent `NodeKey` in the `inputs` view (spec §3.1, §6.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputsRecord {
    /// Dependency node keys, in schema declaration order.
    pub inputs: Vec<NodeKey>,
    /// The counter each corresponding dependency had when this record was
    /// written.
    pub input_counters: Vec<Counter>,
}

impl InputsRecord {
    /// Build a record from parallel `(dep, counter)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NodeKey, Counter)>) -> Self {
        let (inputs, input_counters) = pairs.into_iter().unzip();
        Self {
            inputs,
            input_counters,
        }
    }

    /// Iterate the `(dependency, recorded counter)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&NodeKey, Counter)> {
        self.inputs.iter().zip(self.input_counters.iter().copied())
    }
}

/// The set of nodes known to depend on a given node, indexed in reverse
/// (spec §3.1 invariant I5: `inputs(N) contains D` implies `revdeps(D)
/// contains N`, and vice versa for the last-recorded inputs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevdepsRecord(pub Vec<NodeKey>);

impl RevdepsRecord {
    /// An empty reverse-dependency set.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Add `dependent` to the set if it is not already present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, dependent: NodeKey) -> bool {
        if self.0.contains(&dependent) {
            false
        } else {
            self.0.push(dependent);
            true
        }
    }

    /// Iterate the dependent node keys.
    pub fn iter(&self) -> impl Iterator<Item = &NodeKey> {
        self.0.iter()
    }

    /// True if no node depends on this one.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
