//! [`NodeKey`], [`Counter`], and [`Bindings`]: the identity and
//! change-tracking primitives every node in the graph is addressed by.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical textual identity of one node instance.
///
/// A `NodeKey` is always in canonical form: `head(arg1, arg2, ...)` with
/// each argument rendered via [`canonical_json`](crate::canonical_json), or
/// just `head` for a ground (zero-arity) node. Two `NodeKey`s are equal iff
/// they were built from the same `(template, bindings)` pair (invariant I1,
/// spec §3.2) — this type itself never re-derives canonical form, it only
/// stores what [`instantiate`](../ripplegraph_schema/fn.instantiate.html)
/// (or a direct literal, for ground nodes) produced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(String);

impl NodeKey {
    /// Wrap an already-canonical string as a `NodeKey`.
    ///
    /// Callers outside `ripplegraph-schema` should not construct
    /// `NodeKey`s from scratch; use the schema compiler's `instantiate`
    /// instead so canonicalization stays in one place.
    pub fn new_canonical(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrow the underlying canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying canonical string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for NodeKey {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotone integer tracking value changes for one node (invariant I2/I3,
/// spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Counter(u64);

impl Counter {
    /// The counter assigned to a node that has never been materialized.
    pub const ZERO: Counter = Counter(0);

    /// Wrap a raw counter value (used when reading a persisted record).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// The next counter value after this one.
    pub fn next(self) -> Counter {
        Counter(self.0 + 1)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, JSON-serializable argument list a node is pulled with.
///
/// Aligned positionally with the free variables of the
/// [`NameTemplate`](../ripplegraph_schema/struct.NameTemplate.html) that
/// owns the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings(Vec<Value>);

impl Bindings {
    /// The empty binding list, used for ground (ungrounded) node schemas.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no bound values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the bound values.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Bindings {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl Deref for Bindings {
    type Target = [Value];
    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
