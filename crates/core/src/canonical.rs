//! Canonical JSON serialization.
//!
//! Two references to the same `(template, bindings)` pair must produce
//! byte-identical [`NodeKey`](crate::NodeKey)s (invariant I1, spec §3.2).
//! Binding arguments are JSON values, and JSON object key order is not
//! semantically meaningful, so naive `serde_json::to_string` is not
//! canonical: `{"a":1,"b":2}` and `{"b":2,"a":1}` are the same value but
//! different strings. This module fixes that by sorting object keys
//! recursively before serializing, with whitespace-free separators.

use serde_json::Value;

use crate::error::{Error, Result};

/// Serialize `value` to its canonical textual form: object keys sorted
/// lexicographically at every nesting level, no insignificant whitespace.
///
/// Returns [`Error::NotCanonicalizable`] if `value` contains a
/// non-finite float (`NaN`/`inf`), which has no canonical JSON
/// representation.
pub fn canonical_json(value: &Value) -> Result<String> {
    let sorted = sort_keys(value)?;
    serde_json::to_string(&sorted).map_err(|e| Error::NotCanonicalizable(e.to_string()))
}

fn sort_keys(value: &Value) -> Result<Value> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value.clone()),
        Value::Number(n) => {
            if n.as_f64().is_some_and(|f| !f.is_finite()) {
                return Err(Error::NotCanonicalizable(
                    "non-finite number has no canonical JSON form".to_string(),
                ));
            }
            Ok(value.clone())
        }
        Value::Array(items) => {
            let sorted = items.iter().map(sort_keys).collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(sorted))
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), sort_keys(v)?);
            }
            Ok(Value::Object(out))
        }
    }
}
