//! [`ComputedValue`]: the opaque value a computor produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// An opaque, JSON-serializable value produced by a computor.
///
/// Must be a JSON object at the top level (spec §3.1): this is what lets
/// the engine tell a genuine computed value apart from the `Unchanged`
/// control sentinel, which is a distinct Rust type
/// (`ripplegraph_schema::ComputorOutput::Unchanged`) and can never be
/// mistaken for a `ComputedValue` no matter what a computor returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedValue(Value);

impl ComputedValue {
    /// Wrap `value`, checking that it is a JSON object at the top level.
    pub fn new(value: Value) -> Result<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(Error::ValueNotAnObject {
                kind: json_kind(&value),
            })
        }
    }

    /// Borrow the underlying JSON object.
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Consume and return the underlying JSON object.
    pub fn into_json(self) -> Value {
        self.0
    }

    /// Deep-equality comparison, used to decide whether a recompute's
    /// output differs from the previously stored value (invariant I3).
    pub fn deep_eq(&self, other: &ComputedValue) -> bool {
        self.0 == other.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
