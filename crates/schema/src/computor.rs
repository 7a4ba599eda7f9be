//! [`Schema`], [`Computor`], and [`ComputorOutput`]: the user-facing
//! contract a caller supplies at engine construction (spec §6.1, §6.3).

use ripplegraph_core::JsonValue;

/// One rule describing how to compute a family of nodes sharing a head and
/// arity.
///
/// Supplied at engine construction and immutable for the engine handle's
/// lifetime (spec §3.1, §3.3).
pub struct Schema {
    /// The output name template, e.g. `"f(x, y)"`.
    pub output: String,
    /// The input name templates, in declaration order.
    pub inputs: Vec<String>,
    /// The user-supplied function bound to this schema.
    pub computor: Box<dyn Computor>,
    /// Whether the computor is a pure function of its inputs and bindings.
    /// Not enforced by the engine; carried for the caller's own bookkeeping.
    pub is_deterministic: bool,
    /// Whether invoking the computor has effects beyond its return value.
    /// Not enforced by the engine; carried for the caller's own bookkeeping.
    pub has_side_effects: bool,
}

impl Schema {
    /// Build a schema with the common defaults (deterministic, no side
    /// effects).
    pub fn new(
        output: impl Into<String>,
        inputs: Vec<String>,
        computor: impl Computor + 'static,
    ) -> Self {
        Schema {
            output: output.into(),
            inputs,
            computor: Box::new(computor),
            is_deterministic: true,
            has_side_effects: false,
        }
    }
}

/// A return value from a [`Computor`]: either a new value, or the
/// `Unchanged` sentinel signaling early cutoff (spec §4.4.4).
///
/// `Unchanged` is a private unit variant reachable only through this enum,
/// never a string or a JSON value, so it can never be confused with a
/// genuine computed value no matter what a computor author writes into the
/// `Value` variant.
#[derive(Debug, Clone)]
pub enum ComputorOutput {
    /// A freshly computed value.
    Value(JsonValue),
    /// The computor examined its inputs and guarantees its output is
    /// bit-identical to the previously stored value.
    Unchanged,
}

/// The user-supplied function bound to a schema.
///
/// A pure function of `(inputs, previous, bindings)`: `inputs` are ordered
/// as declared on the schema, `previous` is the engine's currently stored
/// value for this node (if any), and `bindings` are the node's own
/// arguments. Returning `Err` aborts the in-flight `pull` without
/// committing any state (spec §6.3, §7).
pub trait Computor: Send {
    /// Compute (or confirm `Unchanged` for) this node's value.
    fn compute(
        &self,
        inputs: &[JsonValue],
        previous: Option<&JsonValue>,
        bindings: &[JsonValue],
    ) -> std::result::Result<ComputorOutput, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> Computor for F
where
    F: Fn(
            &[JsonValue],
            Option<&JsonValue>,
            &[JsonValue],
        ) -> std::result::Result<ComputorOutput, Box<dyn std::error::Error + Send + Sync>>
        + Send,
{
    fn compute(
        &self,
        inputs: &[JsonValue],
        previous: Option<&JsonValue>,
        bindings: &[JsonValue],
    ) -> std::result::Result<ComputorOutput, Box<dyn std::error::Error + Send + Sync>> {
        self(inputs, previous, bindings)
    }
}
