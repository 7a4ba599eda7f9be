//! Error vocabulary for name-template parsing, graph compilation, and
//! per-schema storage.

use thiserror::Error;

/// Result alias for fallible schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while compiling a schema list, resolving a node key
/// against an already-compiled graph, or reading/writing per-schema
/// storage.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A lower-layer storage operation failed.
    #[error(transparent)]
    Store(#[from] ripplegraph_storage::StoreError),

    /// A `"head(x, y)"`-style template string did not parse.
    #[error("malformed name template {0:?}")]
    MalformedTemplate(String),

    /// Two schemas declared outputs with the same head and the same free
    /// variable arity, so a node with that head would have an ambiguous
    /// computor (spec §4.1).
    #[error("schema overlap: two schemas both declare output head {head:?} with arity {arity}")]
    Overlap {
        /// The shared head identifier.
        head: String,
        /// The shared free-variable arity.
        arity: usize,
    },

    /// The output-dependency graph induced by schema input templates
    /// contains a cycle (spec §4.1).
    #[error("schema cycle detected: {}", .cycle.join(" -> "))]
    Cycle {
        /// The cycle, as a sequence of output heads, first repeated at the end.
        cycle: Vec<String>,
    },

    /// An input template references a free variable the output template
    /// does not declare, or two input templates bind the same free
    /// variable at incompatible positions.
    #[error("schema shape error: {reason}")]
    Shape {
        /// Human-readable description of the malformed shape.
        reason: String,
    },

    /// A node key's head and argument count matched no compiled schema.
    #[error("no schema matches head {head:?} with arity {arity}")]
    UnknownSchema {
        /// The head identifier that was looked up.
        head: String,
        /// The number of arguments supplied.
        arity: usize,
    },
}
