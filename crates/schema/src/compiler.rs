//! Schema compilation: validate a user-supplied schema list and produce an
//! immutable [`CompiledGraph`], plus [`resolve`] for translating a node key
//! back into a schema and bindings (spec §4.1, §4.2).

use std::collections::{HashMap, HashSet};

use ripplegraph_core::{Bindings, NodeKey};

use crate::computor::{Computor, Schema};
use crate::error::{Result, SchemaError};
use crate::hash::SchemaHash;
use crate::name_template::{parse_head_and_parts, NameTemplate};

/// One schema after its templates have been parsed and validated.
pub struct CompiledSchema {
    /// The parsed output template.
    pub output: NameTemplate,
    /// The parsed input templates, in declaration order.
    pub inputs: Vec<NameTemplate>,
    /// The user-supplied computor.
    pub computor: Box<dyn Computor>,
    /// Carried through unchanged from [`Schema`]; not enforced by the engine.
    pub is_deterministic: bool,
    /// Carried through unchanged from [`Schema`]; not enforced by the engine.
    pub has_side_effects: bool,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .field("is_deterministic", &self.is_deterministic)
            .field("has_side_effects", &self.has_side_effects)
            .finish()
    }
}

/// An immutable, validated schema graph, produced once at engine
/// construction (spec §3.3: "supplied at construction; immutable").
#[derive(Debug)]
pub struct CompiledGraph {
    schemas: Vec<CompiledSchema>,
    hash: SchemaHash,
}

impl CompiledGraph {
    /// The compiled schemas, in the order they were declared to [`compile`].
    pub fn schemas(&self) -> &[CompiledSchema] {
        &self.schemas
    }

    /// One compiled schema by index.
    pub fn schema(&self, index: usize) -> &CompiledSchema {
        &self.schemas[index]
    }

    /// The deterministic fingerprint of this compiled graph.
    pub fn schema_hash(&self) -> SchemaHash {
        self.hash
    }

    /// Index of the schema whose output has this exact `(head, arity)`, if
    /// any. Guaranteed unique by the overlap check performed in [`compile`].
    pub fn find_by_head_arity(&self, head: &str, arity: usize) -> Option<usize> {
        self.schemas
            .iter()
            .position(|s| s.output.head() == head && s.output.arity() == arity)
    }
}

/// A node key resolved against a [`CompiledGraph`]: which schema owns it,
/// under which bindings, and its canonical textual form.
pub struct ResolvedNode {
    /// Index into [`CompiledGraph::schemas`] of the owning schema.
    pub schema_index: usize,
    /// The bindings aligned to the schema's free variables.
    pub bindings: Bindings,
    /// The canonical node key (spec §4.2: canonicalization happens here
    /// even when the caller's text was not already canonical, scenario 7).
    pub canonical_key: NodeKey,
}

/// Validate `schemas` and compile them into an immutable [`CompiledGraph`].
///
/// Fails with [`SchemaError::Overlap`] if two schemas share an output head
/// and arity, [`SchemaError::Cycle`] if the output-dependency graph has a
/// cycle, or [`SchemaError::Shape`] if an input template references a free
/// variable its schema's output does not declare (or a schema's own input
/// templates use one head at incompatible arities).
pub fn compile(schemas: Vec<Schema>) -> Result<CompiledGraph> {
    let mut compiled = Vec::with_capacity(schemas.len());
    for schema in schemas {
        let output = NameTemplate::parse(&schema.output)?;
        let inputs = schema
            .inputs
            .iter()
            .map(|s| NameTemplate::parse(s))
            .collect::<Result<Vec<_>>>()?;
        compiled.push(CompiledSchema {
            output,
            inputs,
            computor: schema.computor,
            is_deterministic: schema.is_deterministic,
            has_side_effects: schema.has_side_effects,
        });
    }

    check_overlap(&compiled)?;
    check_shape(&compiled)?;
    check_cycles(&compiled)?;

    let hash = compute_hash(&compiled);
    Ok(CompiledGraph {
        schemas: compiled,
        hash,
    })
}

fn check_overlap(schemas: &[CompiledSchema]) -> Result<()> {
    let mut seen: HashMap<(&str, usize), ()> = HashMap::new();
    for schema in schemas {
        let key = (schema.output.head(), schema.output.arity());
        if seen.insert(key, ()).is_some() {
            return Err(SchemaError::Overlap {
                head: schema.output.head().to_string(),
                arity: schema.output.arity(),
            });
        }
    }
    Ok(())
}

fn check_shape(schemas: &[CompiledSchema]) -> Result<()> {
    for schema in schemas {
        let output_vars: HashSet<&str> =
            schema.output.free_vars().iter().map(String::as_str).collect();

        let mut input_arity_by_head: HashMap<&str, usize> = HashMap::new();
        for input in &schema.inputs {
            for var in input.free_vars() {
                if !output_vars.contains(var.as_str()) {
                    return Err(SchemaError::Shape {
                        reason: format!(
                            "input template {:?} of schema {:?} references free variable {:?} \
                             not declared by its output",
                            input.canonical_text(),
                            schema.output.canonical_text(),
                            var
                        ),
                    });
                }
            }
            if let Some(&prior_arity) = input_arity_by_head.get(input.head()) {
                if prior_arity != input.arity() {
                    return Err(SchemaError::Shape {
                        reason: format!(
                            "schema {:?} has two input templates headed {:?} with \
                             incompatible arities {} and {}",
                            schema.output.canonical_text(),
                            input.head(),
                            prior_arity,
                            input.arity()
                        ),
                    });
                }
            } else {
                input_arity_by_head.insert(input.head(), input.arity());
            }
        }
    }
    Ok(())
}

fn check_cycles(schemas: &[CompiledSchema]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color = vec![Color::White; schemas.len()];
    let mut stack: Vec<usize> = Vec::new();

    fn edges<'a>(schemas: &'a [CompiledSchema], from: usize) -> impl Iterator<Item = usize> + 'a {
        schemas[from].inputs.iter().flat_map(move |input| {
            schemas
                .iter()
                .enumerate()
                .filter(move |(_, s)| s.output.head() == input.head())
                .map(|(i, _)| i)
        })
    }

    fn visit(
        schemas: &[CompiledSchema],
        node: usize,
        color: &mut [Color],
        stack: &mut Vec<usize>,
    ) -> Result<()> {
        color[node] = Color::Gray;
        stack.push(node);
        for next in edges(schemas, node) {
            match color[next] {
                Color::White => visit(schemas, next, color, stack)?,
                Color::Gray => {
                    let start = stack
                        .iter()
                        .position(|&n| n == next)
                        .expect("a Gray node is always on the active DFS stack");
                    let mut cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|&i| schemas[i].output.head().to_string())
                        .collect();
                    cycle.push(schemas[next].output.head().to_string());
                    return Err(SchemaError::Cycle { cycle });
                }
                Color::Black => {}
            }
        }
        stack.pop();
        color[node] = Color::Black;
        Ok(())
    }

    for start in 0..schemas.len() {
        if color[start] == Color::White {
            visit(schemas, start, &mut color, &mut stack)?;
        }
    }
    Ok(())
}

fn compute_hash(schemas: &[CompiledSchema]) -> SchemaHash {
    let mut entries: Vec<String> = schemas
        .iter()
        .map(|s| {
            let inputs = s
                .inputs
                .iter()
                .map(NameTemplate::canonical_text)
                .collect::<Vec<_>>()
                .join(",");
            format!("{}|{}", s.output.canonical_text(), inputs)
        })
        .collect();
    entries.sort();
    SchemaHash::compute(&entries)
}

/// Resolve `node_key_text` against `compiled`, returning the owning
/// schema, its bindings, and the canonical node key.
///
/// If `explicit_bindings` is non-empty it is used directly, positionally;
/// this is the path `Engine::pull`'s `bindings` parameter takes, and the
/// text inside `node_key_text`'s parentheses (if any) is read only for its
/// head and arity, not parsed as argument values (spec §4.4.5, §8 scenario
/// 8: `pull("derived(x)", [binding])`). Otherwise, any parenthesized
/// arguments in `node_key_text` are parsed as literal JSON to derive the
/// bindings (spec §8 scenario 7: `pull("derived(\"data\")")`).
pub fn resolve(
    node_key_text: &str,
    compiled: &CompiledGraph,
    explicit_bindings: &Bindings,
) -> Result<ResolvedNode> {
    let (head, raw_args) = parse_head_and_parts(node_key_text)?;

    let bindings = if !explicit_bindings.is_empty() {
        explicit_bindings.clone()
    } else if raw_args.is_empty() {
        Bindings::empty()
    } else {
        let mut values = Vec::with_capacity(raw_args.len());
        for raw in &raw_args {
            let value = serde_json::from_str(raw).map_err(|e| SchemaError::Shape {
                reason: format!("argument {raw:?} is not valid JSON: {e}"),
            })?;
            values.push(value);
        }
        Bindings::from(values)
    };

    let arity = bindings.len();
    let schema_index = compiled
        .find_by_head_arity(&head, arity)
        .ok_or(SchemaError::UnknownSchema { head, arity })?;

    let canonical_key = compiled.schema(schema_index).output.instantiate(&bindings)?;

    Ok(ResolvedNode {
        schema_index,
        bindings,
        canonical_key,
    })
}

/// Resolve the `input_index`-th input template of `schema_index`'s schema
/// into a concrete dependency node, given the parent's own `bindings`
/// (spec §4.4.5: "the bindings for a dependency are derived by
/// substituting the parent's bindings into the input template").
///
/// Free variables in the input template are necessarily a subset of the
/// output template's free variables (enforced by [`compile`]'s shape
/// check), so each one resolves to the parent binding at the matching
/// position.
pub fn resolve_dependency(
    compiled: &CompiledGraph,
    schema_index: usize,
    input_index: usize,
    bindings: &Bindings,
) -> Result<ResolvedNode> {
    let schema = compiled.schema(schema_index);
    let input = &schema.inputs[input_index];
    let dep_bindings = project_bindings(&schema.output, input, bindings);
    let dep_key = input.instantiate(&dep_bindings)?;
    let dep_index = compiled
        .find_by_head_arity(input.head(), input.arity())
        .ok_or_else(|| SchemaError::UnknownSchema {
            head: input.head().to_string(),
            arity: input.arity(),
        })?;
    Ok(ResolvedNode {
        schema_index: dep_index,
        bindings: dep_bindings,
        canonical_key: dep_key,
    })
}

fn project_bindings(output: &NameTemplate, input: &NameTemplate, bindings: &Bindings) -> Bindings {
    let values = input
        .free_vars()
        .iter()
        .map(|var| {
            let idx = output
                .free_vars()
                .iter()
                .position(|v| v == var)
                .expect("shape check guarantees input free vars are a subset of output's");
            bindings.as_slice()[idx].clone()
        })
        .collect::<Vec<_>>();
    Bindings::from(values)
}
