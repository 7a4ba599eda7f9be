//! [`NameTemplate`]: the parsed form of a schema's `"head(x, y)"` string,
//! and the `instantiate`/split-args machinery that turns one into a
//! [`NodeKey`] given concrete bindings.

use ripplegraph_core::{canonical_json, Bindings, NodeKey};

use crate::error::{Result, SchemaError};

/// A parsed `"head(x, y)"`-style template: a head identifier plus an
/// ordered list of free-variable names. Zero free variables is a ground
/// (unparameterized) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    head: String,
    free_vars: Vec<String>,
}

impl NameTemplate {
    /// Parse `text` (e.g. `"f(x, y)"` or a ground name like `"input1"`).
    pub fn parse(text: &str) -> Result<Self> {
        let (head, free_vars) = parse_head_and_parts(text)?;
        Ok(NameTemplate { head, free_vars })
    }

    /// The head identifier.
    pub fn head(&self) -> &str {
        &self.head
    }

    /// The free-variable names, in declaration order.
    pub fn free_vars(&self) -> &[String] {
        &self.free_vars
    }

    /// Number of free variables (the template's arity).
    pub fn arity(&self) -> usize {
        self.free_vars.len()
    }

    /// True if this template has no free variables.
    pub fn is_ground(&self) -> bool {
        self.free_vars.is_empty()
    }

    /// Build the canonical [`NodeKey`] for this template under `bindings`.
    ///
    /// Ground templates return the head verbatim. Arguments are rendered
    /// with [`canonical_json`] and joined with commas, no surrounding
    /// whitespace, so two references to the same `(template, bindings)`
    /// pair always produce byte-identical keys (invariant I1).
    pub fn instantiate(&self, bindings: &Bindings) -> Result<NodeKey> {
        if self.is_ground() {
            return Ok(NodeKey::new_canonical(self.head.clone()));
        }
        if bindings.len() != self.free_vars.len() {
            return Err(SchemaError::Shape {
                reason: format!(
                    "template {:?} expects {} argument(s), got {}",
                    self.head,
                    self.free_vars.len(),
                    bindings.len()
                ),
            });
        }
        let mut args = Vec::with_capacity(bindings.len());
        for value in bindings.as_slice() {
            let rendered = canonical_json(value)
                .map_err(|e| SchemaError::Shape { reason: e.to_string() })?;
            args.push(rendered);
        }
        Ok(NodeKey::new_canonical(format!(
            "{}({})",
            self.head,
            args.join(",")
        )))
    }

    /// The canonical textual form of this template itself (not an
    /// instance), used to order schemas deterministically for hashing.
    pub fn canonical_text(&self) -> String {
        if self.is_ground() {
            self.head.clone()
        } else {
            format!("{}({})", self.head, self.free_vars.join(","))
        }
    }
}

/// Split `text` into a head identifier and its parenthesized parts, shared
/// between [`NameTemplate::parse`] (parts are free-variable names) and node
/// key resolution (parts are raw argument text, which may be literal JSON).
///
/// A bare identifier with no parentheses parses as a ground (zero-part)
/// name.
pub(crate) fn parse_head_and_parts(text: &str) -> Result<(String, Vec<String>)> {
    let trimmed = text.trim();
    let Some(open) = trimmed.find('(') else {
        if trimmed.is_empty() || trimmed.contains(')') {
            return Err(SchemaError::MalformedTemplate(text.to_string()));
        }
        return Ok((trimmed.to_string(), Vec::new()));
    };
    if !trimmed.ends_with(')') {
        return Err(SchemaError::MalformedTemplate(text.to_string()));
    }
    let head = trimmed[..open].trim();
    if head.is_empty() {
        return Err(SchemaError::MalformedTemplate(text.to_string()));
    }
    let inner = &trimmed[open + 1..trimmed.len() - 1];
    let parts = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner)
            .into_iter()
            .map(|part| part.trim().to_string())
            .collect::<Vec<_>>()
    };
    for part in &parts {
        if part.is_empty() {
            return Err(SchemaError::MalformedTemplate(text.to_string()));
        }
    }
    Ok((head.to_string(), parts))
}

/// Split `s` on top-level commas, respecting JSON string quoting and
/// bracket/brace/paren nesting so e.g. `"x, [1,2]"` splits into two parts,
/// not three.
pub(crate) fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut current = String::new();

    for ch in s.chars() {
        if in_string {
            current.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ground_name() {
        let t = NameTemplate::parse("input1").unwrap();
        assert_eq!(t.head(), "input1");
        assert!(t.is_ground());
    }

    #[test]
    fn parses_free_variables() {
        let t = NameTemplate::parse("f(x, y)").unwrap();
        assert_eq!(t.head(), "f");
        assert_eq!(t.free_vars(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(NameTemplate::parse("f(x").is_err());
        assert!(NameTemplate::parse("f)x(").is_err());
    }

    #[test]
    fn instantiate_collapses_whitespace_and_canonicalizes() {
        let t = NameTemplate::parse("derived(x)").unwrap();
        let key = t.instantiate(&Bindings::from(vec![json!("data")])).unwrap();
        assert_eq!(key.as_str(), r#"derived("data")"#);
    }

    #[test]
    fn instantiate_ground_ignores_bindings() {
        let t = NameTemplate::parse("input1").unwrap();
        let key = t.instantiate(&Bindings::empty()).unwrap();
        assert_eq!(key.as_str(), "input1");
    }

    #[test]
    fn split_top_level_respects_nesting() {
        let parts = split_top_level(r#"x, [1,2], {"a":1,"b":2}"#);
        assert_eq!(parts.len(), 3);
    }
}
