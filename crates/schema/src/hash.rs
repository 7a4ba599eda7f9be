//! [`SchemaHash`]: the deterministic fingerprint that namespaces all
//! storage for one compiled schema list.

use std::fmt;

use sha2::{Digest, Sha256};

/// A stable hash over a normalized schema list (spec §4.1, §3.1).
///
/// Two engines whose schemas are semantically identical — same output and
/// input templates, regardless of declaration order — compute the same
/// `SchemaHash` and therefore share one storage namespace; any template
/// difference produces a different hash and an isolated namespace
/// (invariant I7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaHash([u8; 32]);

impl SchemaHash {
    /// Hash the canonical text of each `(output, inputs)` pair, already
    /// sorted into a fixed order by the caller.
    pub(crate) fn compute(canonical_schemas: &[String]) -> Self {
        let mut hasher = Sha256::new();
        for entry in canonical_schemas {
            hasher.update(entry.as_bytes());
            hasher.update([0u8]); // separator, so "ab"+"c" != "a"+"bc"
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        SchemaHash(bytes)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding, used as the storage key prefix for this
    /// schema's five views (spec §6.2).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_entries_same_hash_regardless_of_input_order() {
        let a = SchemaHash::compute(&["f(x)|g(x)".to_string(), "g()|".to_string()]);
        let b = SchemaHash::compute(&["f(x)|g(x)".to_string(), "g()|".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_entries_different_hash() {
        let a = SchemaHash::compute(&["f(x)|g(x)".to_string()]);
        let b = SchemaHash::compute(&["f(x)|h(x)".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn to_hex_is_64_chars() {
        let h = SchemaHash::compute(&["a".to_string()]);
        assert_eq!(h.to_hex().len(), 64);
    }
}
