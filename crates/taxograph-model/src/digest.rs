//! Deterministic identifiers for generated blank nodes.
//!
//! Statement tables must be byte-identical across runs over the same inputs,
//! so blank-node ids are derived from the content they annotate rather than
//! drawn at random. We use **FNV-1a 64-bit**:
//!
//! - input: the component strings, each followed by a `0x1f` separator so
//!   `("ab", "c")` and `("a", "bc")` hash differently
//! - output: `"_:b<16 lowercase hex digits>"`
//!
//! This is not a security primitive. Uniqueness within one table comes from
//! callers including the owning node id and an ordinal in the components.

/// Prefix of every blank-node id in a statement table.
pub const BLANK_NODE_PREFIX: &str = "_:";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;
const COMPONENT_SEPARATOR: u8 = 0x1f;

/// FNV-1a 64-bit over arbitrary bytes.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Blank-node id for a reified annotation, derived from its components.
pub fn blank_node_id(components: &[&str]) -> String {
    let mut bytes = Vec::with_capacity(components.iter().map(|c| c.len() + 1).sum());
    for component in components {
        bytes.extend_from_slice(component.as_bytes());
        bytes.push(COMPONENT_SEPARATOR);
    }
    format!("{BLANK_NODE_PREFIX}b{:016x}", fnv1a64(&bytes))
}

/// Whether `term` is written in blank-node form.
pub fn is_blank_node(term: &str) -> bool {
    term.starts_with(BLANK_NODE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_has_expected_prefix_and_width() {
        let id = blank_node_id(&["562", "0", "E. coli"]);
        assert!(id.starts_with("_:b"));
        assert_eq!(id.len(), "_:b".len() + 16);
        assert!(is_blank_node(&id));
    }

    #[test]
    fn blank_id_is_stable_and_separates_components() {
        assert_eq!(blank_node_id(&["a", "b"]), blank_node_id(&["a", "b"]));
        assert_ne!(blank_node_id(&["ab", "c"]), blank_node_id(&["a", "bc"]));
    }

    #[test]
    fn fnv_matches_reference_vector() {
        // FNV-1a 64 of the empty input is the offset basis.
        assert_eq!(fnv1a64(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn blank_id_hashes_separated_components() {
        let expected = format!("_:b{:016x}", fnv1a64(b"562\x1f0\x1f"));
        assert_eq!(blank_node_id(&["562", "0"]), expected);
    }
}
