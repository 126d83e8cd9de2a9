// Catalog type vocabulary -> canonical types

use crate::types::CanonicalType;

/// Known catalog spellings, already lower-cased. Unlisted types become `Void`.
const CATALOG_TYPES: &[(&str, CanonicalType)] = &[
    ("integer", CanonicalType::Int),
    ("integer[]", CanonicalType::IntArray),
    ("integer[][]", CanonicalType::IntMatrix),
    ("string", CanonicalType::String),
    ("string[]", CanonicalType::StringArray),
    ("boolean", CanonicalType::Boolean),
];

/// Map a catalog type name to its canonical type. Total: never fails.
pub fn canonicalize(catalog_type: &str) -> CanonicalType {
    let needle = catalog_type.trim().to_lowercase();
    CATALOG_TYPES
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, ty)| *ty)
        .unwrap_or(CanonicalType::Void)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(canonicalize("integer"), CanonicalType::Int);
        assert_eq!(canonicalize("integer[]"), CanonicalType::IntArray);
        assert_eq!(canonicalize("integer[][]"), CanonicalType::IntMatrix);
        assert_eq!(canonicalize("string"), CanonicalType::String);
        assert_eq!(canonicalize("string[]"), CanonicalType::StringArray);
        assert_eq!(canonicalize("boolean"), CanonicalType::Boolean);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(canonicalize("  Integer[][] "), CanonicalType::IntMatrix);
        assert_eq!(canonicalize("BOOLEAN"), CanonicalType::Boolean);
    }

    #[test]
    fn test_unknown_types_fall_back_to_void() {
        for input in ["ListNode", "character[][]", "", "double", "integer[][][]", "void"] {
            assert_eq!(canonicalize(input), CanonicalType::Void, "input {:?}", input);
        }
    }
}
