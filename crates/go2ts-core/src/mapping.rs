//! Mapping from Go identifiers to TypeScript primitive tokens
//!
//! The table is closed and total: identifiers it does not know degrade to
//! `any` instead of failing, so partially unsupported input still produces
//! output.

use crate::types::PrimitiveKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TsType {
    Number,
    String,
    Boolean,
    Any,
}

impl TsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TsType::Number => "number",
            TsType::String => "string",
            TsType::Boolean => "boolean",
            TsType::Any => "any",
        }
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a Go type identifier to its TypeScript token
///
/// # Examples
/// ```
/// use go2ts_core::mapping::{map_identifier, TsType};
/// assert_eq!(map_identifier("int64"), TsType::Number);
/// assert_eq!(map_identifier("string"), TsType::String);
/// assert_eq!(map_identifier("bool"), TsType::Boolean);
/// assert_eq!(map_identifier("time.Time"), TsType::Any);
/// ```
pub fn map_identifier(ident: &str) -> TsType {
    PrimitiveKind::from_ident(ident)
        .map(|kind| kind.ts_type())
        .unwrap_or(TsType::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_numeric_kinds() {
        for ident in [
            "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
            "uint64", "uintptr", "float32", "float64", "complex64", "complex128", "byte", "rune",
        ] {
            assert_eq!(map_identifier(ident), TsType::Number, "{}", ident);
        }
    }

    #[test]
    fn test_text_and_bool() {
        assert_eq!(map_identifier("string"), TsType::String);
        assert_eq!(map_identifier("bool"), TsType::Boolean);
    }

    #[test]
    fn test_unknown_is_any() {
        assert_eq!(map_identifier(""), TsType::Any);
        assert_eq!(map_identifier("String"), TsType::Any);
        assert_eq!(map_identifier("error"), TsType::Any);
    }

    proptest! {
        #[test]
        fn prop_mapping_is_total_and_deterministic(ident in "\\PC{0,16}") {
            let first = map_identifier(&ident);
            prop_assert_eq!(first, map_identifier(&ident));
            if PrimitiveKind::from_ident(&ident).is_none() {
                prop_assert_eq!(first, TsType::Any);
            }
        }
    }
}
