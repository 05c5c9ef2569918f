//! Declared Go types as a closed algebraic data type

use crate::mapping::TsType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Go's predeclared scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Bool,
    Byte,
    Rune,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 19] = [
        PrimitiveKind::Int,
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Uint,
        PrimitiveKind::Uint8,
        PrimitiveKind::Uint16,
        PrimitiveKind::Uint32,
        PrimitiveKind::Uint64,
        PrimitiveKind::Uintptr,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
        PrimitiveKind::Complex64,
        PrimitiveKind::Complex128,
        PrimitiveKind::String,
        PrimitiveKind::Bool,
        PrimitiveKind::Byte,
        PrimitiveKind::Rune,
    ];

    /// Recognise a predeclared Go type identifier
    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == ident)
    }

    /// The Go spelling of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Uint => "uint",
            PrimitiveKind::Uint8 => "uint8",
            PrimitiveKind::Uint16 => "uint16",
            PrimitiveKind::Uint32 => "uint32",
            PrimitiveKind::Uint64 => "uint64",
            PrimitiveKind::Uintptr => "uintptr",
            PrimitiveKind::Float32 => "float32",
            PrimitiveKind::Float64 => "float64",
            PrimitiveKind::Complex64 => "complex64",
            PrimitiveKind::Complex128 => "complex128",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Rune => "rune",
        }
    }

    /// TypeScript primitive this kind widens to
    pub fn ts_type(&self) -> TsType {
        match self {
            PrimitiveKind::String => TsType::String,
            PrimitiveKind::Bool => TsType::Boolean,
            _ => TsType::Number,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a field or of a type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclaredType {
    /// A predeclared scalar such as `int` or `string`
    Primitive { primitive: PrimitiveKind },

    /// A bare identifier naming another declaration
    NamedReference { name: String },

    /// `[]T` or `[N]T`
    Sequence { element: Box<DeclaredType> },

    /// `map[K]V`
    Mapping {
        key: Box<DeclaredType>,
        value: Box<DeclaredType>,
    },

    /// An inline `struct { ... }`
    AnonymousRecord { fields: Vec<Field> },

    /// Anything the translator does not model: pointers, functions, channels,
    /// interfaces, qualified identifiers, generic instantiations
    Unsupported { description: String },
}

impl DeclaredType {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        DeclaredType::Primitive { primitive: kind }
    }

    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::NamedReference { name: name.into() }
    }

    pub fn sequence(element: DeclaredType) -> Self {
        DeclaredType::Sequence {
            element: Box::new(element),
        }
    }

    pub fn mapping(key: DeclaredType, value: DeclaredType) -> Self {
        DeclaredType::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn record(fields: Vec<Field>) -> Self {
        DeclaredType::AnonymousRecord { fields }
    }

    pub fn unsupported(description: impl Into<String>) -> Self {
        DeclaredType::Unsupported {
            description: description.into(),
        }
    }

    /// Classify a bare identifier as a predeclared scalar or a named reference
    pub fn from_ident(ident: &str) -> Self {
        match PrimitiveKind::from_ident(ident) {
            Some(kind) => DeclaredType::primitive(kind),
            None => DeclaredType::named(ident),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, DeclaredType::AnonymousRecord { .. })
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Primitive { primitive } => write!(f, "{}", primitive),
            DeclaredType::NamedReference { name } => write!(f, "{}", name),
            DeclaredType::Sequence { element } => write!(f, "[]{}", element),
            DeclaredType::Mapping { key, value } => write!(f, "map[{}]{}", key, value),
            DeclaredType::AnonymousRecord { fields } => {
                write!(f, "struct {{ {} fields }}", fields.len())
            }
            DeclaredType::Unsupported { description } => write!(f, "{}", description),
        }
    }
}

/// A struct field
///
/// `name` is `None` for embedded fields. Fields declared together
/// (`X, Y int`) are stored as separate entries sharing type and tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<String>,
    pub ty: DeclaredType,
    /// Raw tag literal, quotes included
    pub tag: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            tag: None,
        }
    }

    pub fn embedded(ty: DeclaredType) -> Self {
        Self {
            name: None,
            ty,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}
