//! Core intermediate representation and type rules for go2ts

pub mod error;
pub mod export;
pub mod ir;
pub mod mapping;
pub mod tags;
pub mod types;

pub use error::CoreError;
pub use export::{ExportSet, Marker, DEFAULT_MARKER};
pub use ir::{CompilationUnit, Declaration};
pub use mapping::{map_identifier, TsType};
pub use types::{DeclaredType, Field, PrimitiveKind};
