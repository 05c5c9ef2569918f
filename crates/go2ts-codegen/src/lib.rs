//! Code generation from go2ts compilation units

pub mod diagnostics;
pub mod error;
pub mod typescript;

use go2ts_core::CompilationUnit;

pub use diagnostics::{Diagnostic, DiagnosticCategory, Diagnostics, Location};
pub use error::CodegenError;
pub use typescript::{
    resolve_type, translate_struct, translate_unit, GeneratedDefinition, Translation,
    TypeScriptCodegen,
};

/// Common trait for all code generators
pub trait Codegen {
    fn generate(&mut self, unit: &CompilationUnit) -> Result<String, CodegenError>;
}
