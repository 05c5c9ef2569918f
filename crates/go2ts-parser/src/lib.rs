//! Go source parsing for go2ts
//!
//! Only what the translator needs is modelled: the package clause and
//! `type` declarations with their doc comments. Imports, constants,
//! variables and functions are lexed and skipped.

pub mod error;
pub mod go;
pub mod lexer;
pub mod package;

use go2ts_core::CompilationUnit;

pub use error::ParserError;
pub use go::GoParser;
pub use package::{load_dir, Package};

/// Common trait for source parsers
pub trait Parser {
    type Input: ?Sized;

    fn parse(&self, input: &Self::Input) -> Result<CompilationUnit, ParserError>;
}
