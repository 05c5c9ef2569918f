//! Error types for code generation

use crate::diagnostics::Diagnostics;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Translation produced diagnostics ({count} total):\n{summary}")]
    Diagnostics { count: usize, summary: String },
}

impl From<Diagnostics> for CodegenError {
    fn from(diagnostics: Diagnostics) -> Self {
        CodegenError::Diagnostics {
            count: diagnostics.count(),
            summary: diagnostics.format_summary(),
        }
    }
}
