use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid marker: {0}")]
    InvalidMarker(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
