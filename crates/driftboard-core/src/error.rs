//! Error types for the fallible edges of the core (persistence and config).

use thiserror::Error;

/// Board errors.
///
/// Core board, index and history operations never fail; only the opaque
/// persistence hooks and configuration loading surface errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Serialization(err.to_string())
    }
}

/// Result type for board operations that can fail.
pub type BoardResult<T> = Result<T, BoardError>;
