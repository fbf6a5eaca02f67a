//! Error types for the duel engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("Card not found in catalog: {0}")]
    CardNotFound(String),

    #[error("Invalid catalog format: {0}")]
    InvalidCatalog(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Replay diverged from the recorded log at sequence {sequence}")]
    ReplayDivergence { sequence: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DuelError {
    fn from(err: serde_json::Error) -> Self {
        DuelError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
