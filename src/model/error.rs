use thiserror::Error;

use crate::utils::{IoError, MathError};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Token id {id} outside model vocabulary of {vocab_size}")]
    InvalidTokenId { id: usize, vocab_size: usize },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),
}
