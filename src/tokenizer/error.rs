use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("IO error: {0}")]
    Io(#[from] crate::utils::IoError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Id 0 is reserved for padding and never resolves to a token
    #[error("Unknown token id: {0}")]
    UnknownId(usize),
}

impl TokenizerError {
    pub fn serialization(e: impl fmt::Display) -> Self {
        TokenizerError::Serialization(e.to_string())
    }
}
