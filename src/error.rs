// error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::model::ModelError;
use crate::tokenizer::TokenizerError;
use crate::utils::IoError;

#[derive(Error, Debug)]
pub enum TinyChatError {
    #[error("Cannot read corpus {path}: {source}")]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Corpus too short: {tokens} tokens, need more than {required} to form a sequence")]
    EmptyCorpus { tokens: usize, required: usize },

    #[error("Unknown token id: {0}")]
    UnknownId(usize),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(TokenizerError),
}

impl From<TokenizerError> for TinyChatError {
    fn from(e: TokenizerError) -> Self {
        match e {
            TokenizerError::UnknownId(id) => TinyChatError::UnknownId(id),
            other => TinyChatError::Tokenizer(other),
        }
    }
}

impl TinyChatError {
    pub fn persistence(e: impl std::fmt::Display) -> Self {
        TinyChatError::Persistence(e.to_string())
    }
}
