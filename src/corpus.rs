//! Corpus loading and sliding-window sequence construction

use std::path::Path;

use log::info;

use crate::error::TinyChatError;
use crate::tokenizer::preprocess;
use crate::utils::io;

/// `train_cycle` context tokens followed by one target token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    tokens: Vec<String>,
}

impl TokenSequence {
    fn new(tokens: &[String]) -> Self {
        Self { tokens: tokens.to_vec() }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Reads the raw corpus file
pub fn read_corpus(path: impl AsRef<Path>) -> Result<String, TinyChatError> {
    let path = path.as_ref();
    io::read_to_string(path).map_err(|source| TinyChatError::CorpusRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and normalizes the corpus into tokens
pub fn load_tokens(path: impl AsRef<Path>) -> Result<Vec<String>, TinyChatError> {
    let text = read_corpus(path)?;
    let tokens = preprocess(&text)?;
    info!("Corpus normalized to {} tokens", tokens.len());
    Ok(tokens)
}

/// Slides a window of `train_cycle + 1` tokens over the stream, one token per
/// step. The window ending at the final token is not produced, so `n` tokens
/// give `n - train_cycle - 1` sequences.
pub fn window(tokens: &[String], train_cycle: usize) -> Result<Vec<TokenSequence>, TinyChatError> {
    let train_length = train_cycle + 1;
    if tokens.len() <= train_length {
        return Err(TinyChatError::EmptyCorpus {
            tokens: tokens.len(),
            required: train_length,
        });
    }

    let sequences: Vec<TokenSequence> = (train_length..tokens.len())
        .map(|end| TokenSequence::new(&tokens[end - train_length..end]))
        .collect();

    info!("Built {} sequences of {} tokens", sequences.len(), train_length);
    Ok(sequences)
}

/// Writes one row per sequence, one column per position
pub fn save_sequences(
    path: impl AsRef<Path>,
    sequences: &[TokenSequence],
) -> Result<(), TinyChatError> {
    let path = path.as_ref();
    let columns = sequences.first().map_or(0, TokenSequence::len);
    let rows = sequences.iter().map(|seq| seq.tokens().iter());
    let written = io::write_table(path, columns, rows).map_err(TinyChatError::persistence)?;
    info!("Wrote {} text sequences to {}", written, path.display());
    Ok(())
}
