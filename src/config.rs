use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TinyChatError;
use crate::model::ModelConfig;
use crate::utils::io;

/// Settings for one pipeline run, built once at startup and passed to each stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub train_cycle: usize,      // Context tokens per training sequence
    pub seq_len: usize,          // Context ids fed to the model while generating
    pub multiplier: usize,       // Hidden width = seq_len * multiplier
    pub num_epochs: usize,
    pub num_gen_words: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub seed: u64,               // Seed text pick
    pub init_seed: u64,          // Weight init and batch shuffling

    pub chats_processed_txt: PathBuf,
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub text_sequences: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            train_cycle: 15,
            seq_len: 15,
            multiplier: 2,
            num_epochs: 100,
            num_gen_words: 25,
            batch_size: 128,
            learning_rate: 0.001,
            seed: 101,
            init_seed: 42,
            chats_processed_txt: PathBuf::from("data/chats_processed.txt"),
            model_path: PathBuf::from("artifacts/model.bin"),
            tokenizer_path: PathBuf::from("artifacts/tokenizer.json"),
            text_sequences: PathBuf::from("artifacts/text_sequences.csv"),
        }
    }
}

impl Config {
    /// Reads a JSON config; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TinyChatError> {
        let path = path.as_ref();
        let config: Self = io::read_json(path)
            .map_err(|e| TinyChatError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TinyChatError> {
        for (name, value) in [
            ("train_cycle", self.train_cycle),
            ("seq_len", self.seq_len),
            ("multiplier", self.multiplier),
            ("batch_size", self.batch_size),
        ] {
            if value == 0 {
                return Err(TinyChatError::Config(format!("{} must be positive", name)));
            }
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TinyChatError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        // The model's input width is fixed by the training windows
        if self.seq_len != self.train_cycle {
            return Err(TinyChatError::Config(format!(
                "seq_len ({}) must equal train_cycle ({})",
                self.seq_len, self.train_cycle
            )));
        }
        Ok(())
    }

    /// Model shape for a vocabulary of `vocab_size` classes (padding included).
    /// The embedding width follows the context length.
    pub fn model_config(&self, vocab_size: usize) -> ModelConfig {
        ModelConfig {
            vocab_size,
            context_len: self.train_cycle,
            embed_dim: self.seq_len,
            hidden_dim: self.seq_len * self.multiplier,
            learning_rate: self.learning_rate,
            batch_size: self.batch_size,
            epochs: self.num_epochs,
            seed: self.init_seed,
        }
    }
}
