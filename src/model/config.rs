use serde::{Serialize, Deserialize};

use super::error::ModelError;

/// Configuration for the next-token model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    // --- Architecture ---
    pub vocab_size: usize,   // Output classes, padding id included
    pub context_len: usize,  // Ids per prediction
    pub embed_dim: usize,    // Width of one token embedding
    pub hidden_dim: usize,   // Width of the ReLU layer

    // --- Training ---
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub epochs: usize,
    #[serde(default)]
    pub seed: u64,           // Weight init and batch shuffling
}

fn default_learning_rate() -> f32 { 0.001 }
fn default_batch_size() -> usize { 128 }

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.vocab_size < 2 {
            return Err(ModelError::ConfigError(format!(
                "vocab_size must cover padding and at least one token, got {}",
                self.vocab_size
            )));
        }
        for (name, value) in [
            ("context_len", self.context_len),
            ("embed_dim", self.embed_dim),
            ("hidden_dim", self.hidden_dim),
            ("batch_size", self.batch_size),
        ] {
            if value == 0 {
                return Err(ModelError::ConfigError(format!("{} must be positive", name)));
            }
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ModelError::ConfigError(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
