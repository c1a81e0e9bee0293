//! Next-token model capability and its feed-forward implementation

mod config;
mod error;
mod layers;
mod window;

pub use config::ModelConfig;
pub use error::ModelError;
pub use layers::{Embedding, Linear, LinearGradients};
pub use window::WindowModel;

use ndarray::ArrayView2;

use crate::training::TrainingHistory;

/// What the pipeline needs from a trainable model.
///
/// Ids are vocabulary ids with 0 reserved for padding. Implementations must
/// be deterministic: the same state and context give the same prediction.
pub trait NextTokenModel {
    /// Number of ids `predict_next` expects
    fn context_len(&self) -> usize;

    /// Number of output classes, padding included
    fn vocab_size(&self) -> usize;

    /// Trains on `x` = `[examples, context_len]` ids and one-hot
    /// `y` = `[examples, vocab_size]` for the configured number of epochs.
    fn fit(&mut self, x: ArrayView2<usize>, y: ArrayView2<f32>) -> Result<TrainingHistory, ModelError>;

    /// Arg-max next id for a context of exactly `context_len` ids
    fn predict_next(&self, context: &[usize]) -> Result<usize, ModelError>;
}
