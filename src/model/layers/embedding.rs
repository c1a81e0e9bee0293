use super::super::error::ModelError;
use ndarray::{s, Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Serialize, Deserialize};

/// Token embedding layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub weight: Array2<f32>, // Shape: [vocab_size, embed_dim]
}

impl Embedding {
    pub fn new(vocab_size: usize, embed_dim: usize, rng: &mut impl Rng) -> Result<Self, ModelError> {
        let normal = Normal::new(0.0, 0.02).map_err(|e| {
            ModelError::InitializationError(e.to_string())
        })?;

        Ok(Self {
            weight: Array2::from_shape_fn((vocab_size, embed_dim), |_| {
                normal.sample(&mut *rng)
            }),
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.weight.nrows()
    }

    pub fn embed_dim(&self) -> usize {
        self.weight.ncols()
    }

    /// Forward pass: input shape = [batch_size, seq_len], output = [batch_size, seq_len * embed_dim]
    /// with the embeddings of one row laid out position after position.
    /// Ids must be below `vocab_size`.
    pub fn forward(&self, indices: ArrayView2<usize>) -> Array2<f32> {
        let (batch_size, seq_len) = indices.dim();
        let embed_dim = self.embed_dim();

        let mut output = Array2::zeros((batch_size, seq_len * embed_dim));

        for ((b, t), &token_id) in indices.indexed_iter() {
            let embedding = self.weight.row(token_id);
            output
                .slice_mut(s![b, t * embed_dim..(t + 1) * embed_dim])
                .assign(&embedding);
        }

        output
    }

    /// Backward pass: gradient of the weights given the gradient of the flattened output.
    /// Rows of ids that appear several times accumulate.
    pub fn backward(&self, indices: ArrayView2<usize>, grad_output: ArrayView2<f32>) -> Array2<f32> {
        let embed_dim = self.embed_dim();
        let mut grad = Array2::zeros(self.weight.dim());

        for ((b, t), &token_id) in indices.indexed_iter() {
            let g = grad_output.slice(s![b, t * embed_dim..(t + 1) * embed_dim]);
            let mut row = grad.row_mut(token_id);
            row += &g;
        }

        grad
    }
}
