use std::path::Path;

use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{Embedding, Linear, ModelConfig, ModelError, NextTokenModel};
use crate::tokenizer::PAD_ID;
use crate::training::{Adam, AdamState, BatchIterator, EpochMetrics, TrainingHistory};
use crate::utils::{self, io};

/// Cache for storing intermediate values during forward pass
#[derive(Debug)]
struct ForwardCache {
    embedded: Array2<f32>,  // [batch, context_len * embed_dim]
    hidden_pre: Array2<f32>,
    hidden: Array2<f32>,    // after ReLU
    probs: Array2<f32>,     // after softmax
}

struct Gradients {
    embedding: Array2<f32>,
    hidden_weight: Array2<f32>,
    hidden_bias: Array2<f32>,
    output_weight: Array2<f32>,
    output_bias: Array2<f32>,
}

/// Adam moments for every parameter matrix of a [`WindowModel`]
struct OptimizerState {
    adam: Adam,
    embedding: AdamState,
    hidden_weight: AdamState,
    hidden_bias: AdamState,
    output_weight: AdamState,
    output_bias: AdamState,
}

impl OptimizerState {
    fn new(model: &WindowModel) -> Self {
        Self {
            adam: Adam::new(model.config.learning_rate),
            embedding: AdamState::new(model.embedding.weight.dim()),
            hidden_weight: AdamState::new(model.hidden.weight.dim()),
            hidden_bias: AdamState::new(model.hidden.bias.dim()),
            output_weight: AdamState::new(model.output.weight.dim()),
            output_bias: AdamState::new(model.output.bias.dim()),
        }
    }
}

/// Fixed-window next-token model.
///
/// The context ids are embedded, concatenated, passed through one ReLU layer
/// and projected to a softmax over the vocabulary (padding included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowModel {
    config: ModelConfig,
    embedding: Embedding,
    hidden: Linear,
    output: Linear,
}

impl WindowModel {
    /// Creates a new model with seeded, initialized weights
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let embedding = Embedding::new(config.vocab_size, config.embed_dim, &mut rng)?;
        let hidden = Linear::new(config.context_len * config.embed_dim, config.hidden_dim, &mut rng)?;
        let output = Linear::new(config.hidden_dim, config.vocab_size, &mut rng)?;

        let model = Self { config, embedding, hidden, output };
        model.log_summary();
        Ok(model)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn num_parameters(&self) -> usize {
        self.embedding.weight.len() + self.hidden.num_parameters() + self.output.num_parameters()
    }

    fn log_summary(&self) {
        info!(
            "embedding: {} x {} ({} params)",
            self.embedding.vocab_size(),
            self.embedding.embed_dim(),
            self.embedding.weight.len()
        );
        info!(
            "hidden (relu): {} -> {} ({} params)",
            self.hidden.input_dim(),
            self.hidden.output_dim(),
            self.hidden.num_parameters()
        );
        info!(
            "output (softmax): {} -> {} ({} params)",
            self.output.input_dim(),
            self.output.output_dim(),
            self.output.num_parameters()
        );
        info!("total params: {}", self.num_parameters());
    }

    fn check_ids(&self, ids: ArrayView2<usize>) -> Result<(), ModelError> {
        if ids.ncols() != self.config.context_len {
            return Err(ModelError::DimensionMismatch(format!(
                "expected contexts of {} ids, got {}",
                self.config.context_len,
                ids.ncols()
            )));
        }
        match ids.iter().find(|&&id| id >= self.config.vocab_size) {
            Some(&id) => Err(ModelError::InvalidTokenId { id, vocab_size: self.config.vocab_size }),
            None => Ok(()),
        }
    }

    fn forward(&self, ids: ArrayView2<usize>) -> ForwardCache {
        let embedded = self.embedding.forward(ids);
        let hidden_pre = self.hidden.forward(embedded.view());
        let hidden = hidden_pre.mapv(|z| z.max(0.0));
        let logits = self.output.forward(hidden.view());
        let probs = utils::softmax_rows(logits.view());

        ForwardCache { embedded, hidden_pre, hidden, probs }
    }

    fn backward(
        &self,
        ids: ArrayView2<usize>,
        cache: &ForwardCache,
        targets: ArrayView2<f32>,
    ) -> Result<Gradients, ModelError> {
        let d_logits = utils::d_categorical_cross_entropy(cache.probs.view(), targets)?;

        let (d_hidden, output_grads) = self.output.backward(cache.hidden.view(), d_logits.view());
        let relu_mask = cache.hidden_pre.mapv(|z| if z > 0.0 { 1.0 } else { 0.0 });
        let d_hidden_pre = d_hidden * &relu_mask;

        let (d_embedded, hidden_grads) = self.hidden.backward(cache.embedded.view(), d_hidden_pre.view());
        let embedding = self.embedding.backward(ids, d_embedded.view());

        Ok(Gradients {
            embedding,
            hidden_weight: hidden_grads.weight,
            hidden_bias: hidden_grads.bias,
            output_weight: output_grads.weight,
            output_bias: output_grads.bias,
        })
    }

    fn apply(&mut self, grads: &Gradients, optimizer: &mut OptimizerState) {
        let adam = &mut optimizer.adam;
        adam.begin_step();
        adam.update(&mut self.embedding.weight, grads.embedding.view(), &mut optimizer.embedding);
        adam.update(&mut self.hidden.weight, grads.hidden_weight.view(), &mut optimizer.hidden_weight);
        adam.update(&mut self.hidden.bias, grads.hidden_bias.view(), &mut optimizer.hidden_bias);
        adam.update(&mut self.output.weight, grads.output_weight.view(), &mut optimizer.output_weight);
        adam.update(&mut self.output.bias, grads.output_bias.view(), &mut optimizer.output_bias);
    }

    /// Helper function for a single training step, returns (loss, accuracy)
    fn train_step(
        &mut self,
        ids: ArrayView2<usize>,
        targets: ArrayView2<f32>,
        optimizer: &mut OptimizerState,
    ) -> Result<(f32, f32), ModelError> {
        let cache = self.forward(ids);
        let loss = utils::categorical_cross_entropy(cache.probs.view(), targets)?;
        let accuracy = utils::accuracy(cache.probs.view(), targets);

        let grads = self.backward(ids, &cache, targets)?;
        self.apply(&grads, optimizer);

        Ok((loss, accuracy))
    }

    /// Softmax distribution over the vocabulary for each context row
    pub fn predict_proba(&self, contexts: ArrayView2<usize>) -> Result<Array2<f32>, ModelError> {
        self.check_ids(contexts)?;
        Ok(self.forward(contexts).probs)
    }

    /// Writes the weights, replacing any previous file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        io::serialize_to_file(path, self)?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model: Self = io::deserialize_from_file(path)?;
        model.config.validate()?;

        let config = &model.config;
        let consistent = model.embedding.weight.dim() == (config.vocab_size, config.embed_dim)
            && model.hidden.weight.dim() == (config.context_len * config.embed_dim, config.hidden_dim)
            && model.hidden.bias.dim() == (1, config.hidden_dim)
            && model.output.weight.dim() == (config.hidden_dim, config.vocab_size)
            && model.output.bias.dim() == (1, config.vocab_size);
        if !consistent {
            return Err(ModelError::DimensionMismatch(
                "stored weights do not match stored configuration".to_string(),
            ));
        }
        Ok(model)
    }
}

impl NextTokenModel for WindowModel {
    fn context_len(&self) -> usize {
        self.config.context_len
    }

    fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    fn fit(&mut self, x: ArrayView2<usize>, y: ArrayView2<f32>) -> Result<TrainingHistory, ModelError> {
        self.check_ids(x)?;
        if y.dim() != (x.nrows(), self.config.vocab_size) {
            return Err(ModelError::DimensionMismatch(format!(
                "expected targets of shape ({}, {}), got {:?}",
                x.nrows(),
                self.config.vocab_size,
                y.dim()
            )));
        }
        if x.nrows() == 0 {
            return Err(ModelError::Training("no training examples".to_string()));
        }

        let examples = x.nrows() as f32;
        let mut optimizer = OptimizerState::new(self);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(1));
        let mut history = TrainingHistory::default();

        for epoch in 1..=self.config.epochs {
            let mut loss_sum = 0.0;
            let mut hit_sum = 0.0;

            for batch in BatchIterator::new(x.view(), y.view(), self.config.batch_size, &mut rng) {
                let size = batch.input.nrows() as f32;
                let (loss, accuracy) = self.train_step(batch.input.view(), batch.target.view(), &mut optimizer)?;
                loss_sum += loss * size;
                hit_sum += accuracy * size;
            }

            let metrics = EpochMetrics {
                epoch,
                loss: loss_sum / examples,
                accuracy: hit_sum / examples,
            };
            if !metrics.loss.is_finite() {
                return Err(ModelError::Training(format!("loss diverged at epoch {}", epoch)));
            }
            info!(
                "Epoch {}/{}: loss = {:.4}, accuracy = {:.4}",
                epoch, self.config.epochs, metrics.loss, metrics.accuracy
            );
            history.record(metrics);
        }

        debug!("Finished {} optimizer steps", optimizer.adam.step());
        Ok(history)
    }

    fn predict_next(&self, context: &[usize]) -> Result<usize, ModelError> {
        let ids = ArrayView2::from_shape((1, context.len()), context)
            .map_err(|e| ModelError::DimensionMismatch(e.to_string()))?;
        let probs = self.predict_proba(ids)?;

        // Padding is a class of the output layer but never a prediction
        let row = probs.row(0);
        let best = PAD_ID + 1 + utils::argmax(row.slice(ndarray::s![PAD_ID + 1..]));
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use tempfile::tempdir;

    use crate::training::to_categorical;

    fn config() -> ModelConfig {
        ModelConfig {
            vocab_size: 4,
            context_len: 3,
            embed_dim: 3,
            hidden_dim: 12,
            learning_rate: 0.02,
            batch_size: 4,
            epochs: 300,
            seed: 42,
        }
    }

    /// Cyclic pattern 1 2 3 1 2 3 ...
    fn cyclic_data() -> (Array2<usize>, Array2<f32>) {
        let x = array![[1, 2, 3], [2, 3, 1], [3, 1, 2], [1, 2, 3], [2, 3, 1], [3, 1, 2]];
        let y = to_categorical(&[1, 2, 3, 1, 2, 3], 4).unwrap();
        (x, y)
    }

    #[test]
    fn test_model_initialization() {
        let model = WindowModel::new(config()).unwrap();
        // 4*3 + (9*12 + 12) + (12*4 + 4)
        assert_eq!(model.num_parameters(), 12 + 120 + 52);
        assert_eq!(model.context_len(), 3);
        assert_eq!(model.vocab_size(), 4);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = WindowModel::new(config()).unwrap();
        let b = WindowModel::new(config()).unwrap();
        assert_eq!(a.hidden.weight, b.hidden.weight);
        assert_eq!(a.output.weight, b.output.weight);
    }

    #[test]
    fn test_predict_proba_is_distribution() {
        let model = WindowModel::new(config()).unwrap();
        let probs = model.predict_proba(array![[0, 1, 2], [3, 3, 3]].view()).unwrap();
        assert_eq!(probs.dim(), (2, 4));
        for row in probs.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_predict_next_rejects_wrong_length() {
        let model = WindowModel::new(config()).unwrap();
        assert!(matches!(
            model.predict_next(&[1, 2]),
            Err(ModelError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_predict_next_rejects_unknown_id() {
        let model = WindowModel::new(config()).unwrap();
        assert!(matches!(
            model.predict_next(&[1, 2, 9]),
            Err(ModelError::InvalidTokenId { id: 9, vocab_size: 4 })
        ));
    }

    #[test]
    fn test_predict_next_never_returns_padding() {
        let model = WindowModel::new(config()).unwrap();
        for context in [[0, 0, 0], [0, 0, 1], [3, 2, 1]] {
            let id = model.predict_next(&context).unwrap();
            assert!((1..4).contains(&id));
        }
    }

    #[test]
    fn test_fit_learns_cycle() {
        let (x, y) = cyclic_data();
        let mut model = WindowModel::new(config()).unwrap();

        let history = model.fit(x.view(), y.view()).unwrap();
        assert_eq!(history.len(), 300);

        let first = history.epochs[0].loss;
        let last = history.last().unwrap();
        assert!(last.loss < first, "loss did not decrease: {} -> {}", first, last.loss);

        assert_eq!(model.predict_next(&[1, 2, 3]).unwrap(), 1);
        assert_eq!(model.predict_next(&[2, 3, 1]).unwrap(), 2);
        assert_eq!(model.predict_next(&[3, 1, 2]).unwrap(), 3);
    }

    #[test]
    fn test_fit_on_views_of_separate_owners() {
        let x = array![[1, 2, 3], [2, 3, 1], [3, 1, 2]];
        let mut model = WindowModel::new(ModelConfig { epochs: 2, ..config() }).unwrap();

        let history = {
            // Targets live in a shorter scope than the contexts
            let y = to_categorical(&[1, 2, 3], 4).unwrap();
            model.fit(x.view(), y.view()).unwrap()
        };
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_fit_rejects_bad_shapes() {
        let (x, _) = cyclic_data();
        let y = to_categorical(&[1, 2, 3], 4).unwrap();
        let mut model = WindowModel::new(config()).unwrap();
        assert!(matches!(
            model.fit(x.view(), y.view()),
            Err(ModelError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = cyclic_data();
        let mut a = WindowModel::new(ModelConfig { epochs: 5, ..config() }).unwrap();
        let mut b = WindowModel::new(ModelConfig { epochs: 5, ..config() }).unwrap();

        let ha = a.fit(x.view(), y.view()).unwrap();
        let hb = b.fit(x.view(), y.view()).unwrap();

        assert_eq!(ha.epochs, hb.epochs);
        assert_eq!(a.output.weight, b.output.weight);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let model = WindowModel::new(config()).unwrap();
        model.save(&path).unwrap();
        // Overwrite must succeed
        model.save(&path).unwrap();

        let loaded = WindowModel::load(&path).unwrap();
        assert_eq!(loaded.config(), model.config());
        assert_eq!(loaded.embedding.weight, model.embedding.weight);
        assert_eq!(
            loaded.predict_next(&[1, 2, 3]).unwrap(),
            model.predict_next(&[1, 2, 3]).unwrap()
        );
    }

    #[test]
    fn test_load_missing_model() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            WindowModel::load(dir.path().join("missing.bin")),
            Err(ModelError::Io(_))
        ));
    }
}
