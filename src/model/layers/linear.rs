use super::super::error::ModelError;
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Serialize, Deserialize};

/// A linear (fully-connected) layer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Linear {
    pub weight: Array2<f32>, // Shape: [input_dim, output_dim]
    pub bias: Array2<f32>,   // Shape: [1, output_dim]
}

/// Parameter gradients of a [`Linear`] layer
#[derive(Debug)]
pub struct LinearGradients {
    pub weight: Array2<f32>,
    pub bias: Array2<f32>,
}

impl Linear {
    /// He-initialized weights, zero bias
    pub fn new(input_dim: usize, output_dim: usize, rng: &mut impl Rng) -> Result<Self, ModelError> {
        let std = (2.0 / input_dim.max(1) as f32).sqrt();
        let normal = Normal::new(0.0, std).map_err(|e| {
            ModelError::InitializationError(e.to_string())
        })?;

        Ok(Self {
            weight: Array2::from_shape_fn((input_dim, output_dim), |_| {
                normal.sample(&mut *rng)
            }),
            bias: Array2::zeros((1, output_dim)),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn output_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn num_parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    /// Forward pass for 2D input: [batch_size, input_dim]
    pub fn forward(&self, x: ArrayView2<f32>) -> Array2<f32> {
        x.dot(&self.weight) + &self.bias.row(0)
    }

    /// Backward pass: returns the gradient w.r.t. the input and the parameter gradients
    pub fn backward(
        &self,
        x: ArrayView2<f32>,
        grad_output: ArrayView2<f32>,
    ) -> (Array2<f32>, LinearGradients) {
        let grad_input = grad_output.dot(&self.weight.t());
        let grads = LinearGradients {
            weight: x.t().dot(&grad_output),
            bias: grad_output.sum_axis(Axis(0)).insert_axis(Axis(0)),
        };
        (grad_input, grads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_linear_initialization() {
        let input_dim = 4;
        let output_dim = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let linear = Linear::new(input_dim, output_dim, &mut rng).unwrap();

        assert_eq!(linear.weight.shape(), &[input_dim, output_dim]);
        assert_eq!(linear.bias.shape(), &[1, output_dim]);
        assert_eq!(linear.num_parameters(), 15);
    }

    #[test]
    fn test_forward_output_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let linear = Linear::new(5, 2, &mut rng).unwrap();

        let input = Array2::<f32>::zeros((3, 5));
        let output = linear.forward(input.view());

        assert_eq!(output.dim(), (3, 2));
    }

    #[test]
    fn test_forward_computation_known_weights() {
        let weight = array![[1.0, 2.0], [0.0, 1.0], [-1.0, 0.0]];
        let bias = array![[0.5, -0.5]];
        let linear = Linear { weight, bias };

        let input = array![[2.0, 3.0, 4.0]];
        let output = linear.forward(input.view());

        // y = x · W + b = [2, 3, 4] · [[1,2],[0,1],[-1,0]] + [0.5,-0.5]
        // => y = [2*1 + 3*0 + 4*(-1) + 0.5, 2*2 + 3*1 + 4*0 - 0.5] = [-1.5, 6.5]
        let expected: Array2<f32> = array![[-1.5, 6.5]];

        for ((o, e), idx) in output.iter().zip(expected.iter()).zip(0..) {
            assert!((o - e).abs() < 1e-5, "Mismatch at index {}: got {}, expected {}", idx, o, e);
        }
    }

    #[test]
    fn test_backward_known_weights() {
        let weight = array![[1.0, 2.0], [0.0, 1.0], [-1.0, 0.0]];
        let bias = array![[0.0, 0.0]];
        let linear = Linear { weight, bias };

        let input = array![[2.0, 3.0, 4.0], [1.0, 0.0, 1.0]];
        let grad_output = array![[1.0, 0.0], [0.0, 1.0]];
        let (grad_input, grads) = linear.backward(input.view(), grad_output.view());

        let expected_input: Array2<f32> = array![[1.0, 0.0, -1.0], [2.0, 1.0, 0.0]];
        let expected_weight: Array2<f32> = array![[2.0, 1.0], [3.0, 0.0], [4.0, 1.0]];
        let expected_bias: Array2<f32> = array![[1.0, 1.0]];
        assert_eq!(grad_input, expected_input);
        assert_eq!(grads.weight, expected_weight);
        assert_eq!(grads.bias, expected_bias);
    }
}
