use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// Adam optimizer state for a single parameter matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdamState {
    m: Array2<f32>,  // First moment estimate
    v: Array2<f32>,  // Second moment estimate
}

impl AdamState {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            m: Array2::zeros(shape),
            v: Array2::zeros(shape),
        }
    }
}

/// Adam hyper-parameters and step counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    step: usize,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Starts a new update step; call once per batch before `update`
    pub fn begin_step(&mut self) {
        self.step += 1;
    }

    /// Update a single parameter matrix using Adam
    pub fn update(&self, param: &mut Array2<f32>, grad: ArrayView2<f32>, state: &mut AdamState) {
        let t = self.step.max(1) as i32;
        let (beta1, beta2) = (self.beta1, self.beta2);

        // Update first moment estimate (m)
        state.m = &state.m * beta1 + &grad * (1.0 - beta1);

        // Update second moment estimate (v)
        state.v = &state.v * beta2 + grad.mapv(|g| g * g) * (1.0 - beta2);

        // Compute bias-corrected estimates
        let m_hat = &state.m / (1.0 - beta1.powi(t));
        let v_hat = &state.v / (1.0 - beta2.powi(t));

        // Compute and apply update
        let denom = v_hat.mapv(|v| v.sqrt() + self.epsilon);
        let update = (m_hat / denom) * self.learning_rate;
        *param -= &update;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(0.1);
        let mut param: Array2<f32> = array![[1.0, -1.0]];
        let grad: Array2<f32> = array![[0.5, -2.0]];
        let mut state = AdamState::new(param.dim());

        adam.begin_step();
        adam.update(&mut param, grad.view(), &mut state);

        // Bias correction makes the first update +-learning_rate regardless of magnitude
        assert_eq!(adam.step(), 1);
        assert_abs_diff_eq!(param[[0, 0]], 0.9, epsilon = 1e-4);
        assert_abs_diff_eq!(param[[0, 1]], -0.9, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_gradient_leaves_parameter() {
        let mut adam = Adam::new(0.01);
        let mut param: Array2<f32> = array![[3.0, 4.0]];
        let grad = Array2::<f32>::zeros((1, 2));
        let mut state = AdamState::new(param.dim());

        adam.begin_step();
        adam.update(&mut param, grad.view(), &mut state);

        assert_abs_diff_eq!(param[[0, 0]], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(param[[0, 1]], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_descends_quadratic() {
        // minimise (x - 2)^2
        let mut adam = Adam::new(0.1);
        let mut param: Array2<f32> = array![[0.0]];
        let mut state = AdamState::new((1, 1));

        for _ in 0..500 {
            let grad = param.mapv(|x| 2.0 * (x - 2.0));
            adam.begin_step();
            adam.update(&mut param, grad.view(), &mut state);
        }

        assert_abs_diff_eq!(param[[0, 0]], 2.0, epsilon = 0.05);
    }
}
