use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MathError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Computes softmax along the rows of a 2D array
pub fn softmax_rows(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut probs = logits.to_owned();
    for mut row in probs.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum().max(1e-20);
        row.mapv_inplace(|x| x / sum);
    }
    probs
}

/// Index of the largest element, first one wins on ties
pub fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &value) in row.iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// Mean categorical cross-entropy between softmax probabilities and one-hot targets
pub fn categorical_cross_entropy(
    probs: ArrayView2<f32>,
    targets: ArrayView2<f32>,
) -> Result<f32, MathError> {
    if probs.dim() != targets.dim() {
        return Err(MathError::DimensionMismatch(format!(
            "probabilities {:?} vs targets {:?}",
            probs.dim(),
            targets.dim()
        )));
    }
    if probs.nrows() == 0 {
        return Ok(0.0);
    }

    let loss: f32 = probs
        .iter()
        .zip(targets.iter())
        .filter(|(_, t)| **t != 0.0)
        .map(|(p, t)| -t * p.max(1e-7).ln())
        .sum();

    Ok(loss / probs.nrows() as f32)
}

/// Gradient of the mean categorical cross-entropy w.r.t. the logits, given softmax output
pub fn d_categorical_cross_entropy(
    probs: ArrayView2<f32>,
    targets: ArrayView2<f32>,
) -> Result<Array2<f32>, MathError> {
    if probs.dim() != targets.dim() {
        return Err(MathError::DimensionMismatch(format!(
            "probabilities {:?} vs targets {:?}",
            probs.dim(),
            targets.dim()
        )));
    }
    let batch_size = probs.nrows().max(1) as f32;
    Ok((&probs - &targets) / batch_size)
}

/// Fraction of rows whose arg-max prediction matches the arg-max target
pub fn accuracy(probs: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
    if probs.nrows() == 0 {
        return 0.0;
    }
    let hits = probs
        .axis_iter(Axis(0))
        .zip(targets.axis_iter(Axis(0)))
        .filter(|(p, t)| argmax(p.view()) == argmax(t.view()))
        .count();
    hits as f32 / probs.nrows() as f32
}
