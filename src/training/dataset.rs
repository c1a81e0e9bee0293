use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::ModelError;

/// One-hot expands target ids over `num_classes`
pub fn to_categorical(targets: &[usize], num_classes: usize) -> Result<Array2<f32>, ModelError> {
    let mut one_hot = Array2::zeros((targets.len(), num_classes));
    for (row, &target) in targets.iter().enumerate() {
        if target >= num_classes {
            return Err(ModelError::InvalidTokenId { id: target, vocab_size: num_classes });
        }
        one_hot[[row, target]] = 1.0;
    }
    Ok(one_hot)
}

/// Encoded training examples: context ids and one-hot targets
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub x: Array2<usize>, // [examples, seq_len]
    pub y: Array2<f32>,   // [examples, num_classes]
}

impl TrainingSet {
    /// Splits every encoded sequence into its leading context and final target
    pub fn from_encoded(sequences: &[Vec<usize>], num_classes: usize) -> Result<Self, ModelError> {
        let width = sequences.first().map_or(0, Vec::len);
        if width < 2 {
            return Err(ModelError::DimensionMismatch(format!(
                "sequences need a context and a target, got width {}",
                width
            )));
        }

        let mut x = Array2::zeros((sequences.len(), width - 1));
        let mut targets = Vec::with_capacity(sequences.len());
        for (row, sequence) in sequences.iter().enumerate() {
            if sequence.len() != width {
                return Err(ModelError::DimensionMismatch(format!(
                    "sequence {} has {} ids, expected {}",
                    row,
                    sequence.len(),
                    width
                )));
            }
            for (col, &id) in sequence[..width - 1].iter().enumerate() {
                x[[row, col]] = id;
            }
            targets.push(sequence[width - 1]);
        }

        let y = to_categorical(&targets, num_classes)?;
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }
}

/// Iterator over shuffled mini-batches of a training set
pub struct BatchIterator<'a> {
    x: ArrayView2<'a, usize>,
    y: ArrayView2<'a, f32>,
    order: Vec<usize>,
    batch_size: usize,
    current_pos: usize,
}

impl<'a> BatchIterator<'a> {
    pub fn new(
        x: ArrayView2<'a, usize>,
        y: ArrayView2<'a, f32>,
        batch_size: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let mut order: Vec<usize> = (0..x.nrows()).collect();
        order.shuffle(rng);
        Self {
            x,
            y,
            order,
            batch_size: batch_size.max(1),
            current_pos: 0,
        }
    }
}

impl<'a> Iterator for BatchIterator<'a> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_pos >= self.order.len() {
            return None;
        }

        let end = (self.current_pos + self.batch_size).min(self.order.len());
        let rows = &self.order[self.current_pos..end];
        self.current_pos = end;

        Some(Batch {
            input: self.x.select(Axis(0), rows),
            target: self.y.select(Axis(0), rows),
        })
    }
}

/// A single training batch
pub struct Batch {
    pub input: Array2<usize>,
    pub target: Array2<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_to_categorical() {
        let one_hot = to_categorical(&[2, 0, 1], 4).unwrap();
        assert_eq!(one_hot.dim(), (3, 4));
        assert_eq!(one_hot.row(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(one_hot.row(1).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(one_hot.sum(), 3.0);
    }

    #[test]
    fn test_to_categorical_out_of_range() {
        assert!(matches!(
            to_categorical(&[1, 4], 4),
            Err(ModelError::InvalidTokenId { id: 4, vocab_size: 4 })
        ));
    }

    #[test]
    fn test_from_encoded_splits_context_and_target() {
        let sequences = vec![vec![1, 2, 3, 1], vec![2, 3, 1, 2]];
        let set = TrainingSet::from_encoded(&sequences, 4).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.x.row(0).to_vec(), vec![1, 2, 3]);
        assert_eq!(set.x.row(1).to_vec(), vec![2, 3, 1]);
        assert_eq!(set.y[[0, 1]], 1.0);
        assert_eq!(set.y[[1, 2]], 1.0);
    }

    #[test]
    fn test_from_encoded_rejects_ragged() {
        let sequences = vec![vec![1, 2, 3], vec![1, 2]];
        assert!(matches!(
            TrainingSet::from_encoded(&sequences, 4),
            Err(ModelError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_batches_cover_every_example_once() {
        let sequences: Vec<Vec<usize>> = (0..10).map(|i| vec![i, i, 0]).collect();
        let set = TrainingSet::from_encoded(&sequences, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let batches: Vec<Batch> =
            BatchIterator::new(set.x.view(), set.y.view(), 4, &mut rng).collect();

        let sizes: Vec<usize> = batches.iter().map(|b| b.input.nrows()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        let mut seen: Vec<usize> = batches
            .iter()
            .flat_map(|b| b.input.column(0).to_vec())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }
}
