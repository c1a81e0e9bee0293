use serde::Serialize;

/// Loss and accuracy over one pass of the training set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
}

/// Per-epoch record of a `fit` call
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn record(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}
