//! Training infrastructure for the next-token model

pub mod adam;
pub mod dataset;
pub mod metrics;

// Re-export main components
pub use adam::{Adam, AdamState};
pub use dataset::{to_categorical, Batch, BatchIterator, TrainingSet};
pub use metrics::{EpochMetrics, TrainingHistory};
