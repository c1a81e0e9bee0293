//! Seed selection and autoregressive text generation

mod generator;
mod seed;

pub use generator::{pad_sequence, GenerationState, Generator};
pub use seed::{pick_seed_index, pick_seed_text};
