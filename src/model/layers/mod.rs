//! Neural network layers

mod linear;
mod embedding;

pub use linear::{Linear, LinearGradients};
pub use embedding::Embedding;
