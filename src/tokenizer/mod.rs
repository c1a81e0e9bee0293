//! Corpus normalization and the token/id vocabulary

mod error;
mod normalize;
mod vocabulary;

pub use error::TokenizerError;
pub use normalize::{is_excluded, preprocess, EXCLUDED_CHARS};
pub use vocabulary::{Vocabulary, PAD_ID};
