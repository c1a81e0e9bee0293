pub mod config;
pub use config::Config;

pub mod corpus;
pub use corpus::{TokenSequence, load_tokens, read_corpus, save_sequences, window};

pub mod error;
pub use error::TinyChatError;

pub mod generate;
pub use generate::{Generator, GenerationState, pad_sequence, pick_seed_text};

pub mod model;
pub use model::{ModelConfig, NextTokenModel, WindowModel};

pub mod pipeline;
pub use pipeline::{RunOutput, run};

pub mod tokenizer;
pub use tokenizer::{Vocabulary, preprocess, PAD_ID};

pub mod training;
pub use training::{TrainingHistory, TrainingSet, to_categorical};

pub mod utils;
