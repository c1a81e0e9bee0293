//! End-to-end run: corpus to generated text

use log::info;

use crate::config::Config;
use crate::corpus::{self, TokenSequence};
use crate::error::TinyChatError;
use crate::generate::{pick_seed_text, Generator};
use crate::model::{NextTokenModel, WindowModel};
use crate::tokenizer::Vocabulary;
use crate::training::{TrainingHistory, TrainingSet};

/// Result of a full pipeline run
#[derive(Debug)]
pub struct RunOutput {
    pub seed_text: String,
    pub text: String,
    pub history: TrainingHistory,
}

/// Encodes every sequence into ids
pub fn encode_sequences(
    vocab: &Vocabulary,
    sequences: &[TokenSequence],
) -> Result<Vec<Vec<usize>>, TinyChatError> {
    sequences
        .iter()
        .map(|seq| vocab.encode(seq.tokens()).map_err(TinyChatError::from))
        .collect()
}

/// Builds the training set from the corpus and writes the sequence table
pub fn prepare(config: &Config) -> Result<(Vec<TokenSequence>, Vocabulary, TrainingSet), TinyChatError> {
    let tokens = corpus::load_tokens(&config.chats_processed_txt)?;
    let sequences = corpus::window(&tokens, config.train_cycle)?;
    corpus::save_sequences(&config.text_sequences, &sequences)?;

    let vocab = Vocabulary::build(sequences.iter().map(TokenSequence::tokens));
    info!("Vocabulary: {} tokens + padding", vocab.word_count());

    let encoded = encode_sequences(&vocab, &sequences)?;
    let training_set = TrainingSet::from_encoded(&encoded, vocab.size())?;
    Ok((sequences, vocab, training_set))
}

/// Trains a fresh model and persists it with its vocabulary
pub fn train(
    config: &Config,
    vocab: &Vocabulary,
    training_set: &TrainingSet,
) -> Result<(WindowModel, TrainingHistory), TinyChatError> {
    let mut model = WindowModel::new(config.model_config(vocab.size()))?;
    info!(
        "Training on {} examples for {} epochs",
        training_set.len(),
        config.num_epochs
    );
    let history = model.fit(training_set.x.view(), training_set.y.view())?;

    model.save(&config.model_path).map_err(TinyChatError::persistence)?;
    vocab.save(&config.tokenizer_path).map_err(TinyChatError::persistence)?;
    Ok((model, history))
}

/// Runs preprocessing, windowing, encoding, training, seed selection and generation
pub fn run(config: &Config) -> Result<RunOutput, TinyChatError> {
    config.validate()?;

    let (sequences, vocab, training_set) = prepare(config)?;
    let (model, history) = train(config, &vocab, &training_set)?;

    let seed_text = pick_seed_text(&sequences, config.seed).ok_or(TinyChatError::EmptyCorpus {
        tokens: 0,
        required: config.train_cycle + 1,
    })?;
    info!("Seed text: {}", seed_text);

    let text = Generator::new(&model, &vocab, config.seq_len).generate(&seed_text, config.num_gen_words)?;
    Ok(RunOutput { seed_text, text, history })
}

/// Generates from a previously saved model and vocabulary
pub fn generate_from_artifacts(config: &Config, seed_text: &str) -> Result<String, TinyChatError> {
    config.validate()?;

    let model = WindowModel::load(&config.model_path).map_err(TinyChatError::persistence)?;
    let vocab = Vocabulary::load(&config.tokenizer_path).map_err(TinyChatError::persistence)?;
    if model.context_len() != config.seq_len {
        return Err(TinyChatError::Config(format!(
            "saved model expects {} context ids, seq_len is {}",
            model.context_len(),
            config.seq_len
        )));
    }
    if model.vocab_size() != vocab.size() {
        return Err(TinyChatError::Persistence(format!(
            "model has {} classes but vocabulary has {}",
            model.vocab_size(),
            vocab.size()
        )));
    }

    Generator::new(&model, &vocab, config.seq_len).generate(seed_text, config.num_gen_words)
}
