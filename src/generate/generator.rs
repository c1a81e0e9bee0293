use log::{debug, warn};

use crate::error::TinyChatError;
use crate::model::NextTokenModel;
use crate::tokenizer::{Vocabulary, PAD_ID};

/// Fits `ids` to exactly `seq_len`: left-pads with the padding id when short,
/// keeps only the most recent `seq_len` ids when long.
pub fn pad_sequence(ids: &[usize], seq_len: usize) -> Vec<usize> {
    if ids.len() >= seq_len {
        return ids[ids.len() - seq_len..].to_vec();
    }
    let mut padded = vec![PAD_ID; seq_len - ids.len()];
    padded.extend_from_slice(ids);
    padded
}

/// Running text fed back into the model and the tokens generated so far
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    input_text: String,
    output: Vec<String>,
}

impl GenerationState {
    pub fn new(seed_text: &str) -> Self {
        Self {
            input_text: seed_text.to_string(),
            output: Vec::new(),
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    fn push(&mut self, token: &str) {
        self.input_text.push(' ');
        self.input_text.push_str(token);
        self.output.push(token.to_string());
    }

    /// Generated tokens joined by single spaces
    pub fn into_text(self) -> String {
        self.output.join(" ")
    }
}

/// Drives a model one token at a time from seed text
pub struct Generator<'a, M: NextTokenModel + ?Sized> {
    model: &'a M,
    vocab: &'a Vocabulary,
    seq_len: usize,
}

impl<'a, M: NextTokenModel + ?Sized> Generator<'a, M> {
    pub fn new(model: &'a M, vocab: &'a Vocabulary, seq_len: usize) -> Self {
        Self { model, vocab, seq_len }
    }

    /// Predicts and appends one token
    pub fn step(&self, state: &mut GenerationState) -> Result<(), TinyChatError> {
        // The whole running text is re-encoded; unknown tokens vanish here
        let encoded = self.vocab.encode_new(&state.input_text)?;
        if encoded.is_empty() {
            warn!("Generation context has no known tokens, predicting from padding only");
        }

        let context = pad_sequence(&encoded, self.seq_len);
        let id = self.model.predict_next(&context)?;
        let token = self.vocab.decode(id)?;
        debug!("context {:?} -> {} ({})", context, id, token);

        state.push(token);
        Ok(())
    }

    /// Runs exactly `num_gen_words` steps, no early stop
    pub fn run(&self, state: &mut GenerationState, num_gen_words: usize) -> Result<(), TinyChatError> {
        for _ in 0..num_gen_words {
            self.step(state)?;
        }
        Ok(())
    }

    /// Generates `num_gen_words` tokens following `seed_text`, joined by spaces
    pub fn generate(&self, seed_text: &str, num_gen_words: usize) -> Result<String, TinyChatError> {
        let mut state = GenerationState::new(seed_text);
        self.run(&mut state, num_gen_words)?;
        Ok(state.into_text())
    }
}
