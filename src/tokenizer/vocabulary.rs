use std::collections::HashMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{preprocess, TokenizerError};
use crate::utils::io;

/// Id reserved for padding; never assigned to a token
pub const PAD_ID: usize = 0;

/// Frozen token <-> id mapping.
///
/// Ids start at 1 and follow descending corpus frequency, ties broken by
/// first appearance. `size()` counts the padding slot, so it is the number
/// of classes a model over this vocabulary must predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredVocabulary", into = "StoredVocabulary")]
pub struct Vocabulary {
    /// `words[id - 1]` is the token for `id`
    words: Vec<String>,
    counts: Vec<usize>,
    word_index: HashMap<String, usize>,
}

/// On-disk form: tokens in id order with their counts
#[derive(Serialize, Deserialize)]
struct StoredVocabulary {
    words: Vec<String>,
    counts: Vec<usize>,
}

impl From<StoredVocabulary> for Vocabulary {
    fn from(stored: StoredVocabulary) -> Self {
        Vocabulary::from_ordered(stored.words, stored.counts)
    }
}

impl From<Vocabulary> for StoredVocabulary {
    fn from(vocab: Vocabulary) -> Self {
        StoredVocabulary { words: vocab.words, counts: vocab.counts }
    }
}

impl Vocabulary {
    /// Builds the vocabulary from every token of every sequence
    pub fn build<S, T>(sequences: impl IntoIterator<Item = S>) -> Self
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut first_seen: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for sequence in sequences {
            for token in sequence {
                let token = token.as_ref();
                match counts.get_mut(token) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(token.to_string(), 1);
                        first_seen.push(token.to_string());
                    }
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        let mut ordered: Vec<(String, usize)> = first_seen
            .into_iter()
            .map(|word| {
                let count = counts[&word];
                (word, count)
            })
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        let (words, counts) = ordered.into_iter().unzip();
        Self::from_ordered(words, counts)
    }

    fn from_ordered(words: Vec<String>, counts: Vec<usize>) -> Self {
        let word_index = words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i + 1))
            .collect();
        Self { words, counts, word_index }
    }

    /// Number of model classes: distinct tokens plus the padding slot
    pub fn size(&self) -> usize {
        self.words.len() + 1
    }

    /// Number of distinct tokens
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.word_index.get(token).copied()
    }

    /// Corpus frequency of `token`, zero if unknown
    pub fn count(&self, token: &str) -> usize {
        self.id(token).map_or(0, |id| self.counts[id - 1])
    }

    /// Encodes tokens that were part of the construction corpus
    pub fn encode<T: AsRef<str>>(&self, tokens: &[T]) -> Result<Vec<usize>, TokenizerError> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                self.id(token)
                    .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))
            })
            .collect()
    }

    /// Encodes free text, silently dropping tokens the vocabulary has never seen
    pub fn encode_new(&self, text: &str) -> Result<Vec<usize>, TokenizerError> {
        Ok(preprocess(text)?
            .iter()
            .filter_map(|token| self.id(token))
            .collect())
    }

    pub fn decode(&self, id: usize) -> Result<&str, TokenizerError> {
        if id == PAD_ID {
            return Err(TokenizerError::UnknownId(id));
        }
        self.words
            .get(id - 1)
            .map(String::as_str)
            .ok_or(TokenizerError::UnknownId(id))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TokenizerError> {
        let path = path.as_ref();
        io::write_json(path, self)?;
        info!("Saved vocabulary of {} tokens to {}", self.word_count(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        let vocab: Self = io::read_json(path)?;
        if vocab.words.len() != vocab.counts.len() || vocab.word_index.len() != vocab.words.len() {
            return Err(TokenizerError::serialization(
                "vocabulary file has duplicate tokens or mismatched counts",
            ));
        }
        Ok(vocab)
    }
}
