use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::corpus::TokenSequence;

/// Deterministically picks an index in `0..count`, `None` when `count` is zero
pub fn pick_seed_index(count: usize, seed: u64) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Some(rng.gen_range(0..count))
}

/// Joins the tokens of a deterministically chosen sequence into seed text
pub fn pick_seed_text(sequences: &[TokenSequence], seed: u64) -> Option<String> {
    pick_seed_index(sequences.len(), seed).map(|index| sequences[index].text())
}
