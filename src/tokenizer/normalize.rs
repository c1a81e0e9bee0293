use std::sync::OnceLock;

use regex::Regex;

use super::TokenizerError;

/// Punctuation that never survives as a token on its own. Any whitespace is
/// excluded as well, see [`is_excluded`].
pub const EXCLUDED_CHARS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~";

/// Whether `c` belongs to the exclusion set
pub fn is_excluded(c: char) -> bool {
    c.is_whitespace() || EXCLUDED_CHARS.contains(c)
}

fn token_pattern() -> Result<&'static Regex, TokenizerError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(&format!(r"[^\s{}]+", regex::escape(EXCLUDED_CHARS))))
        .as_ref()
        .map_err(|e| TokenizerError::Pattern(e.clone()))
}

/// Normalizes a corpus into lowercase tokens. Whitespace and excluded
/// punctuation both act as separators and never survive in a token.
pub fn preprocess(text: &str) -> Result<Vec<String>, TokenizerError> {
    let pattern = token_pattern()?;
    Ok(pattern
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect())
}
