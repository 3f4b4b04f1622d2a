//! Word tokenization for the corpus statistics.
//!
//! The pipeline only relies on the [`Tokenizer`] contract: cleaned text in,
//! normalized word tokens out, in text order. [`AlphanumericTokenizer`] is the
//! stock implementation.

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Splits on anything that is not an ASCII letter or digit and lowercases.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericTokenizer;

impl Tokenizer for AlphanumericTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect()
    }
}

/// Total byte length of the tokens, the numerator of the information ratio.
pub fn token_byte_count(tokens: &[String]) -> usize {
    tokens.iter().map(String::len).sum()
}
