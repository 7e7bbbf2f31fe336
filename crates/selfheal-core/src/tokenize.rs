//! Splits normalized keys into significant word tokens.

/// Tokenizer for word-overlap matching.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    separators: Vec<char>,
    min_word_length: usize,
}

impl Tokenizer {
    pub fn new(separators: &str, min_word_length: usize) -> Self {
        Self {
            separators: separators.chars().collect(),
            min_word_length,
        }
    }

    /// Distinct tokens of at least `min_word_length` chars, in first-seen order.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in text.split(|ch: char| ch.is_whitespace() || self.separators.contains(&ch)) {
            if token.is_empty() || token.chars().count() < self.min_word_length {
                continue;
            }
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }
}
