//! Word tokenization.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Trait for tokenizers that split normalized text into word tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Splits text on Unicode word boundaries (UAX #29).
///
/// Word segments are further split on any character that is neither
/// alphanumeric nor `_`, so `"d'emission"` yields `"emission"` and `"t.v.a"`
/// yields nothing once short pieces are dropped. Pieces with fewer than
/// `min_chars` characters are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnicodeWordTokenizer {
    min_chars: usize,
}

impl UnicodeWordTokenizer {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars: min_chars.max(1),
        }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }
}

impl Default for UnicodeWordTokenizer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .flat_map(|word| word.split(|c: char| !(c.is_alphanumeric() || c == '_')))
            .filter(|piece| piece.chars().count() >= self.min_chars)
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
