//! Text analysis for feature extraction.
//!
//! Raw document text goes through three stages before it reaches the
//! vectorizer:
//!
//! ```text
//! Raw Text → CharFilter (lowercase + accent folding) → Tokenizer → n-gram terms
//! ```
//!
//! The [`TermAnalyzer`] wires the stages together and is fully described by
//! plain data, so it can be persisted inside the fitted extractor and rebuilt
//! identically at inference time.

pub mod char_filter;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

use crate::config::VectorizerConfig;

use self::char_filter::{AccentFoldingCharFilter, CharFilter};
use self::tokenizer::{Tokenizer, UnicodeWordTokenizer};

/// Turns text into the candidate terms (1..=n word sequences) of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAnalyzer {
    ngram_min: usize,
    ngram_max: usize,
    tokenizer: UnicodeWordTokenizer,
}

impl TermAnalyzer {
    pub fn new(ngram_min: usize, ngram_max: usize, min_token_chars: usize) -> Self {
        Self {
            ngram_min: ngram_min.max(1),
            ngram_max: ngram_max.max(ngram_min.max(1)),
            tokenizer: UnicodeWordTokenizer::new(min_token_chars),
        }
    }

    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self::new(config.ngram_min, config.ngram_max, config.min_token_chars)
    }

    /// Normalized tokens of `text`, in order.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let normalized = AccentFoldingCharFilter.filter(text);
        self.tokenizer.tokenize(&normalized)
    }

    /// All n-gram terms of `text`, with repetitions.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = Vec::new();

        for n in self.ngram_min..=self.ngram_max {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }

        terms
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        (self.ngram_min, self.ngram_max)
    }
}

impl Default for TermAnalyzer {
    fn default() -> Self {
        Self::from_config(&VectorizerConfig::default())
    }
}
