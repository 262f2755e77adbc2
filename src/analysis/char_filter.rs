//! Character-level normalization applied before tokenization.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A filter that rewrites raw text before it is tokenized.
pub trait CharFilter: Send + Sync {
    fn filter(&self, input: &str) -> String;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Lowercases text and strips accents.
///
/// Text is lowercased, decomposed with NFKD and every combining mark is
/// dropped, so `"Échéance"` becomes `"echeance"` and compatibility forms such
/// as fullwidth letters fold to their plain equivalents.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccentFoldingCharFilter;

impl CharFilter for AccentFoldingCharFilter {
    fn filter(&self, input: &str) -> String {
        input
            .to_lowercase()
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .collect()
    }

    fn name(&self) -> &'static str {
        "accent_folding"
    }
}
