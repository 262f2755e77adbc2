//! TF-IDF vectorizer for text feature extraction.

use std::collections::HashMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::TermAnalyzer;
use crate::config::VectorizerConfig;
use crate::error::{DocClassError, Result};
use crate::feature::vector::FeatureVector;

/// TF-IDF vectorizer for text feature extraction.
///
/// A vectorizer only exists in fitted form: [`TfIdfVectorizer::fit`] builds
/// the vocabulary and IDF weights once, and every other method borrows it
/// immutably, so a fitted instance can be shared across threads and its term
/// indices never move. Terms unseen during fitting contribute nothing.
///
/// Weights follow `(1 + ln(count)) * idf` with the smoothed
/// `idf = ln((1 + n) / (1 + df)) + 1`, and each vector is scaled to unit
/// length.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    analyzer: TermAnalyzer,
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Terms by index (alphabetical).
    feature_names: Vec<String>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("ngram_range", &self.analyzer.ngram_range())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Fit a vectorizer on training documents.
    pub fn fit<S: AsRef<str>>(config: &VectorizerConfig, documents: &[S]) -> Result<Self> {
        config.validate()?;
        if documents.is_empty() {
            return Err(DocClassError::data("cannot fit a vectorizer on an empty corpus"));
        }

        let analyzer = TermAnalyzer::from_config(config);
        let n_documents = documents.len();

        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut corpus_frequency: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let counts = count_terms(&analyzer, doc.as_ref());
            for (term, count) in counts {
                *corpus_frequency.entry(term.clone()).or_insert(0) += count;
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = config.max_df * n_documents as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(DocClassError::data(format!(
                "max_df allows at most {max_doc_count:.1} documents per term, fewer than min_df={}",
                config.min_df
            )));
        }

        let mut retained: Vec<(String, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= config.min_df && df as f64 <= max_doc_count)
            .map(|(term, _)| (term.clone(), corpus_frequency.get(term).copied().unwrap_or(0)))
            .collect();

        if retained.is_empty() {
            return Err(DocClassError::data(format!(
                "no terms remain after document-frequency pruning (min_df={}, max_df={}, documents={n_documents})",
                config.min_df, config.max_df
            )));
        }

        if retained.len() > config.max_features {
            // Most frequent terms across the corpus win; ties broken alphabetically.
            retained.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            retained.truncate(config.max_features);
        }

        let mut feature_names: Vec<String> = retained.into_iter().map(|(term, _)| term).collect();
        feature_names.sort();

        let vocabulary: HashMap<String, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();

        let idf = feature_names
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0);
                ((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            analyzer,
            vocabulary,
            feature_names,
            idf,
            n_documents,
        })
    }

    /// Fit on `documents` and return their vectors in the fitted space.
    pub fn fit_transform<S: AsRef<str>>(
        config: &VectorizerConfig,
        documents: &[S],
    ) -> Result<(Self, Vec<FeatureVector>)> {
        let vectorizer = Self::fit(config, documents)?;
        let vectors = vectorizer.transform_batch(documents);
        Ok((vectorizer, vectors))
    }

    /// Transform a document into a TF-IDF feature vector.
    pub fn transform(&self, document: &str) -> FeatureVector {
        let counts = count_terms(&self.analyzer, document);

        let pairs = counts
            .into_iter()
            .filter_map(|(term, count)| {
                let idx = *self.vocabulary.get(&term)?;
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                Some((idx, tf * self.idf[idx]))
            })
            .collect();

        let mut vector = FeatureVector::from_pairs(self.feature_names.len(), pairs);
        vector.normalize();
        vector
    }

    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Vec<FeatureVector> {
        documents.iter().map(|doc| self.transform(doc.as_ref())).collect()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.feature_names.len()
    }

    /// Terms ordered by their feature index.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

fn count_terms(analyzer: &TermAnalyzer, text: &str) -> AHashMap<String, usize> {
    let mut counts = AHashMap::new();
    for term in analyzer.analyze(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
