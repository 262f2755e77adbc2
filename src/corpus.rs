//! Labeled training data.
//!
//! A [`Corpus`] is a list of [`LabeledExample`]s plus the [`CategorySet`]
//! that fixes the index of every category. The set is derived once from the
//! labels (sorted, distinct) and from then on travels with the model, so
//! every consumer reads category order from it rather than recomputing it.

pub mod loader;
pub mod synthetic;

use serde::{Deserialize, Serialize};

use crate::error::{DocClassError, Result};

pub use loader::{load_corpus, write_jsonl};
pub use synthetic::{SyntheticGenerator, default_categories};

/// One training document and its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub category: String,
}

impl LabeledExample {
    pub fn new<T: Into<String>, C: Into<String>>(text: T, category: C) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Ordered, duplicate-free list of category names.
///
/// Position in the list is the class index used by every model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    /// Use the given order as-is.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(DocClassError::data("category set is empty"));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(DocClassError::data(format!("duplicate category '{name}'")));
            }
        }
        Ok(Self { names })
    }

    /// Sorted distinct labels of the examples.
    pub fn from_examples(examples: &[LabeledExample]) -> Result<Self> {
        let mut names: Vec<&str> = examples.iter().map(|e| e.category.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        Self::new(names)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// A validated training corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    examples: Vec<LabeledExample>,
    categories: CategorySet,
    labels: Vec<usize>,
}

impl Corpus {
    /// Build a corpus whose category set is the sorted distinct labels.
    pub fn new(examples: Vec<LabeledExample>) -> Result<Self> {
        if examples.is_empty() {
            return Err(DocClassError::data("training corpus is empty"));
        }
        let categories = CategorySet::from_examples(&examples)?;
        Self::with_categories(examples, categories)
    }

    /// Build a corpus against an explicit category order. Every example must
    /// carry one of the given categories.
    pub fn with_categories(examples: Vec<LabeledExample>, categories: CategorySet) -> Result<Self> {
        if examples.is_empty() {
            return Err(DocClassError::data("training corpus is empty"));
        }
        if categories.len() < 2 {
            return Err(DocClassError::data(format!(
                "need at least 2 categories, found {}",
                categories.len()
            )));
        }

        let labels = examples
            .iter()
            .enumerate()
            .map(|(i, e)| {
                categories.index_of(&e.category).ok_or_else(|| {
                    DocClassError::data(format!("example {i} has unknown category '{}'", e.category))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            examples,
            categories,
            labels,
        })
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Class index of every example.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn texts(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Number of examples per category, in category order.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.categories.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples() -> Vec<LabeledExample> {
        vec![
            LabeledExample::new("facture montant", "Facture"),
            LabeledExample::new("curriculum vitae", "CV"),
            LabeledExample::new("facture tva", "Facture"),
        ]
    }

    #[test]
    fn test_categories_are_sorted_distinct_labels() {
        let corpus = Corpus::new(examples()).unwrap();
        assert_eq!(corpus.categories().as_slice(), &["CV", "Facture"]);
        assert_eq!(corpus.labels(), &[1, 0, 1]);
        assert_eq!(corpus.class_counts(), vec![1, 2]);
    }

    #[test]
    fn test_explicit_order_is_kept() {
        let categories = CategorySet::new(["Facture", "CV"]).unwrap();
        let corpus = Corpus::with_categories(examples(), categories).unwrap();
        assert_eq!(corpus.labels(), &[0, 1, 0]);
        assert_eq!(corpus.categories().name(1), Some("CV"));
    }

    #[test]
    fn test_data_errors() {
        assert!(Corpus::new(Vec::new()).unwrap_err().is_data());
        assert!(CategorySet::new(["A", "A"]).unwrap_err().is_data());

        let single = vec![LabeledExample::new("x", "A"), LabeledExample::new("y", "A")];
        assert!(Corpus::new(single).unwrap_err().is_data());

        let categories = CategorySet::new(["A", "B"]).unwrap();
        let err = Corpus::with_categories(examples(), categories).unwrap_err();
        assert!(err.is_data());
    }
}
