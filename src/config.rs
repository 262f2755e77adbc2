//! Configuration for feature extraction, training and inference.
//!
//! Every struct carries serde derives and a `Default` with the production
//! values, so a JSON config file only has to list the fields it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocClassError, Result};

/// Settings for the TF-IDF feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Shortest word sequence used as a term.
    pub ngram_min: usize,
    /// Longest word sequence used as a term.
    pub ngram_max: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Vocabulary cap.
    pub max_features: usize,
    /// Tokens shorter than this (in chars) are discarded.
    pub min_token_chars: usize,
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 3,
            min_df: 2,
            max_df: 0.7,
            max_features: 5000,
            min_token_chars: 2,
            sublinear_tf: true,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(DocClassError::config(format!(
                "invalid n-gram range ({}, {})",
                self.ngram_min, self.ngram_max
            )));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(DocClassError::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == 0 {
            return Err(DocClassError::config("max_features must be positive"));
        }
        Ok(())
    }
}

/// Multinomial naive Bayes hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesConfig {
    /// Additive (Lidstone) smoothing.
    pub alpha: f64,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self { alpha: 0.1 }
    }
}

/// Multinomial logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once every gradient component falls under this value.
    pub tolerance: f64,
    pub learning_rate: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 10.0,
            max_iter: 1000,
            tolerance: 1e-4,
            learning_rate: 1.0,
        }
    }
}

/// Linear support vector machine hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearSvmConfig {
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the projected gradient gap falls under this value.
    pub tolerance: f64,
}

impl Default for LinearSvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 2000,
            tolerance: 1e-4,
        }
    }
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 20,
            min_samples_split: 2,
        }
    }
}

/// Hyperparameters for every candidate algorithm.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatesConfig {
    pub naive_bayes: NaiveBayesConfig,
    pub logistic_regression: LogisticRegressionConfig,
    pub linear_svm: LinearSvmConfig,
    pub random_forest: RandomForestConfig,
}

/// Settings for the training/evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Fraction of each category held out for testing.
    pub test_fraction: f64,
    /// Number of cross-validation folds on the train partition.
    pub cv_folds: usize,
    /// A train/test accuracy gap above this flags overfitting.
    pub overfitting_threshold: f64,
    /// Seed for the split and every randomized algorithm.
    pub seed: u64,
    pub candidates: CandidatesConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            cv_folds: 5,
            overfitting_threshold: 0.10,
            seed: 42,
            candidates: CandidatesConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(DocClassError::config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(DocClassError::config(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.candidates.random_forest.n_estimators == 0 {
            return Err(DocClassError::config("random forest needs at least one tree"));
        }
        Ok(())
    }
}

/// Settings for the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Category returned for empty or whitespace-only text.
    pub default_category: String,
    /// Decimal digits kept in probabilities and confidence.
    pub probability_decimals: u32,
    /// Decimal digits kept in feature importance weights.
    pub importance_decimals: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            default_category: "Autre".to_string(),
            probability_decimals: 4,
            importance_decimals: 4,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the published artifact set.
    pub artifact_dir: PathBuf,
    pub vectorizer: VectorizerConfig,
    pub trainer: TrainerConfig,
    pub inference: InferenceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("./models"),
            vectorizer: VectorizerConfig::default(),
            trainer: TrainerConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocClassError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.trainer.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.vectorizer.max_features, 5000);
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.vectorizer.max_df, 0.7);
        assert_eq!(config.trainer.cv_folds, 5);
        assert_eq!(config.trainer.test_fraction, 0.2);
        assert_eq!(config.inference.default_category, "Autre");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"artifact_dir": "/tmp/docclass", "trainer": {{"seed": 7, "candidates": {{"random_forest": {{"n_estimators": 10}}}}}}}}"#
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/docclass"));
        assert_eq!(config.trainer.seed, 7);
        assert_eq!(config.trainer.candidates.random_forest.n_estimators, 10);
        assert_eq!(config.trainer.candidates.random_forest.max_depth, 20);
        assert_eq!(config.trainer.cv_folds, 5);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.vectorizer.max_df = 1.5;
        assert!(matches!(config.validate(), Err(DocClassError::Config(_))));

        let mut config = EngineConfig::default();
        config.trainer.cv_folds = 1;
        assert!(matches!(config.validate(), Err(DocClassError::Config(_))));

        let mut config = EngineConfig::default();
        config.vectorizer.ngram_min = 4;
        assert!(matches!(config.validate(), Err(DocClassError::Config(_))));
    }
}
