//! Multinomial naive Bayes.

use serde::{Deserialize, Serialize};

use crate::config::NaiveBayesConfig;
use crate::error::{DocClassError, Result};
use crate::feature::FeatureVector;
use crate::model::classifier::{Classifier, ScoreKind, check_training_input, softmax};

const NAME: &str = "Naive Bayes (Multinomial)";

/// Multinomial naive Bayes over non-negative feature weights.
///
/// Per-category feature log-probabilities use additive smoothing `alpha`.
/// A category absent from the training labels gets a zero prior and
/// therefore zero probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    /// `ln P(category)`.
    class_log_prior: Vec<f64>,
    /// `ln P(feature | category)`, one row per category.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn new(config: &NaiveBayesConfig) -> Self {
        Self {
            alpha: config.alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
        }
    }

    fn joint_log_likelihood(&self, x: &FeatureVector) -> Vec<f64> {
        self.feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(row, prior)| prior + x.dot(row))
            .collect()
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[usize], n_classes: usize) -> Result<()> {
        let n_features = check_training_input(NAME, features, labels, n_classes)?;
        if self.alpha <= 0.0 {
            return Err(DocClassError::training(
                NAME,
                format!("alpha must be positive, got {}", self.alpha),
            ));
        }

        let mut feature_count = vec![vec![0.0; n_features]; n_classes];
        let mut class_count = vec![0usize; n_classes];

        for (x, &label) in features.iter().zip(labels) {
            class_count[label] += 1;
            for (idx, value) in x.iter() {
                if value < 0.0 {
                    return Err(DocClassError::training(NAME, "negative feature values"));
                }
                feature_count[label][idx] += value;
            }
        }

        let n_samples = features.len() as f64;
        self.class_log_prior = class_count
            .iter()
            .map(|&count| {
                if count == 0 {
                    f64::NEG_INFINITY
                } else {
                    (count as f64 / n_samples).ln()
                }
            })
            .collect();

        let alpha = self.alpha;
        self.feature_log_prob = feature_count
            .into_iter()
            .map(|row| {
                let total: f64 = row.iter().sum::<f64>() + alpha * n_features as f64;
                row.into_iter().map(|c| ((c + alpha) / total).ln()).collect()
            })
            .collect();

        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.feature_log_prob.is_empty()
    }

    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64> {
        softmax(&self.joint_log_likelihood(x))
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Probability
    }

    fn coefficients(&self) -> Option<&[Vec<f64>]> {
        Some(&self.feature_log_prob)
    }
}
