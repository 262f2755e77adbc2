//! The fixed candidate list and the serializable model wrapper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CandidatesConfig;
use crate::error::{DocClassError, Result};
use crate::feature::FeatureVector;
use crate::model::classifier::{Classifier, ScoreKind};
use crate::model::linear_svm::LinearSvm;
use crate::model::logistic::LogisticRegression;
use crate::model::naive_bayes::MultinomialNaiveBayes;
use crate::model::random_forest::RandomForest;

/// Candidate algorithms, in the order the trainer evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    NaiveBayes,
    LogisticRegression,
    LinearSvm,
    RandomForest,
}

impl ModelKind {
    /// Every candidate in evaluation order. Ties in test accuracy are won by
    /// the earlier entry.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::NaiveBayes,
        ModelKind::LogisticRegression,
        ModelKind::LinearSvm,
        ModelKind::RandomForest,
    ];

    /// Display name used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::NaiveBayes => "Naive Bayes (Multinomial)",
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::LinearSvm => "Support Vector Machine (Linear)",
            ModelKind::RandomForest => "Random Forest",
        }
    }

    /// Type name recorded in artifact metadata.
    pub fn type_name(&self) -> &'static str {
        match self {
            ModelKind::NaiveBayes => "MultinomialNaiveBayes",
            ModelKind::LogisticRegression => "LogisticRegression",
            ModelKind::LinearSvm => "LinearSvm",
            ModelKind::RandomForest => "RandomForest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = DocClassError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| {
                kind.type_name().eq_ignore_ascii_case(s) || kind.display_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| DocClassError::config(format!("unknown model type: {s}")))
    }
}

/// A fitted (or fresh) candidate of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    NaiveBayes(MultinomialNaiveBayes),
    LogisticRegression(LogisticRegression),
    LinearSvm(LinearSvm),
    RandomForest(RandomForest),
}

impl TrainedModel {
    /// A fresh, unfitted model of the given kind.
    pub fn untrained(kind: ModelKind, config: &CandidatesConfig, seed: u64) -> Self {
        match kind {
            ModelKind::NaiveBayes => TrainedModel::NaiveBayes(MultinomialNaiveBayes::new(&config.naive_bayes)),
            ModelKind::LogisticRegression => {
                TrainedModel::LogisticRegression(LogisticRegression::new(&config.logistic_regression))
            }
            ModelKind::LinearSvm => TrainedModel::LinearSvm(LinearSvm::new(&config.linear_svm, seed)),
            ModelKind::RandomForest => {
                TrainedModel::RandomForest(RandomForest::new(&config.random_forest, seed))
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::NaiveBayes(_) => ModelKind::NaiveBayes,
            TrainedModel::LogisticRegression(_) => ModelKind::LogisticRegression,
            TrainedModel::LinearSvm(_) => ModelKind::LinearSvm,
            TrainedModel::RandomForest(_) => ModelKind::RandomForest,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::NaiveBayes(m) => m,
            TrainedModel::LogisticRegression(m) => m,
            TrainedModel::LinearSvm(m) => m,
            TrainedModel::RandomForest(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedModel::NaiveBayes(m) => m,
            TrainedModel::LogisticRegression(m) => m,
            TrainedModel::LinearSvm(m) => m,
            TrainedModel::RandomForest(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[usize], n_classes: usize) -> Result<()> {
        self.inner_mut().fit(features, labels, n_classes)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64> {
        self.inner().decision_scores(x)
    }

    fn score_kind(&self) -> ScoreKind {
        self.inner().score_kind()
    }

    fn coefficients(&self) -> Option<&[Vec<f64>]> {
        self.inner().coefficients()
    }
}
