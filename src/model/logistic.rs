//! Multinomial logistic regression with L2 regularization.

use serde::{Deserialize, Serialize};

use crate::config::LogisticRegressionConfig;
use crate::error::{DocClassError, Result};
use crate::feature::FeatureVector;
use crate::model::classifier::{Classifier, ScoreKind, check_training_input, softmax};

const NAME: &str = "Logistic Regression";

/// Softmax regression trained by full-batch gradient descent.
///
/// Minimizes the mean cross-entropy plus `||W||² / (2·C·n)`; intercepts are
/// not penalized. Weights start at zero so a fit is fully deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    tolerance: f64,
    learning_rate: f64,
    /// One weight row per category.
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    /// Iterations run by the last fit.
    n_iter: usize,
}

impl LogisticRegression {
    pub fn new(config: &LogisticRegressionConfig) -> Self {
        Self {
            c: config.c,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            learning_rate: config.learning_rate,
            weights: Vec::new(),
            intercepts: Vec::new(),
            n_iter: 0,
        }
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn linear_scores(&self, x: &FeatureVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| x.dot(row) + b)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[usize], n_classes: usize) -> Result<()> {
        let n_features = check_training_input(NAME, features, labels, n_classes)?;
        if self.c <= 0.0 {
            return Err(DocClassError::training(
                NAME,
                format!("C must be positive, got {}", self.c),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(DocClassError::training(NAME, "learning rate must be positive"));
        }

        let n = features.len() as f64;
        let penalty = 1.0 / (self.c * n);
        let mut weights = vec![vec![0.0; n_features]; n_classes];
        let mut intercepts = vec![0.0; n_classes];
        let mut grad_w = vec![vec![0.0; n_features]; n_classes];
        let mut grad_b = vec![0.0; n_classes];

        self.n_iter = 0;
        for _ in 0..self.max_iter {
            self.n_iter += 1;

            for (k, row) in grad_w.iter_mut().enumerate() {
                for (g, w) in row.iter_mut().zip(&weights[k]) {
                    *g = penalty * w;
                }
                grad_b[k] = 0.0;
            }

            for (x, &label) in features.iter().zip(labels) {
                let scores: Vec<f64> = weights
                    .iter()
                    .zip(&intercepts)
                    .map(|(row, b)| x.dot(row) + b)
                    .collect();
                let probs = softmax(&scores);
                for (k, p) in probs.iter().enumerate() {
                    let residual = (p - if k == label { 1.0 } else { 0.0 }) / n;
                    grad_b[k] += residual;
                    for (idx, value) in x.iter() {
                        grad_w[k][idx] += residual * value;
                    }
                }
            }

            let mut max_grad: f64 = 0.0;
            for k in 0..n_classes {
                for (w, g) in weights[k].iter_mut().zip(&grad_w[k]) {
                    *w -= self.learning_rate * g;
                    max_grad = max_grad.max(g.abs());
                }
                intercepts[k] -= self.learning_rate * grad_b[k];
                max_grad = max_grad.max(grad_b[k].abs());
            }

            if max_grad < self.tolerance {
                break;
            }
        }

        if weights.iter().flatten().any(|w| !w.is_finite()) {
            return Err(DocClassError::training(NAME, "weights diverged"));
        }

        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64> {
        softmax(&self.linear_scores(x))
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Probability
    }

    fn coefficients(&self) -> Option<&[Vec<f64>]> {
        Some(&self.weights)
    }
}
