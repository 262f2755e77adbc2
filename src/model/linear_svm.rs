//! One-vs-rest linear support vector machine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::LinearSvmConfig;
use crate::error::{DocClassError, Result};
use crate::feature::FeatureVector;
use crate::model::classifier::{Classifier, ScoreKind, check_training_input};

const NAME: &str = "Support Vector Machine (Linear)";

/// Linear SVM with squared hinge loss, one binary problem per category.
///
/// Each binary problem is solved in the dual by coordinate descent over a
/// seeded random permutation of the samples. The intercept is learned as
/// the weight of a constant feature equal to 1. Scores are signed margins,
/// not probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    c: f64,
    max_iter: usize,
    tolerance: f64,
    seed: u64,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearSvm {
    pub fn new(config: &LinearSvmConfig, seed: u64) -> Self {
        Self {
            c: config.c,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            seed,
            weights: Vec::new(),
            intercepts: Vec::new(),
        }
    }

    /// Solve one binary problem; returns `(weights, intercept)`.
    fn fit_binary(
        &self,
        features: &[FeatureVector],
        targets: &[f64],
        sq_norms: &[f64],
        n_features: usize,
        rng: &mut StdRng,
    ) -> (Vec<f64>, f64) {
        let diag = 0.5 / self.c;
        let mut w = vec![0.0; n_features];
        let mut b = 0.0;
        let mut alpha = vec![0.0; features.len()];
        let mut order: Vec<usize> = (0..features.len()).collect();

        for _ in 0..self.max_iter {
            order.shuffle(rng);
            let mut max_pg = f64::NEG_INFINITY;
            let mut min_pg = f64::INFINITY;

            for &i in &order {
                let y = targets[i];
                let x = &features[i];
                let g = y * (x.dot(&w) + b) - 1.0 + diag * alpha[i];
                let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };
                max_pg = max_pg.max(pg);
                min_pg = min_pg.min(pg);

                if pg != 0.0 {
                    let q = sq_norms[i] + 1.0 + diag;
                    let old = alpha[i];
                    alpha[i] = (old - g / q).max(0.0);
                    let delta = (alpha[i] - old) * y;
                    for (idx, value) in x.iter() {
                        w[idx] += delta * value;
                    }
                    b += delta;
                }
            }

            if max_pg - min_pg < self.tolerance {
                break;
            }
        }

        (w, b)
    }
}

impl Classifier for LinearSvm {
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

        let sq_norms: Vec<f64> = features.iter().map(|x| x.l2_norm().powi(2)).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut weights = Vec::with_capacity(n_classes);
        let mut intercepts = Vec::with_capacity(n_classes);

        for class in 0..n_classes {
            let targets: Vec<f64> = labels
                .iter()
                .map(|&l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.fit_binary(features, &targets, &sq_norms, n_features, &mut rng);
            weights.push(w);
            intercepts.push(b);
        }

        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| x.dot(row) + b)
            .collect()
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Margin
    }

    fn coefficients(&self) -> Option<&[Vec<f64>]> {
        Some(&self.weights)
    }
}
