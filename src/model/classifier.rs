//! Classifier trait shared by every candidate algorithm.

use crate::error::Result;
use crate::feature::FeatureVector;

/// What the per-category scores of a classifier mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// Scores are a probability distribution over categories.
    Probability,
    /// Scores are unbounded decision margins.
    Margin,
}

/// A multi-class classifier over sparse feature vectors.
///
/// Labels are category indices in `0..n_classes`; the mapping from index to
/// category name is owned by the caller (see `CategorySet`).
pub trait Classifier: Send + Sync {
    /// Human-readable algorithm name.
    fn name(&self) -> &str;

    /// Fit on labeled vectors, replacing any previous fit.
    fn fit(&mut self, features: &[FeatureVector], labels: &[usize], n_classes: usize) -> Result<()>;

    fn is_fitted(&self) -> bool;

    /// Raw per-category scores, one per class index.
    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64>;

    fn score_kind(&self) -> ScoreKind;

    /// Per-category linear weights over the feature space, when the
    /// algorithm has them.
    fn coefficients(&self) -> Option<&[Vec<f64>]> {
        None
    }

    /// Probabilities over categories; margins are passed through a softmax.
    fn predict_proba(&self, x: &FeatureVector) -> Vec<f64> {
        let scores = self.decision_scores(x);
        match self.score_kind() {
            ScoreKind::Probability => scores,
            ScoreKind::Margin => softmax(&scores),
        }
    }

    /// Index of the highest-scoring category.
    fn predict(&self, x: &FeatureVector) -> usize {
        argmax(&self.decision_scores(x)).unwrap_or(0)
    }

    fn predict_batch(&self, xs: &[FeatureVector]) -> Vec<usize> {
        xs.iter().map(|x| self.predict(x)).collect()
    }
}

/// Numerically stable softmax. Entries equal to `-inf` map to zero.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores
        .iter()
        .copied()
        .filter(|s| s.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![1.0 / scores.len().max(1) as f64; scores.len()];
    }

    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Shared input checks for `Classifier::fit` implementations.
pub(crate) fn check_training_input(
    name: &str,
    features: &[FeatureVector],
    labels: &[usize],
    n_classes: usize,
) -> Result<usize> {
    use crate::error::DocClassError;

    if features.is_empty() {
        return Err(DocClassError::training(name, "no training samples"));
    }
    if features.len() != labels.len() {
        return Err(DocClassError::training(
            name,
            format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            ),
        ));
    }
    if n_classes < 2 {
        return Err(DocClassError::training(
            name,
            format!("need at least 2 categories, got {n_classes}"),
        ));
    }
    if let Some(label) = labels.iter().find(|&&l| l >= n_classes) {
        return Err(DocClassError::training(
            name,
            format!("label {label} out of range for {n_classes} categories"),
        ));
    }

    let n_features = features[0].dim();
    if features.iter().any(|x| x.dim() != n_features) {
        return Err(DocClassError::training(name, "feature vectors differ in width"));
    }
    Ok(n_features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[2] > p[1] && p[1] > p[0]);

        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_negative_infinity() {
        let p = softmax(&[f64::NEG_INFINITY, 0.0]);
        assert_eq!(p, vec![0.0, 1.0]);
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
