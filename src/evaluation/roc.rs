//! Micro-averaged ROC curve and area under it.

use serde::{Deserialize, Serialize};

/// One-vs-rest indicator rows: `out[i][c] == 1` iff `labels[i] == c`.
pub fn label_binarize(labels: &[usize], n_classes: usize) -> Vec<Vec<u8>> {
    labels
        .iter()
        .map(|&label| (0..n_classes).map(|c| u8::from(c == label)).collect())
        .collect()
}

/// False/true positive rates at every distinct score threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub auc: f64,
}

impl RocCurve {
    /// Micro-averaged curve: every (sample, category) cell of the binarized
    /// labels is pooled into one binary problem scored by `scores[i][c]`.
    ///
    /// Returns `None` when the pooled problem has no positives or no
    /// negatives, or when a score row does not match `n_classes`.
    pub fn micro_average(labels: &[usize], scores: &[Vec<f64>], n_classes: usize) -> Option<Self> {
        if labels.len() != scores.len() || scores.iter().any(|row| row.len() != n_classes) {
            return None;
        }

        let truth = label_binarize(labels, n_classes);
        let mut pooled: Vec<(f64, bool)> = truth
            .iter()
            .zip(scores)
            .flat_map(|(t, s)| t.iter().zip(s).map(|(&y, &score)| (score, y == 1)))
            .collect();
        Self::from_binary(&mut pooled)
    }

    fn from_binary(pooled: &mut [(f64, bool)]) -> Option<Self> {
        let positives = pooled.iter().filter(|(_, y)| *y).count();
        let negatives = pooled.len() - positives;
        if positives == 0 || negatives == 0 {
            return None;
        }

        pooled.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let (mut tp, mut fp) = (0usize, 0usize);
        for (i, &(score, positive)) in pooled.iter().enumerate() {
            if positive {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_threshold = pooled.get(i + 1).is_none_or(|next| next.0 != score);
            if last_of_threshold {
                fpr.push(fp as f64 / negatives as f64);
                tpr.push(tp as f64 / positives as f64);
            }
        }

        let auc = trapezoid(&fpr, &tpr);
        Some(Self { fpr, tpr, auc })
    }
}

/// Area under a piecewise-linear curve with non-decreasing `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_binarize() {
        assert_eq!(label_binarize(&[0, 2], 3), vec![vec![1, 0, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn test_perfect_scores_give_unit_auc() {
        let labels = [0, 1, 2];
        let scores = vec![
            vec![0.9, 0.05, 0.05],
            vec![0.1, 0.8, 0.1],
            vec![0.2, 0.1, 0.7],
        ];
        let roc = RocCurve::micro_average(&labels, &scores, 3).unwrap();
        assert!((roc.auc - 1.0).abs() < 1e-12);
        assert_eq!(roc.fpr.first(), Some(&0.0));
        assert_eq!(roc.tpr.last(), Some(&1.0));
        assert_eq!(roc.fpr.last(), Some(&1.0));
    }

    #[test]
    fn test_constant_scores_give_half_auc() {
        let labels = [0, 1];
        let scores = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let roc = RocCurve::micro_average(&labels, &scores, 2).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 1.0]);
        assert!((roc.auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(RocCurve::micro_average(&[0], &[vec![1.0]], 1).is_none());
        assert!(RocCurve::micro_average(&[0, 1], &[vec![1.0, 0.0]], 2).is_none());
    }
}
