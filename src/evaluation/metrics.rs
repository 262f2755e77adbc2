//! Accuracy, per-category precision/recall/F1 and the confusion matrix.

use serde::{Deserialize, Serialize};

/// Fraction of positions where `predicted` equals `truth`.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Counts of (true category, predicted category) pairs.
///
/// Rows are true categories and columns are predictions, both in category
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(truth: &[usize], predicted: &[usize], n_classes: usize) -> Self {
        let mut counts = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in truth.iter().zip(predicted) {
            if t < n_classes && p < n_classes {
                counts[t][p] += 1;
            }
        }
        Self { counts }
    }

    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth][predicted]
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    /// Samples whose true category is `class`.
    fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Samples predicted as `class`.
    fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }
}

/// Precision, recall and F1 of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-category metrics with macro and support-weighted averages.
///
/// Undefined ratios (no predictions or no support) count as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub categories: Vec<CategoryMetrics>,
    pub accuracy: f64,
    pub macro_avg: CategoryMetrics,
    pub weighted_avg: CategoryMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(matrix: &ConfusionMatrix, names: &[String]) -> Self {
        let n = matrix.n_classes();
        let categories: Vec<CategoryMetrics> = (0..n)
            .map(|class| {
                let tp = matrix.true_positives(class) as f64;
                let support = matrix.support(class);
                let predicted = matrix.predicted(class);
                let precision = ratio(tp, predicted as f64);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);
                CategoryMetrics {
                    category: names.get(class).cloned().unwrap_or_else(|| class.to_string()),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total: usize = categories.iter().map(|m| m.support).sum();
        let correct: usize = (0..n).map(|c| matrix.true_positives(c)).sum();

        let macro_avg = average(&categories, "macro avg", |_| 1.0);
        let weighted_avg = average(&categories, "weighted avg", |m| m.support as f64);

        Self {
            categories,
            accuracy: ratio(correct as f64, total as f64),
            macro_avg,
            weighted_avg,
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

fn average(metrics: &[CategoryMetrics], label: &str, weight: impl Fn(&CategoryMetrics) -> f64) -> CategoryMetrics {
    let total_weight: f64 = metrics.iter().map(&weight).sum();
    let avg = |f: fn(&CategoryMetrics) -> f64| {
        ratio(metrics.iter().map(|m| f(m) * weight(m)).sum(), total_weight)
    };
    CategoryMetrics {
        category: label.to_string(),
        precision: avg(|m| m.precision),
        recall: avg(|m| m.recall),
        f1: avg(|m| m.f1),
        support: metrics.iter().map(|m| m.support).sum(),
    }
}
