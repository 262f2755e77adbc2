//! Plain-text rendering of evaluation results.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::evaluation::evaluator::{CandidateFailure, EvaluationRecord};

/// Ranked comparison table followed by the overfitting analysis.
///
/// `ranking` is expected in ranked order (see [`rank`](super::rank)).
pub fn format_ranking(ranking: &[EvaluationRecord], failures: &[CandidateFailure]) -> String {
    let mut out = String::new();
    let rule = "=".repeat(96);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "MODEL COMPARISON");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{:<5} {:<34} {:>9} {:>9} {:>9} {:>9} {:>8}  {}",
        "Rank", "Model", "Train", "Test", "CV", "AUC", "Gap", "Overfit"
    );
    let _ = writeln!(out, "{}", "-".repeat(96));

    for (i, record) in ranking.iter().enumerate() {
        let auc = record
            .auc()
            .map(|auc| format!("{auc:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "{:<5} {:<34} {:>8.2}% {:>8.2}% {:>8.2}% {:>9} {:>7.2}%  {}",
            i + 1,
            record.name,
            record.train_accuracy * 100.0,
            record.test_accuracy * 100.0,
            record.cv_mean * 100.0,
            auc,
            record.overfitting_gap * 100.0,
            if record.is_overfitting { "yes" } else { "no" }
        );
    }

    for failure in failures {
        let _ = writeln!(out, "{:<5} {:<34} failed: {}", "-", failure.name, failure.error);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "OVERFITTING ANALYSIS");
    let flagged: Vec<&EvaluationRecord> = ranking.iter().filter(|r| r.is_overfitting).collect();
    if flagged.is_empty() {
        let _ = writeln!(out, "No model shows significant overfitting.");
    } else {
        for record in flagged {
            let _ = writeln!(
                out,
                "{}: train {:.2}% vs test {:.2}% (gap {:.2}%)",
                record.name,
                record.train_accuracy * 100.0,
                record.test_accuracy * 100.0,
                record.overfitting_gap * 100.0
            );
        }
    }

    out
}

/// Per-category precision/recall/F1 table and confusion matrix of one record.
pub fn format_classification_report(record: &EvaluationRecord) -> String {
    let mut out = String::new();
    let report = &record.report;

    let _ = writeln!(out, "Classification report: {}", record.name);
    let _ = writeln!(
        out,
        "{:<16} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    for m in report
        .categories
        .iter()
        .chain([&report.macro_avg, &report.weighted_avg])
    {
        let _ = writeln!(
            out,
            "{:<16} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            m.category, m.precision, m.recall, m.f1, m.support
        );
    }
    let _ = writeln!(out, "{:<16} {:>29.2}", "accuracy", report.accuracy);

    let _ = writeln!(out);
    let _ = writeln!(out, "Confusion matrix (rows: true, columns: predicted)");
    let names: Vec<&str> = report.categories.iter().map(|m| m.category.as_str()).collect();
    let _ = write!(out, "{:<16}", "");
    for name in &names {
        let _ = write!(out, " {:>9}", truncate(name, 9));
    }
    let _ = writeln!(out);
    for (name, row) in names.iter().zip(record.confusion.rows()) {
        let _ = write!(out, "{:<16}", truncate(name, 16));
        for count in row {
            let _ = write!(out, " {count:>9}");
        }
        let _ = writeln!(out);
    }

    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// ROC curve of one candidate, for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocSeries {
    pub model: String,
    pub auc: f64,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
}

/// ROC series of every record that has one.
pub fn roc_series(records: &[EvaluationRecord]) -> Vec<RocSeries> {
    records
        .iter()
        .filter_map(|record| {
            record.roc.as_ref().map(|roc| RocSeries {
                model: record.name.clone(),
                auc: roc.auc,
                fpr: roc.fpr.clone(),
                tpr: roc.tpr.clone(),
            })
        })
        .collect()
}
