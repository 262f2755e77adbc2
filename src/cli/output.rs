//! Output formatting for CLI commands.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::{DocClassArgs, OutputFormat};
use crate::error::Result;
use crate::evaluation::{
    CandidateFailure, EvaluationRecord, format_classification_report, format_ranking,
};
use crate::inference::{BatchItem, BatchPrediction, FeatureWeight, ModelInfo, Prediction};

/// Rendering of a command result for the human output format.
pub trait HumanOutput {
    fn to_human(&self) -> String;
}

/// One row of the candidate ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank: usize,
    pub model: String,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub auc: Option<f64>,
    pub overfitting_gap: f64,
    pub is_overfitting: bool,
    pub training_secs: f64,
}

/// A sample sentence classified right after training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokePrediction {
    pub text: String,
    pub category: String,
    pub confidence: f64,
}

/// Result of the train command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub selected_model: String,
    pub model_type: String,
    pub test_accuracy: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub auc: Option<f64>,
    pub vocabulary_size: usize,
    pub artifact_dir: String,
    pub ranking: Vec<RankingRow>,
    pub failures: Vec<CandidateFailure>,
    pub smoke_predictions: Vec<SmokePrediction>,
    #[serde(skip)]
    pub report: String,
}

impl TrainingSummary {
    pub fn ranking_rows(ranking: &[EvaluationRecord]) -> Vec<RankingRow> {
        ranking
            .iter()
            .enumerate()
            .map(|(i, r)| RankingRow {
                rank: i + 1,
                model: r.name.clone(),
                train_accuracy: r.train_accuracy,
                test_accuracy: r.test_accuracy,
                cv_mean: r.cv_mean,
                cv_std: r.cv_std,
                auc: r.auc(),
                overfitting_gap: r.overfitting_gap,
                is_overfitting: r.is_overfitting,
                training_secs: r.training_secs,
            })
            .collect()
    }

    /// Ranking table, overfitting analysis and the selected model's
    /// per-category report.
    pub fn render_report(
        ranking: &[EvaluationRecord],
        failures: &[CandidateFailure],
        selected: &EvaluationRecord,
    ) -> String {
        format!(
            "{}\n{}",
            format_ranking(ranking, failures),
            format_classification_report(selected)
        )
    }
}

impl HumanOutput for TrainingSummary {
    fn to_human(&self) -> String {
        let mut out = self.report.clone();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Selected: {} ({:.2}% test accuracy, CV {:.2}% +/- {:.2}%)",
            self.selected_model,
            self.test_accuracy * 100.0,
            self.cv_mean * 100.0,
            self.cv_std * 200.0
        );
        if let Some(auc) = self.auc {
            let _ = writeln!(out, "ROC AUC (micro): {auc:.4}");
        }
        let _ = writeln!(out, "Vocabulary: {} terms", self.vocabulary_size);
        let _ = writeln!(out, "Artifacts: {}", self.artifact_dir);

        if !self.smoke_predictions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Sample predictions:");
            for p in &self.smoke_predictions {
                let _ = writeln!(
                    out,
                    "  {} -> {} ({:.1}%)",
                    preview(&p.text, 60),
                    p.category,
                    p.confidence * 100.0
                );
            }
        }
        out
    }
}

/// Result of the generate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub output: String,
    pub examples: usize,
    pub categories: Vec<String>,
}

impl HumanOutput for GenerationSummary {
    fn to_human(&self) -> String {
        format!(
            "Wrote {} examples ({}) to {}\n",
            self.examples,
            self.categories.join(", "),
            self.output
        )
    }
}

/// Result of the categories command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<String>,
}

impl HumanOutput for CategoryList {
    fn to_human(&self) -> String {
        self.categories.iter().map(|c| format!("{c}\n")).collect()
    }
}

/// Result of the importance command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceResult {
    pub category: String,
    pub features: Vec<FeatureWeight>,
}

impl HumanOutput for ImportanceResult {
    fn to_human(&self) -> String {
        let mut out = format!("Top terms for {}:\n", self.category);
        for (i, f) in self.features.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {:<40} {:>10.4}", i + 1, f.term, f.weight);
        }
        out
    }
}

impl HumanOutput for Prediction {
    fn to_human(&self) -> String {
        let mut out = format!(
            "Category: {} (confidence: {:.2}%)\n",
            self.category,
            self.confidence * 100.0
        );
        for (category, probability) in self.distribution.iter() {
            let _ = writeln!(out, "  {category:<16} {probability:.4}");
        }
        out
    }
}

impl HumanOutput for BatchPrediction {
    fn to_human(&self) -> String {
        let mut out = String::new();
        for item in &self.results {
            match item {
                BatchItem::Success { index, prediction } => {
                    let _ = writeln!(
                        out,
                        "[{index}] {} ({:.2}%)",
                        prediction.category,
                        prediction.confidence * 100.0
                    );
                }
                BatchItem::Failure { index, error } => {
                    let _ = writeln!(out, "[{index}] error: {error}");
                }
            }
        }
        let _ = writeln!(
            out,
            "Total: {}, successful: {}, failed: {}",
            self.total, self.successful, self.failed
        );
        out
    }
}

impl HumanOutput for ModelInfo {
    fn to_human(&self) -> String {
        let mut out = format!("Status: {}\n", self.status);
        if let Some(name) = &self.model_name {
            let _ = writeln!(out, "Model: {name}");
        }
        if let Some(model_type) = &self.model_type {
            let _ = writeln!(out, "Type: {model_type}");
        }
        if !self.categories.is_empty() {
            let _ = writeln!(out, "Categories: {}", self.categories.join(", "));
            let _ = writeln!(out, "Features: {}", self.feature_count);
        }
        if let Some(accuracy) = self.test_accuracy {
            let _ = writeln!(out, "Test accuracy: {:.2}%", accuracy * 100.0);
        }
        if let Some(trained_at) = self.trained_at {
            let _ = writeln!(out, "Trained at: {}", trained_at.to_rfc3339());
        }
        let _ = writeln!(out, "Artifact directory: {}", self.artifact_dir);
        if let Some(error) = &self.last_error {
            let _ = writeln!(out, "Last error: {error}");
        }
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &DocClassArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", result.to_human());
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &DocClassArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Distribution;

    #[test]
    fn test_preview() {
        assert_eq!(preview("court", 10), "court");
        assert_eq!(preview("éèêëà", 2), "éè...");
    }

    #[test]
    fn test_prediction_human() {
        let prediction = Prediction {
            category: "Facture".to_string(),
            confidence: 0.8123,
            distribution: Distribution::new(vec![
                ("Facture".to_string(), 0.8123),
                ("CV".to_string(), 0.1877),
            ]),
        };
        let text = prediction.to_human();
        assert!(text.starts_with("Category: Facture (confidence: 81.23%)"));
        assert!(text.contains("CV"));
    }

    #[test]
    fn test_summary_json_skips_report_text() {
        let summary = TrainingSummary {
            selected_model: "Logistic Regression".to_string(),
            model_type: "LogisticRegression".to_string(),
            test_accuracy: 0.9,
            cv_mean: 0.88,
            cv_std: 0.01,
            auc: Some(0.97),
            vocabulary_size: 120,
            artifact_dir: "./models".to_string(),
            ranking: Vec::new(),
            failures: Vec::new(),
            smoke_predictions: Vec::new(),
            report: "table".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("report").is_none());
        assert_eq!(json["model_type"], "LogisticRegression");
        assert!(summary.to_human().contains("Selected: Logistic Regression"));
    }
}
