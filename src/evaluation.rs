//! Model training, evaluation and selection.
//!
//! The [`Trainer`] drives a run: stratified split, TF-IDF fit on the train
//! partition, then [`evaluate`] over the candidate list. Each successful
//! candidate yields an [`EvaluationRecord`] with train/test accuracy, the
//! overfitting gap, k-fold cross-validation scores, a micro-averaged ROC
//! curve and a per-category report. [`select_best`] picks the winner by
//! test accuracy alone.

pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod roc;
pub mod split;
pub mod trainer;

pub use evaluator::{
    CandidateFailure, Evaluated, Evaluation, EvaluationData, EvaluationRecord, evaluate,
    evaluate_candidate, rank, select_best,
};
pub use metrics::{CategoryMetrics, ClassificationReport, ConfusionMatrix, accuracy, mean_std};
pub use report::{RocSeries, format_classification_report, format_ranking, roc_series};
pub use roc::{RocCurve, label_binarize};
pub use split::{Split, stratified_kfold, stratified_split};
pub use trainer::{Trainer, TrainingOutcome};
