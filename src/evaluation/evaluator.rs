//! Per-candidate evaluation and model selection.
//!
//! [`evaluate`] fits every candidate and returns structured records;
//! [`select_best`] and [`rank`] work on those records alone. Neither prints
//! anything: human-readable output lives in [`report`](super::report).

use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::TrainerConfig;
use crate::corpus::CategorySet;
use crate::error::{DocClassError, Result};
use crate::evaluation::metrics::{ClassificationReport, ConfusionMatrix, accuracy, mean_std};
use crate::evaluation::roc::RocCurve;
use crate::evaluation::split::stratified_kfold;
use crate::feature::FeatureVector;
use crate::model::{Classifier, ModelKind, TrainedModel};

/// Vectorized partitions shared by every candidate.
#[derive(Debug, Clone)]
pub struct EvaluationData {
    pub train_x: Vec<FeatureVector>,
    pub train_y: Vec<usize>,
    pub test_x: Vec<FeatureVector>,
    pub test_y: Vec<usize>,
    pub categories: CategorySet,
}

/// Scores of one successfully fitted candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: ModelKind,
    pub name: String,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    /// `train_accuracy - test_accuracy`.
    pub overfitting_gap: f64,
    pub is_overfitting: bool,
    pub cv_scores: Vec<f64>,
    pub cv_mean: f64,
    pub cv_std: f64,
    /// Wall-clock time of the fit on the train partition.
    pub training_secs: f64,
    /// Absent when the test scores cannot form a ROC curve.
    pub roc: Option<RocCurve>,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

impl EvaluationRecord {
    pub fn auc(&self) -> Option<f64> {
        self.roc.as_ref().map(|roc| roc.auc)
    }
}

/// A candidate whose fit failed; it takes no part in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub model: ModelKind,
    pub name: String,
    pub error: String,
}

/// A fitted candidate together with its scores.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub model: TrainedModel,
    pub record: EvaluationRecord,
}

/// Result of evaluating a list of candidates.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Successful candidates, in evaluation order.
    pub candidates: Vec<Evaluated>,
    pub failures: Vec<CandidateFailure>,
}

impl Evaluation {
    pub fn records(&self) -> Vec<EvaluationRecord> {
        self.candidates.iter().map(|c| c.record.clone()).collect()
    }

    /// Remove and return the selected candidate.
    pub fn take_best(&mut self) -> Option<Evaluated> {
        let records = self.records();
        select_best(&records).map(|idx| self.candidates.remove(idx))
    }
}

/// Index of the record with the strictly highest test accuracy. On an exact
/// tie the earlier record wins.
pub fn select_best(records: &[EvaluationRecord]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, record) in records.iter().enumerate() {
        match best {
            Some(b) if record.test_accuracy <= records[b].test_accuracy => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Records sorted by descending test accuracy; equal accuracies keep their
/// evaluation order.
pub fn rank(records: &[EvaluationRecord]) -> Vec<EvaluationRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.test_accuracy.total_cmp(&a.test_accuracy));
    ranked
}

/// Fit and score every candidate in `kinds`, in order.
///
/// A candidate whose fit fails is logged and recorded in
/// [`Evaluation::failures`]; the others are unaffected.
pub fn evaluate(kinds: &[ModelKind], config: &TrainerConfig, data: &EvaluationData) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for &kind in kinds {
        match evaluate_candidate(kind, config, data) {
            Ok(evaluated) => evaluation.candidates.push(evaluated),
            Err(e) => {
                warn!("Candidate {kind} failed: {e}");
                evaluation.failures.push(CandidateFailure {
                    model: kind,
                    name: kind.display_name().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    evaluation
}

/// Fit one candidate on the train partition and score it.
pub fn evaluate_candidate(kind: ModelKind, config: &TrainerConfig, data: &EvaluationData) -> Result<Evaluated> {
    let n_classes = data.categories.len();
    info!("Training {kind}...");

    let mut model = TrainedModel::untrained(kind, &config.candidates, config.seed);
    let start = Instant::now();
    model.fit(&data.train_x, &data.train_y, n_classes)?;
    let training_secs = start.elapsed().as_secs_f64();

    let train_pred = model.predict_batch(&data.train_x);
    let test_pred = model.predict_batch(&data.test_x);
    let train_accuracy = accuracy(&data.train_y, &train_pred);
    let test_accuracy = accuracy(&data.test_y, &test_pred);
    let overfitting_gap = train_accuracy - test_accuracy;
    let is_overfitting = overfitting_gap > config.overfitting_threshold;

    let cv_scores = cross_validate(kind, config, data)?;
    let (cv_mean, cv_std) = mean_std(&cv_scores);

    let test_scores: Vec<Vec<f64>> = data.test_x.iter().map(|x| model.predict_proba(x)).collect();
    let roc = RocCurve::micro_average(&data.test_y, &test_scores, n_classes);

    let confusion = ConfusionMatrix::new(&data.test_y, &test_pred, n_classes);
    let report = ClassificationReport::from_confusion(&confusion, data.categories.as_slice());

    info!(
        "{kind}: train={:.2}% test={:.2}% cv={:.2}% (+/- {:.2}%) in {:.2}s",
        train_accuracy * 100.0,
        test_accuracy * 100.0,
        cv_mean * 100.0,
        cv_std * 200.0,
        training_secs
    );
    if is_overfitting {
        warn!(
            "{kind} is overfitting: train/test gap {:.2}%",
            overfitting_gap * 100.0
        );
    }

    let record = EvaluationRecord {
        model: kind,
        name: kind.display_name().to_string(),
        train_accuracy,
        test_accuracy,
        overfitting_gap,
        is_overfitting,
        cv_scores,
        cv_mean,
        cv_std,
        training_secs,
        roc,
        report,
        confusion,
    };
    Ok(Evaluated { model, record })
}

/// Accuracy of a fresh model of `kind` on each stratified fold of the train
/// partition.
fn cross_validate(kind: ModelKind, config: &TrainerConfig, data: &EvaluationData) -> Result<Vec<f64>> {
    let n_classes = data.categories.len();
    let folds = stratified_kfold(&data.train_y, n_classes, config.cv_folds, config.seed).map_err(|e| {
        DocClassError::training(kind.display_name(), format!("cross-validation: {e}"))
    })?;

    let mut scores = Vec::with_capacity(folds.len());
    for (i, fold) in folds.iter().enumerate() {
        let xs: Vec<FeatureVector> = fold.train.iter().map(|&j| data.train_x[j].clone()).collect();
        let ys: Vec<usize> = fold.train.iter().map(|&j| data.train_y[j]).collect();

        let mut model = TrainedModel::untrained(kind, &config.candidates, config.seed);
        model.fit(&xs, &ys, n_classes)?;

        let truth: Vec<usize> = fold.test.iter().map(|&j| data.train_y[j]).collect();
        let predicted: Vec<usize> = fold.test.iter().map(|&j| model.predict(&data.train_x[j])).collect();
        let score = accuracy(&truth, &predicted);
        debug!("{kind} fold {}: {:.4}", i + 1, score);
        scores.push(score);
    }
    Ok(scores)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A record with only the ranking-relevant fields set.
    pub(crate) fn record(model: ModelKind, train: f64, test: f64) -> EvaluationRecord {
        let confusion = ConfusionMatrix::new(&[], &[], 2);
        EvaluationRecord {
            model,
            name: model.display_name().to_string(),
            train_accuracy: train,
            test_accuracy: test,
            overfitting_gap: train - test,
            is_overfitting: train - test > 0.10,
            cv_scores: vec![test],
            cv_mean: test,
            cv_std: 0.0,
            training_secs: 0.0,
            roc: None,
            report: ClassificationReport::from_confusion(&confusion, &[]),
            confusion,
        }
    }

    #[test]
    fn test_exact_tie_goes_to_earlier_candidate() {
        let records = vec![
            record(ModelKind::NaiveBayes, 0.95, 0.91),
            record(ModelKind::LogisticRegression, 0.99, 0.91),
            record(ModelKind::LinearSvm, 0.93, 0.85),
        ];
        assert_eq!(select_best(&records), Some(0));
    }

    #[test]
    fn test_strictly_higher_wins() {
        let records = vec![
            record(ModelKind::NaiveBayes, 0.9, 0.80),
            record(ModelKind::RandomForest, 1.0, 0.82),
        ];
        assert_eq!(select_best(&records), Some(1));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let records = vec![
            record(ModelKind::NaiveBayes, 0.9, 0.80),
            record(ModelKind::LogisticRegression, 0.9, 0.90),
            record(ModelKind::LinearSvm, 0.9, 0.80),
        ];
        let ranked = rank(&records);
        let order: Vec<ModelKind> = ranked.iter().map(|r| r.model).collect();
        assert_eq!(
            order,
            vec![ModelKind::LogisticRegression, ModelKind::NaiveBayes, ModelKind::LinearSvm]
        );
    }

    fn toy_data() -> EvaluationData {
        let point = |c: usize, jitter: f64| {
            let mut dense = vec![0.05; 3];
            dense[c] = 1.0 + jitter;
            FeatureVector::from_dense(&dense)
        };
        let mut train_x = Vec::new();
        let mut train_y = Vec::new();
        for i in 0..10 {
            for c in 0..3 {
                train_x.push(point(c, i as f64 * 0.01));
                train_y.push(c);
            }
        }
        let test_x = (0..3).map(|c| point(c, 0.03)).collect();
        EvaluationData {
            train_x,
            train_y,
            test_x,
            test_y: vec![0, 1, 2],
            categories: CategorySet::new(["A", "B", "C"]).unwrap(),
        }
    }

    fn fast_config() -> TrainerConfig {
        let mut config = TrainerConfig::default();
        config.candidates.logistic_regression.max_iter = 200;
        config.candidates.linear_svm.max_iter = 200;
        config.candidates.random_forest.n_estimators = 10;
        config
    }

    #[test]
    fn test_evaluate_all_candidates() {
        let data = toy_data();
        let config = fast_config();
        let mut evaluation = evaluate(&ModelKind::ALL, &config, &data);

        assert!(evaluation.failures.is_empty());
        assert_eq!(evaluation.candidates.len(), 4);
        for candidate in &evaluation.candidates {
            let r = &candidate.record;
            assert_eq!(r.cv_scores.len(), 5);
            assert_eq!(r.is_overfitting, r.overfitting_gap > 0.10);
            assert!(r.auc().is_some());
            assert_eq!(r.report.categories.len(), 3);
        }

        let best = evaluation.take_best().unwrap();
        assert_eq!(best.record.test_accuracy, 1.0);
        assert_eq!(best.record.model, ModelKind::NaiveBayes);
        assert_eq!(evaluation.candidates.len(), 3);
    }

    #[test]
    fn test_failed_candidate_is_recorded_not_fatal() {
        let data = toy_data();
        let mut config = fast_config();
        config.candidates.naive_bayes.alpha = -1.0;

        let evaluation = evaluate(&ModelKind::ALL, &config, &data);
        assert_eq!(evaluation.failures.len(), 1);
        assert_eq!(evaluation.failures[0].model, ModelKind::NaiveBayes);
        assert_eq!(evaluation.candidates.len(), 3);
        assert!(
            evaluation
                .records()
                .iter()
                .all(|r| r.model != ModelKind::NaiveBayes)
        );
    }
}
