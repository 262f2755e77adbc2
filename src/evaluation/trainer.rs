//! End-to-end training run: split, vectorize, evaluate, select.

use log::info;

use crate::artifact::{ArtifactSet, ModelMetadata};
use crate::config::{EngineConfig, TrainerConfig, VectorizerConfig};
use crate::corpus::Corpus;
use crate::error::{DocClassError, Result};
use crate::evaluation::evaluator::{
    CandidateFailure, EvaluationData, EvaluationRecord, evaluate, rank,
};
use crate::evaluation::split::stratified_split;
use crate::feature::TfIdfVectorizer;
use crate::model::ModelKind;

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Extractor, selected model and its metadata, ready to be saved.
    pub artifacts: ArtifactSet,
    /// Record of the selected model.
    pub selected: EvaluationRecord,
    /// All successful candidates by descending test accuracy.
    pub ranking: Vec<EvaluationRecord>,
    pub failures: Vec<CandidateFailure>,
}

/// Runs the offline training procedure over a fixed candidate list.
#[derive(Debug, Clone)]
pub struct Trainer {
    vectorizer: VectorizerConfig,
    config: TrainerConfig,
    candidates: Vec<ModelKind>,
}

impl Trainer {
    pub fn new(vectorizer: VectorizerConfig, config: TrainerConfig) -> Self {
        Self {
            vectorizer,
            config,
            candidates: ModelKind::ALL.to_vec(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.vectorizer.clone(), config.trainer.clone())
    }

    /// Restrict or reorder the candidates. Order decides ties.
    pub fn with_candidates(mut self, candidates: Vec<ModelKind>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn candidates(&self) -> &[ModelKind] {
        &self.candidates
    }

    /// Train every candidate on `corpus` and select the best one.
    ///
    /// Corpus-level problems (unstratifiable categories, empty vocabulary)
    /// abort the run. Per-candidate fit failures only remove that candidate;
    /// the run fails if none is left.
    pub fn train(&self, corpus: &Corpus) -> Result<TrainingOutcome> {
        self.vectorizer.validate()?;
        self.config.validate()?;
        if self.candidates.is_empty() {
            return Err(DocClassError::config("no candidate models configured"));
        }

        let categories = corpus.categories().clone();
        info!(
            "Training on {} examples in {} categories",
            corpus.len(),
            categories.len()
        );
        for (name, count) in categories.iter().zip(corpus.class_counts()) {
            info!("  {name}: {count}");
            if count < 2 {
                return Err(DocClassError::data(format!(
                    "category '{name}' has {count} example(s); at least 2 are needed to stratify"
                )));
            }
        }

        let split = stratified_split(
            corpus.labels(),
            categories.len(),
            self.config.test_fraction,
            self.config.seed,
        )?;
        info!("Train: {} examples, test: {} examples", split.train.len(), split.test.len());

        let texts = corpus.texts();
        let labels = corpus.labels();
        let train_texts: Vec<&str> = split.train.iter().map(|&i| texts[i]).collect();
        let test_texts: Vec<&str> = split.test.iter().map(|&i| texts[i]).collect();

        let (extractor, train_x) = TfIdfVectorizer::fit_transform(&self.vectorizer, &train_texts)?;
        let test_x = extractor.transform_batch(&test_texts);
        info!("Vocabulary: {} terms", extractor.vocabulary_size());

        let data = EvaluationData {
            train_x,
            train_y: split.train.iter().map(|&i| labels[i]).collect(),
            test_x,
            test_y: split.test.iter().map(|&i| labels[i]).collect(),
            categories: categories.clone(),
        };

        let mut evaluation = evaluate(&self.candidates, &self.config, &data);
        let ranking = rank(&evaluation.records());
        let failures = std::mem::take(&mut evaluation.failures);

        let best = evaluation.take_best().ok_or_else(|| {
            DocClassError::training("all candidates", "no candidate model could be fitted")
        })?;
        info!(
            "Best model: {} ({:.2}% test accuracy)",
            best.record.name,
            best.record.test_accuracy * 100.0
        );

        let metadata = ModelMetadata::from_record(
            &best.record,
            &categories,
            extractor.vocabulary_size(),
            split.train.len(),
            split.test.len(),
        );

        Ok(TrainingOutcome {
            artifacts: ArtifactSet {
                extractor,
                model: best.model,
                metadata,
            },
            selected: best.record,
            ranking,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LabeledExample;
    use crate::model::Classifier;

    fn corpus() -> Corpus {
        let mut examples = Vec::new();
        for i in 0..10 {
            examples.push(LabeledExample::new(
                format!("facture montant total tva {i}"),
                "Facture",
            ));
            examples.push(LabeledExample::new(
                format!("contrat clause signature durée {i}"),
                "Contrat",
            ));
        }
        Corpus::new(examples).unwrap()
    }

    fn fast_trainer() -> Trainer {
        let mut config = TrainerConfig::default();
        config.candidates.logistic_regression.max_iter = 100;
        config.candidates.linear_svm.max_iter = 100;
        config.candidates.random_forest.n_estimators = 5;
        Trainer::new(VectorizerConfig::default(), config)
    }

    #[test]
    fn test_train_selects_a_fitted_model() {
        let outcome = fast_trainer().train(&corpus()).unwrap();
        let metadata = &outcome.artifacts.metadata;

        assert_eq!(metadata.categories, vec!["Contrat", "Facture"]);
        assert_eq!(metadata.train_size + metadata.test_size, 20);
        assert_eq!(metadata.test_size, 4);
        assert_eq!(metadata.model_name, outcome.selected.name);
        assert!(outcome.artifacts.model.is_fitted());
        assert_eq!(outcome.ranking.len(), 4);
        assert_eq!(outcome.ranking[0].test_accuracy, outcome.selected.test_accuracy);
    }

    #[test]
    fn test_unstratifiable_corpus_aborts() {
        let examples = vec![
            LabeledExample::new("facture montant", "Facture"),
            LabeledExample::new("facture total", "Facture"),
            LabeledExample::new("contrat clause", "Contrat"),
        ];
        let corpus = Corpus::new(examples).unwrap();
        let err = fast_trainer().train(&corpus).unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("category 'Contrat' has 1 example(s)"));
    }

    #[test]
    fn test_all_candidates_failing_is_a_training_error() {
        let mut trainer = fast_trainer().with_candidates(vec![ModelKind::NaiveBayes]);
        trainer.config.candidates.naive_bayes.alpha = 0.0;
        assert!(trainer.train(&corpus()).unwrap_err().is_training());
    }
}
