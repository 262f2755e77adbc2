use docclass::config::{EngineConfig, TrainerConfig, VectorizerConfig};
use docclass::corpus::{Corpus, LabeledExample, SyntheticGenerator};
use docclass::error::Result;
use docclass::evaluation::{Trainer, format_ranking, roc_series};
use docclass::model::ModelKind;

fn fast_trainer_config() -> TrainerConfig {
    let mut config = TrainerConfig::default();
    config.candidates.logistic_regression.max_iter = 150;
    config.candidates.linear_svm.max_iter = 150;
    config.candidates.random_forest.n_estimators = 15;
    config.candidates.random_forest.max_depth = 12;
    config
}

fn synthetic_corpus(per_category: usize, seed: u64) -> Result<Corpus> {
    Corpus::new(SyntheticGenerator::new(seed).generate(per_category))
}

#[test]
fn synthetic_corpus_trains_every_candidate_and_selects_the_best() -> Result<()> {
    let corpus = synthetic_corpus(150, 42)?;
    let trainer = Trainer::new(VectorizerConfig::default(), fast_trainer_config());
    let outcome = trainer.train(&corpus)?;

    let metadata = &outcome.artifacts.metadata;
    assert_eq!(metadata.test_size, 150);
    assert_eq!(metadata.train_size, 600);
    assert_eq!(metadata.categories.len(), 5);
    assert!(metadata.vocabulary_size > 0);
    assert_eq!(metadata.vocabulary_size, outcome.artifacts.extractor.vocabulary_size());

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.ranking.len(), ModelKind::ALL.len());
    for pair in outcome.ranking.windows(2) {
        assert!(pair[0].test_accuracy >= pair[1].test_accuracy);
    }

    // The selection is the top of the ranking, and the earliest candidate on ties.
    let best = outcome.ranking[0].test_accuracy;
    let first_best = ModelKind::ALL
        .iter()
        .find(|kind| {
            outcome
                .ranking
                .iter()
                .any(|r| r.model == **kind && r.test_accuracy == best)
        })
        .copied();
    assert_eq!(Some(outcome.selected.model), first_best);
    assert_eq!(metadata.model_name, outcome.selected.name);
    assert_eq!(outcome.artifacts.model.kind(), outcome.selected.model);

    // Keyword-driven synthetic text is close to separable.
    assert!(outcome.selected.test_accuracy > 0.8);
    for record in &outcome.ranking {
        assert_eq!(record.cv_scores.len(), 5);
        assert!((0.0..=1.0).contains(&record.test_accuracy));
        assert!(record.training_secs >= 0.0);
        let support: usize = record.report.categories.iter().map(|c| c.support).sum();
        assert_eq!(support, 150);
    }
    Ok(())
}

#[test]
fn training_is_reproducible_for_a_fixed_seed() -> Result<()> {
    let corpus = synthetic_corpus(40, 7)?;
    let trainer = Trainer::new(VectorizerConfig::default(), fast_trainer_config());

    let first = trainer.train(&corpus)?;
    let second = trainer.train(&corpus)?;

    assert_eq!(first.selected.model, second.selected.model);
    let first_scores: Vec<f64> = first.ranking.iter().map(|r| r.test_accuracy).collect();
    let second_scores: Vec<f64> = second.ranking.iter().map(|r| r.test_accuracy).collect();
    assert_eq!(first_scores, second_scores);
    Ok(())
}

#[test]
fn restricted_candidate_list_only_evaluates_those_models() -> Result<()> {
    let corpus = synthetic_corpus(30, 3)?;
    let trainer = Trainer::new(VectorizerConfig::default(), fast_trainer_config())
        .with_candidates(vec![ModelKind::NaiveBayes, ModelKind::LinearSvm]);
    let outcome = trainer.train(&corpus)?;

    assert_eq!(outcome.ranking.len(), 2);
    assert!(
        outcome
            .ranking
            .iter()
            .all(|r| matches!(r.model, ModelKind::NaiveBayes | ModelKind::LinearSvm))
    );
    Ok(())
}

#[test]
fn ranking_report_and_roc_export_cover_each_candidate() -> Result<()> {
    let corpus = synthetic_corpus(30, 11)?;
    let outcome = Trainer::new(VectorizerConfig::default(), fast_trainer_config()).train(&corpus)?;

    let table = format_ranking(&outcome.ranking, &outcome.failures);
    assert!(table.contains("MODEL COMPARISON"));
    for record in &outcome.ranking {
        assert!(table.contains(&record.name));
    }

    let series = roc_series(&outcome.ranking);
    assert_eq!(series.len(), outcome.ranking.len());
    for curve in &series {
        assert!((0.0..=1.0).contains(&curve.auc));
        assert_eq!(curve.fpr.len(), curve.tpr.len());
    }
    Ok(())
}

#[test]
fn category_with_a_single_example_is_a_data_error() -> Result<()> {
    let mut examples = SyntheticGenerator::new(1).generate(10);
    examples.push(LabeledExample::new("document unique", "Rare"));
    let corpus = Corpus::new(examples)?;

    let err = Trainer::from_config(&EngineConfig::default())
        .train(&corpus)
        .unwrap_err();
    assert!(err.is_data());
    assert!(err.to_string().contains("category 'Rare' has 1 example(s)"));
    Ok(())
}

#[test]
fn corpus_with_a_single_category_is_rejected() {
    let examples = vec![
        LabeledExample::new("facture montant", "Facture"),
        LabeledExample::new("facture tva", "Facture"),
    ];
    let err = Corpus::new(examples).unwrap_err();
    assert!(err.is_data());
}
