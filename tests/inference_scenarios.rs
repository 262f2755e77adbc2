use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tempfile::TempDir;

use docclass::artifact::ArtifactStore;
use docclass::config::{InferenceConfig, TrainerConfig, VectorizerConfig};
use docclass::corpus::{Corpus, LabeledExample, SyntheticGenerator};
use docclass::error::{DocClassError, Result};
use docclass::evaluation::{Trainer, TrainingOutcome};
use docclass::inference::{BatchItem, InferenceService, ModelStatus};
use docclass::model::ModelKind;

const FACTURE_TEXT: &str = "Facture numéro 789 montant total 500 euros TVA incluse";

fn train_small(candidates: Vec<ModelKind>) -> Result<TrainingOutcome> {
    let mut config = TrainerConfig::default();
    config.candidates.logistic_regression.max_iter = 150;
    config.candidates.linear_svm.max_iter = 150;
    config.candidates.random_forest.n_estimators = 10;
    let corpus = Corpus::new(SyntheticGenerator::new(42).generate(40))?;
    Trainer::new(VectorizerConfig::default(), config)
        .with_candidates(candidates)
        .train(&corpus)
}

/// Naive Bayes trained on the synthetic examples of `keep` only.
fn train_subset(keep: &[&str]) -> Result<TrainingOutcome> {
    let examples: Vec<LabeledExample> = SyntheticGenerator::new(5)
        .generate(30)
        .into_iter()
        .filter(|e| keep.contains(&e.category.as_str()))
        .collect();
    Trainer::new(VectorizerConfig::default(), TrainerConfig::default())
        .with_candidates(vec![ModelKind::NaiveBayes])
        .train(&Corpus::new(examples)?)
}

fn published_service(dir: &TempDir, candidates: Vec<ModelKind>) -> Result<InferenceService> {
    let outcome = train_small(candidates)?;
    let store = ArtifactStore::new(dir.path());
    outcome.artifacts.save(&store)?;
    let service = InferenceService::new(store, InferenceConfig::default());
    service.load()?;
    Ok(service)
}

#[test]
fn facture_sentence_gets_a_valid_category() -> Result<()> {
    let dir = TempDir::new()?;
    let service = published_service(&dir, vec![ModelKind::LogisticRegression])?;

    let prediction = service.predict(FACTURE_TEXT)?;
    let categories = service.categories()?;
    assert!(categories.contains(&prediction.category));
    assert!((0.0..=1.0).contains(&prediction.confidence));
    assert_eq!(prediction.distribution.len(), categories.len());
    assert!((prediction.distribution.sum() - 1.0).abs() < 1e-3);
    assert_eq!(prediction.distribution.max(), Some(prediction.confidence));
    Ok(())
}

#[test]
fn predictions_survive_a_save_load_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let outcome = train_small(vec![ModelKind::NaiveBayes, ModelKind::LinearSvm])?;
    let texts = [
        FACTURE_TEXT,
        "Expérience professionnelle ingénieur Python compétences",
        "Contrat de travail CDI salaire mensuel",
        "Lettre de motivation candidature poste",
        "Article de blog sur les nouvelles technologies",
    ];

    let in_memory = InferenceService::new(ArtifactStore::new(dir.path()), InferenceConfig::default());
    in_memory.install(outcome.artifacts.clone())?;
    let before = in_memory.predict_batch(&texts)?;

    let store = ArtifactStore::new(dir.path());
    outcome.artifacts.save(&store)?;
    let reloaded = InferenceService::new(store, InferenceConfig::default());
    reloaded.load()?;
    let after = reloaded.predict_batch(&texts)?;

    assert_eq!(before.successful, texts.len());
    for (b, a) in before.results.iter().zip(&after.results) {
        let (b, a) = (b.prediction().unwrap(), a.prediction().unwrap());
        assert_eq!(b.category, a.category);
        assert_eq!(b.distribution, a.distribution);
    }
    Ok(())
}

#[test]
fn unloaded_service_reports_status_and_refuses_queries() -> Result<()> {
    let dir = TempDir::new()?;
    let service = InferenceService::open(ArtifactStore::new(dir.path()), InferenceConfig::default());

    assert!(!service.is_loaded());
    assert!(service.last_error().is_some());
    assert!(service.predict(FACTURE_TEXT).unwrap_err().is_inference());
    assert!(service.categories().unwrap_err().is_inference());

    let info = service.model_info();
    assert_eq!(info.status, ModelStatus::NotLoaded);
    assert!(info.categories.is_empty());

    // Publishing later and reloading brings the service up.
    let outcome = train_small(vec![ModelKind::NaiveBayes])?;
    outcome.artifacts.save(service.store())?;
    service.reload()?;
    assert!(service.is_loaded());
    assert_eq!(service.model_info().status, ModelStatus::Loaded);
    Ok(())
}

#[test]
fn blank_text_maps_to_the_default_category() -> Result<()> {
    let dir = TempDir::new()?;
    let service = published_service(&dir, vec![ModelKind::NaiveBayes])?;

    let prediction = service.predict("   \n\t ")?;
    assert_eq!(prediction.category, "Autre");
    assert_eq!(prediction.confidence, 0.0);
    assert!(prediction.distribution.is_empty());
    Ok(())
}

#[test]
fn batch_counts_match_the_input() -> Result<()> {
    let dir = TempDir::new()?;
    let service = published_service(&dir, vec![ModelKind::NaiveBayes])?;

    let texts = vec![FACTURE_TEXT.to_string(), String::new(), "curriculum vitae".to_string()];
    let batch = service.predict_batch(&texts)?;
    assert_eq!(batch.total, 3);
    assert_eq!(batch.successful + batch.failed, batch.total);
    for (i, item) in batch.results.iter().enumerate() {
        assert_eq!(item.index(), i);
        assert!(matches!(item, BatchItem::Success { .. }));
    }
    Ok(())
}

#[test]
fn unknown_category_importance_fails_without_changing_state() -> Result<()> {
    let dir = TempDir::new()?;
    let service = published_service(&dir, vec![ModelKind::LogisticRegression])?;
    let before = service.model_info();

    let err = service.feature_importance("Inexistante", 5).unwrap_err();
    assert!(err.is_inference());
    assert!(service.is_loaded());
    assert_eq!(service.model_info().model_name, before.model_name);

    let top = service.feature_importance("Facture", 5)?;
    assert_eq!(top.len(), 5);
    for pair in top.windows(2) {
        assert!(pair[0].weight >= pair[1].weight);
    }
    Ok(())
}

#[test]
fn concurrent_predictions_share_one_model() -> Result<()> {
    let dir = TempDir::new()?;
    let service = Arc::new(published_service(&dir, vec![ModelKind::NaiveBayes])?);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.predict(FACTURE_TEXT).map(|p| p.category))
        })
        .collect();

    let expected = service.predict(FACTURE_TEXT)?.category;
    for handle in handles {
        assert_eq!(handle.join().unwrap()?, expected);
    }
    Ok(())
}

#[test]
fn default_category_outside_the_model_is_rejected_at_load() -> Result<()> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path());
    train_subset(&["Contrat", "Facture"])?.artifacts.save(&store)?;

    let service = InferenceService::open(ArtifactStore::new(dir.path()), InferenceConfig::default());
    assert!(!service.is_loaded());
    assert!(matches!(service.load(), Err(DocClassError::Config(_))));
    assert!(service.predict("").unwrap_err().is_inference());

    let config = InferenceConfig {
        default_category: "Contrat".to_string(),
        ..InferenceConfig::default()
    };
    let service = InferenceService::open(store, config);
    let categories = service.categories()?;
    for text in ["", "   ", FACTURE_TEXT] {
        assert!(categories.contains(&service.predict(text)?.category));
    }
    Ok(())
}

#[test]
fn predictions_stay_consistent_while_models_are_swapped() -> Result<()> {
    let dir = TempDir::new()?;
    let full = train_small(vec![ModelKind::NaiveBayes])?.artifacts;
    let reduced = train_subset(&["Autre", "Facture"])?.artifacts;
    let full_categories = full.metadata.categories.clone();
    let reduced_categories = reduced.metadata.categories.clone();
    assert_ne!(full_categories, reduced_categories);

    let store = ArtifactStore::new(dir.path());
    full.save(&store)?;
    let service = Arc::new(InferenceService::new(store, InferenceConfig::default()));
    service.load()?;

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let done = Arc::clone(&done);
            let allowed = [full_categories.clone(), reduced_categories.clone()];
            thread::spawn(move || -> Result<usize> {
                let mut served = 0;
                while !done.load(Ordering::SeqCst) {
                    let prediction = service.predict(FACTURE_TEXT)?;
                    let names: Vec<String> =
                        prediction.distribution.iter().map(|(c, _)| c.to_string()).collect();
                    // The whole distribution comes from a single model.
                    assert!(allowed.contains(&names), "mixed categories: {names:?}");
                    assert!(names.contains(&prediction.category));
                    assert_eq!(service.predict("")?.category, "Autre");
                    served += 1;
                }
                Ok(served)
            })
        })
        .collect();

    let swaps = (0..20).try_for_each(|i| {
        let set = if i % 2 == 0 { &reduced } else { &full };
        set.save(service.store())?;
        service.reload()
    });
    done.store(true, Ordering::SeqCst);
    swaps?;

    for reader in readers {
        reader.join().unwrap()?;
    }
    assert!(service.is_loaded());
    Ok(())
}
