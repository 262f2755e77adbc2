//! Command implementations for the docclass CLI.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result, bail};
use log::info;

use crate::artifact::ArtifactStore;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::corpus::{Corpus, SyntheticGenerator, default_categories, load_corpus, write_jsonl};
use crate::evaluation::{Trainer, roc_series};
use crate::inference::InferenceService;

/// Sentences classified after training to sanity-check the selected model.
const SAMPLE_TEXTS: &[&str] = &[
    "Facture numéro 789 montant total 500 euros TVA incluse",
    "Expérience professionnelle ingénieur Python compétences machine learning",
    "Contrat de travail CDI salaire mensuel clause de confidentialité",
    "Lettre de motivation candidature poste développeur",
    "Article de blog sur les nouvelles technologies",
];

/// Execute a CLI command.
pub fn execute_command(args: DocClassArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    match &args.command {
        Command::Train(train_args) => train(train_args, &config, &args),
        Command::Generate(generate_args) => generate(generate_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &config, &args),
        Command::PredictFile(file_args) => predict_file(file_args, &config, &args),
        Command::Categories => categories(&config, &args),
        Command::Importance(importance_args) => importance(importance_args, &config, &args),
        Command::Info => show_info(&config, &args),
    }
}

/// Configuration file (if any) with command line overrides applied.
fn resolve_config(args: &DocClassArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.artifact_dir {
        config.artifact_dir = dir.clone();
    }
    Ok(config)
}

fn open_service(config: &EngineConfig) -> InferenceService {
    InferenceService::open(
        ArtifactStore::new(&config.artifact_dir),
        config.inference.clone(),
    )
}

/// Train all candidates and publish the best one.
fn train(train_args: &TrainArgs, config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let mut config = config.clone();
    if let Some(seed) = train_args.seed {
        config.trainer.seed = seed;
    }

    let examples = load_corpus(&train_args.corpus)
        .with_context(|| format!("loading corpus {}", train_args.corpus.display()))?;
    let corpus = Corpus::new(examples)?;
    let default_category = &config.inference.default_category;
    if !corpus.categories().contains(default_category) {
        bail!(
            "default category '{default_category}' is not among the corpus categories ({}); \
             set inference.default_category in the configuration",
            corpus.categories().as_slice().join(", ")
        );
    }

    let outcome = Trainer::from_config(&config).train(&corpus)?;

    if let Some(path) = &train_args.roc_output {
        let series = roc_series(&outcome.ranking);
        let json = serde_json::to_string_pretty(&series)?;
        fs::write(path, json).with_context(|| format!("writing ROC curves to {}", path.display()))?;
        info!("Wrote {} ROC curves to {}", series.len(), path.display());
    }

    let store = ArtifactStore::new(&config.artifact_dir);
    let written = outcome
        .artifacts
        .save(&store)
        .with_context(|| format!("saving artifacts to {}", config.artifact_dir.display()))?;

    let service = InferenceService::new(store, config.inference.clone());
    service.load().context("reloading the published artifacts")?;

    let mut smoke_predictions = Vec::with_capacity(SAMPLE_TEXTS.len());
    for text in SAMPLE_TEXTS {
        let prediction = service.predict(text)?;
        info!(
            "{} -> {} ({:.1}%)",
            preview(text, 60),
            prediction.category,
            prediction.confidence * 100.0
        );
        smoke_predictions.push(SmokePrediction {
            text: (*text).to_string(),
            category: prediction.category,
            confidence: prediction.confidence,
        });
    }

    let summary = TrainingSummary {
        selected_model: written.model_name.clone(),
        model_type: written.model_type.clone(),
        test_accuracy: written.test_accuracy,
        cv_mean: written.cv_mean,
        cv_std: written.cv_std,
        auc: written.auc,
        vocabulary_size: written.vocabulary_size,
        artifact_dir: config.artifact_dir.display().to_string(),
        ranking: TrainingSummary::ranking_rows(&outcome.ranking),
        failures: outcome.failures.clone(),
        smoke_predictions,
        report: TrainingSummary::render_report(&outcome.ranking, &outcome.failures, &outcome.selected),
    };
    output_result(&summary, args)?;
    Ok(())
}

/// Write a synthetic corpus.
fn generate(generate_args: &GenerateArgs, args: &DocClassArgs) -> Result<()> {
    if generate_args.per_category == 0 {
        bail!("--per-category must be positive");
    }
    let examples = SyntheticGenerator::new(generate_args.seed).generate_shuffled(generate_args.per_category);
    write_jsonl(&generate_args.output, &examples)
        .with_context(|| format!("writing {}", generate_args.output.display()))?;

    output_result(
        &GenerationSummary {
            output: generate_args.output.display().to_string(),
            examples: examples.len(),
            categories: default_categories().into_iter().map(String::from).collect(),
        },
        args,
    )?;
    Ok(())
}

fn predict(predict_args: &PredictArgs, config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let service = open_service(config);
    if let [text] = predict_args.texts.as_slice() {
        output_result(&service.predict(text)?, args)?;
    } else {
        output_result(&service.predict_batch(&predict_args.texts)?, args)?;
    }
    Ok(())
}

fn predict_file(file_args: &PredictFileArgs, config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let file = File::open(&file_args.file)
        .with_context(|| format!("opening {}", file_args.file.display()))?;
    let texts = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()?;

    let service = open_service(config);
    output_result(&service.predict_batch(&texts)?, args)?;
    Ok(())
}

fn categories(config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let service = open_service(config);
    output_result(
        &CategoryList {
            categories: service.categories()?,
        },
        args,
    )?;
    Ok(())
}

fn importance(importance_args: &ImportanceArgs, config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let service = open_service(config);
    let features = service.feature_importance(&importance_args.category, importance_args.top_n)?;
    output_result(
        &ImportanceResult {
            category: importance_args.category.clone(),
            features,
        },
        args,
    )?;
    Ok(())
}

fn show_info(config: &EngineConfig, args: &DocClassArgs) -> Result<()> {
    let service = open_service(config);
    output_result(&service.model_info(), args)?;
    Ok(())
}
