//! Criterion benchmarks for docclass.
//!
//! Covers term analysis, TF-IDF fitting and transformation, candidate model
//! fitting, and single/batch prediction through the inference service.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use docclass::analysis::TermAnalyzer;
use docclass::artifact::ArtifactStore;
use docclass::config::{CandidatesConfig, InferenceConfig, TrainerConfig, VectorizerConfig};
use docclass::corpus::{Corpus, LabeledExample, SyntheticGenerator};
use docclass::evaluation::Trainer;
use docclass::feature::TfIdfVectorizer;
use docclass::inference::InferenceService;
use docclass::model::{Classifier, ModelKind, TrainedModel};
use std::hint::black_box;

fn texts(examples: &[LabeledExample]) -> Vec<&str> {
    examples.iter().map(|e| e.text.as_str()).collect()
}

/// Benchmark term extraction.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let analyzer = TermAnalyzer::from_config(&VectorizerConfig::default());
    let examples = SyntheticGenerator::new(42).generate(20);

    group.bench_function("analyze_single_document", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&examples[0].text))))
    });

    group.throughput(Throughput::Elements(examples.len() as u64));
    group.bench_function("analyze_batch_documents", |b| {
        b.iter(|| {
            for example in &examples {
                black_box(analyzer.analyze(black_box(&example.text)));
            }
        })
    });

    group.finish();
}

/// Benchmark vectorizer fitting and transformation.
fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfidf");
    let config = VectorizerConfig::default();
    let examples = SyntheticGenerator::new(42).generate(150);
    let documents = texts(&examples);

    group.sample_size(20);
    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("fit_750_documents", |b| {
        b.iter(|| black_box(TfIdfVectorizer::fit(&config, black_box(&documents))))
    });

    if let Ok(vectorizer) = TfIdfVectorizer::fit(&config, &documents) {
        group.bench_function("transform_batch_750_documents", |b| {
            b.iter(|| black_box(vectorizer.transform_batch(black_box(&documents))))
        });
    }

    group.finish();
}

/// Benchmark fitting each candidate on a fixed feature matrix.
fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_fit");
    group.sample_size(10);

    let corpus = match Corpus::new(SyntheticGenerator::new(42).generate(60)) {
        Ok(corpus) => corpus,
        Err(_) => return,
    };
    let Ok((_, features)) = TfIdfVectorizer::fit_transform(&VectorizerConfig::default(), &corpus.texts())
    else {
        return;
    };
    let labels = corpus.labels().to_vec();
    let n_classes = corpus.categories().len();

    let mut candidates = CandidatesConfig::default();
    candidates.random_forest.n_estimators = 20;

    for kind in ModelKind::ALL {
        group.bench_function(kind.type_name(), |b| {
            b.iter(|| {
                let mut model = TrainedModel::untrained(kind, &candidates, 42);
                let _ = model.fit(black_box(&features), &labels, n_classes);
                black_box(model)
            })
        });
    }

    group.finish();
}

/// Benchmark prediction through the service.
fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");

    let mut config = TrainerConfig::default();
    config.candidates.logistic_regression.max_iter = 200;
    let Ok(corpus) = Corpus::new(SyntheticGenerator::new(7).generate(60)) else {
        return;
    };
    let Ok(outcome) = Trainer::new(VectorizerConfig::default(), config)
        .with_candidates(vec![ModelKind::LogisticRegression])
        .train(&corpus)
    else {
        return;
    };

    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let service = InferenceService::new(ArtifactStore::new(dir.path()), InferenceConfig::default());
    if service.install(outcome.artifacts).is_err() {
        return;
    }

    let queries: Vec<String> = SyntheticGenerator::new(99)
        .generate_shuffled(20)
        .into_iter()
        .map(|e| e.text)
        .collect();

    group.bench_function("predict_single", |b| {
        b.iter(|| black_box(service.predict(black_box("Facture numéro 789 montant total 500 euros"))))
    });

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("predict_batch_100", |b| {
        b.iter(|| black_box(service.predict_batch(black_box(&queries))))
    });

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_vectorizer, bench_inference);

// Separate group for slower benchmarks
criterion_group!(slow_benches, bench_models);

criterion_main!(benches, slow_benches);
