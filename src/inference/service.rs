//! The inference service and its load state machine.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::artifact::{ArtifactSet, ArtifactStore, ModelMetadata};
use crate::config::InferenceConfig;
use crate::corpus::CategorySet;
use crate::error::{DocClassError, Result};
use crate::feature::TfIdfVectorizer;
use crate::inference::prediction::{
    BatchItem, BatchPrediction, Distribution, FeatureWeight, ModelInfo, ModelStatus, Prediction,
};
use crate::model::{Classifier, TrainedModel, argmax};

/// An immutable, validated artifact set held by the service.
#[derive(Debug)]
pub struct LoadedModel {
    extractor: TfIdfVectorizer,
    model: TrainedModel,
    metadata: ModelMetadata,
    categories: CategorySet,
}

impl LoadedModel {
    pub fn new(set: ArtifactSet) -> Result<Self> {
        let categories = set.metadata.category_set()?;
        if !set.model.is_fitted() {
            return Err(DocClassError::inference("model is not fitted"));
        }
        Ok(Self {
            extractor: set.extractor,
            model: set.model,
            metadata: set.metadata,
            categories,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn extractor(&self) -> &TfIdfVectorizer {
        &self.extractor
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }
}

#[derive(Debug)]
enum ServiceState {
    Unloaded { last_error: Option<String> },
    Loaded(Arc<LoadedModel>),
}

/// Answers classification queries from one loaded artifact set.
///
/// The service starts unloaded. [`load`](Self::load) reads the published
/// set from the store and swaps it in under a write lock; queries clone the
/// current `Arc` under a read lock and never observe a half-swapped set.
#[derive(Debug)]
pub struct InferenceService {
    store: ArtifactStore,
    config: InferenceConfig,
    state: RwLock<ServiceState>,
}

impl InferenceService {
    pub fn new(store: ArtifactStore, config: InferenceConfig) -> Self {
        Self {
            store,
            config,
            state: RwLock::new(ServiceState::Unloaded { last_error: None }),
        }
    }

    /// Create the service and attempt a first load. A failed load is logged
    /// and leaves the service unloaded.
    pub fn open(store: ArtifactStore, config: InferenceConfig) -> Self {
        let service = Self::new(store, config);
        if let Err(e) = service.load() {
            debug!("Starting unloaded: {e}");
        }
        service
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Load the published set. On failure the service is unloaded and the
    /// reason is kept for [`last_error`](Self::last_error).
    pub fn load(&self) -> Result<()> {
        match self.store.load().and_then(|set| self.admit(set)) {
            Ok(loaded) => {
                self.swap_in(loaded);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load model from {}: {e}", self.store.directory().display());
                *self.state.write() = ServiceState::Unloaded {
                    last_error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }

    /// Load the published set, keeping the current one if that fails.
    pub fn reload(&self) -> Result<()> {
        if !self.is_loaded() {
            return self.load();
        }
        let loaded = self
            .store
            .load()
            .and_then(|set| self.admit(set))
            .inspect_err(|e| warn!("Reload failed, keeping current model: {e}"))?;
        self.swap_in(loaded);
        Ok(())
    }

    /// Serve an in-memory set without going through the store.
    pub fn install(&self, set: ArtifactSet) -> Result<()> {
        self.swap_in(self.admit(set)?);
        Ok(())
    }

    /// Validate a set for serving. The configured default category must be
    /// one of the model's categories.
    fn admit(&self, set: ArtifactSet) -> Result<LoadedModel> {
        let loaded = LoadedModel::new(set)?;
        if !loaded.categories.contains(&self.config.default_category) {
            return Err(DocClassError::config(format!(
                "default category '{}' is not one of the model's categories ({})",
                self.config.default_category,
                loaded.categories.as_slice().join(", ")
            )));
        }
        Ok(loaded)
    }

    fn swap_in(&self, loaded: LoadedModel) {
        info!(
            "Serving {} ({} categories)",
            loaded.metadata.model_name,
            loaded.categories.len()
        );
        *self.state.write() = ServiceState::Loaded(Arc::new(loaded));
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.read(), ServiceState::Loaded(_))
    }

    /// Reason of the last failed load, while unloaded.
    pub fn last_error(&self) -> Option<String> {
        match &*self.state.read() {
            ServiceState::Unloaded { last_error } => last_error.clone(),
            ServiceState::Loaded(_) => None,
        }
    }

    /// The currently loaded set.
    pub fn snapshot(&self) -> Result<Arc<LoadedModel>> {
        match &*self.state.read() {
            ServiceState::Loaded(loaded) => Ok(Arc::clone(loaded)),
            ServiceState::Unloaded { last_error } => Err(DocClassError::inference(match last_error {
                Some(reason) => format!("model not loaded: {reason}"),
                None => "model not loaded".to_string(),
            })),
        }
    }

    /// Classify one text.
    ///
    /// Empty or whitespace-only text yields the configured default category
    /// with confidence 0.0 and an empty distribution, without consulting the
    /// model.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let loaded = self.snapshot()?;
        self.predict_with(&loaded, text)
    }

    /// Classify every text against the same loaded set. Each text succeeds or
    /// fails on its own.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<BatchPrediction> {
        let loaded = self.snapshot()?;
        let items = texts
            .iter()
            .enumerate()
            .map(|(index, text)| match self.predict_with(&loaded, text.as_ref()) {
                Ok(prediction) => BatchItem::Success { index, prediction },
                Err(e) => BatchItem::Failure {
                    index,
                    error: e.to_string(),
                },
            })
            .collect();
        Ok(BatchPrediction::from_items(items))
    }

    fn predict_with(&self, loaded: &LoadedModel, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Ok(Prediction {
                category: self.config.default_category.clone(),
                confidence: 0.0,
                distribution: Distribution::default(),
            });
        }

        let x = loaded.extractor.transform(text);
        let probabilities = loaded.model.predict_proba(&x);
        if probabilities.len() != loaded.categories.len() {
            return Err(DocClassError::inference(format!(
                "model returned {} scores for {} categories",
                probabilities.len(),
                loaded.categories.len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(DocClassError::inference("model returned non-finite probabilities"));
        }

        let best = argmax(&probabilities)
            .ok_or_else(|| DocClassError::inference("model returned no probabilities"))?;
        let category = loaded
            .categories
            .name(best)
            .ok_or_else(|| DocClassError::inference(format!("no category at index {best}")))?
            .to_string();

        let decimals = self.config.probability_decimals;
        let distribution = Distribution::new(
            loaded
                .categories
                .iter()
                .zip(&probabilities)
                .map(|(name, &p)| (name.to_string(), round_to(p, decimals)))
                .collect(),
        );
        let confidence = round_to(probabilities[best], decimals);

        debug!("Predicted {category} ({confidence:.4}) for {} chars", text.len());
        Ok(Prediction {
            category,
            confidence,
            distribution,
        })
    }

    /// Category names in model order.
    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.categories.as_slice().to_vec())
    }

    /// The `top_n` vocabulary terms with the largest coefficient for
    /// `category`, by descending weight.
    pub fn feature_importance(&self, category: &str, top_n: usize) -> Result<Vec<FeatureWeight>> {
        let loaded = self.snapshot()?;
        let index = loaded
            .categories
            .index_of(category)
            .ok_or_else(|| DocClassError::inference(format!("unknown category '{category}'")))?;
        let coefficients = loaded.model.coefficients().ok_or_else(|| {
            DocClassError::inference(format!(
                "{} exposes no per-category linear coefficients",
                loaded.model.name()
            ))
        })?;
        let row = coefficients
            .get(index)
            .ok_or_else(|| DocClassError::inference(format!("no coefficients for '{category}'")))?;

        let names = loaded.extractor.feature_names();
        let mut order: Vec<usize> = (0..row.len().min(names.len())).collect();
        order.sort_by(|&a, &b| row[b].total_cmp(&row[a]).then(a.cmp(&b)));

        let decimals = self.config.importance_decimals;
        Ok(order
            .into_iter()
            .take(top_n)
            .map(|i| FeatureWeight {
                term: names[i].clone(),
                weight: round_to(row[i], decimals),
            })
            .collect())
    }

    /// Status of the service and, when loaded, a summary of the model.
    pub fn model_info(&self) -> ModelInfo {
        let artifact_dir = self.store.directory().display().to_string();
        match &*self.state.read() {
            ServiceState::Loaded(loaded) => ModelInfo {
                status: ModelStatus::Loaded,
                model_type: Some(loaded.metadata.model_type.clone()),
                model_name: Some(loaded.metadata.model_name.clone()),
                categories: loaded.categories.as_slice().to_vec(),
                feature_count: loaded.extractor.vocabulary_size(),
                test_accuracy: Some(loaded.metadata.test_accuracy),
                trained_at: Some(loaded.metadata.trained_at),
                artifact_dir,
                last_error: None,
            },
            ServiceState::Unloaded { last_error } => ModelInfo {
                status: ModelStatus::NotLoaded,
                model_type: None,
                model_name: None,
                categories: Vec::new(),
                feature_count: 0,
                test_accuracy: None,
                trained_at: None,
                artifact_dir,
                last_error: last_error.clone(),
            },
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
