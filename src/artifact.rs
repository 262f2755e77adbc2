//! Persistence of the trained (extractor, model, metadata) triple.

pub mod metadata;
pub mod store;

use crate::feature::TfIdfVectorizer;
use crate::model::TrainedModel;

pub use metadata::{BlobChecksums, ModelMetadata};
pub use store::ArtifactStore;

/// The three co-dependent products of a training run.
///
/// They are saved and loaded together; the model's class indices refer to
/// `metadata.categories` and its feature indices to the extractor's
/// vocabulary.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub extractor: TfIdfVectorizer,
    pub model: TrainedModel,
    pub metadata: ModelMetadata,
}

impl ArtifactSet {
    pub fn save(&self, store: &ArtifactStore) -> crate::error::Result<ModelMetadata> {
        store.save(&self.extractor, &self.model, &self.metadata)
    }
}
