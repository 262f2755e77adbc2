//! Serving predictions from a persisted artifact set.

pub mod prediction;
pub mod service;

pub use prediction::{
    BatchItem, BatchPrediction, Distribution, FeatureWeight, ModelInfo, ModelStatus, Prediction,
};
pub use service::{InferenceService, LoadedModel};
