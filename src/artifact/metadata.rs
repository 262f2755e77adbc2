//! Human-readable summary stored next to the model blobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::corpus::CategorySet;
use crate::error::Result;
use crate::evaluation::EvaluationRecord;

/// CRC32 of the two binary blobs, filled in when the set is saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobChecksums {
    pub extractor: u32,
    pub model: u32,
}

/// Metadata of a trained artifact set.
///
/// `categories` is the authoritative category order: class index `i` of the
/// model is `categories[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    pub model_type: String,
    pub categories: Vec<String>,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub auc: Option<f64>,
    pub training_secs: f64,
    pub trained_at: DateTime<Utc>,
    pub vocabulary_size: usize,
    pub train_size: usize,
    pub test_size: usize,
    #[serde(default)]
    pub checksums: BlobChecksums,
}

impl ModelMetadata {
    /// Summarize the selected candidate.
    pub fn from_record(
        record: &EvaluationRecord,
        categories: &CategorySet,
        vocabulary_size: usize,
        train_size: usize,
        test_size: usize,
    ) -> Self {
        Self {
            model_name: record.name.clone(),
            model_type: record.model.type_name().to_string(),
            categories: categories.as_slice().to_vec(),
            train_accuracy: record.train_accuracy,
            test_accuracy: record.test_accuracy,
            cv_mean: record.cv_mean,
            cv_std: record.cv_std,
            auc: record.auc(),
            training_secs: record.training_secs,
            trained_at: Utc::now(),
            vocabulary_size,
            train_size,
            test_size,
            checksums: BlobChecksums::default(),
        }
    }

    pub fn category_set(&self) -> Result<CategorySet> {
        CategorySet::new(self.categories.iter().cloned())
    }
}
