//! Error types for docclass.
//!
//! All fallible operations return [`DocClassError`]. The variants keep the
//! four failure kinds of the engine apart so callers can react to each one:
//!
//! - [`DocClassError::Data`]: the training corpus is empty, malformed or
//!   cannot be stratified. Aborts a training run.
//! - [`DocClassError::Training`]: one candidate algorithm failed to fit. The
//!   trainer records it and carries on with the remaining candidates.
//! - [`DocClassError::Artifact`]: the persisted artifact set is missing,
//!   incomplete or unreadable.
//! - [`DocClassError::Inference`]: a query was made against an unloaded
//!   service or named an unknown category.
//!
//! # Examples
//!
//! ```
//! use docclass::error::{DocClassError, Result};
//!
//! fn check_corpus(len: usize) -> Result<()> {
//!     if len == 0 {
//!         return Err(DocClassError::data("training corpus is empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_corpus(0).unwrap_err().is_data());
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for docclass operations.
#[derive(Error, Debug)]
pub enum DocClassError {
    /// Empty, missing or unstratifiable training data.
    #[error("Data error: {0}")]
    Data(String),

    /// A single candidate model failed to fit.
    #[error("Training error ({candidate}): {message}")]
    Training { candidate: String, message: String },

    /// The persisted artifact set could not be used.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// A query could not be answered by the inference service.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the artifact store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// No artifact set has ever been published in the directory.
    #[error("no artifact set published in {}", directory.display())]
    NotFound { directory: PathBuf },

    /// The set is published but one of its blobs is absent.
    #[error("artifact blob '{blob}' is missing")]
    Missing { blob: String },

    /// A blob exists but cannot be decoded or fails its checksum.
    #[error("artifact blob '{blob}' is unreadable: {reason}")]
    Corrupt { blob: String, reason: String },
}

/// Result type alias for operations that may fail with DocClassError.
pub type Result<T> = std::result::Result<T, DocClassError>;

impl DocClassError {
    /// Create a new data error.
    pub fn data<S: Into<String>>(msg: S) -> Self {
        DocClassError::Data(msg.into())
    }

    /// Create a new per-candidate training error.
    pub fn training<C: Into<String>, S: Into<String>>(candidate: C, msg: S) -> Self {
        DocClassError::Training {
            candidate: candidate.into(),
            message: msg.into(),
        }
    }

    /// Create a new inference error.
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        DocClassError::Inference(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DocClassError::Config(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        DocClassError::Serialization(msg.into())
    }

    pub fn is_data(&self) -> bool {
        matches!(self, DocClassError::Data(_))
    }

    pub fn is_training(&self) -> bool {
        matches!(self, DocClassError::Training { .. })
    }

    pub fn is_artifact(&self) -> bool {
        matches!(self, DocClassError::Artifact(_))
    }

    pub fn is_inference(&self) -> bool {
        matches!(self, DocClassError::Inference(_))
    }
}

impl From<bincode::Error> for DocClassError {
    fn from(err: bincode::Error) -> Self {
        DocClassError::Serialization(err.to_string())
    }
}
