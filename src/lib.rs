//! # docclass
//!
//! Document classification engine: assigns one of a fixed set of categories
//! to free-form extracted text.
//!
//! ## Pipeline
//!
//! - [`feature`]: TF-IDF over 1..=3-word terms with accent folding
//! - [`evaluation`]: stratified split, four candidate models, cross-validation,
//!   ROC/AUC and overfitting diagnostics, selection by test accuracy
//! - [`artifact`]: atomic persistence of the (extractor, model, metadata) set
//! - [`inference`]: prediction, batch prediction and feature importance
//!
//! ```no_run
//! use docclass::artifact::ArtifactStore;
//! use docclass::config::EngineConfig;
//! use docclass::corpus::{Corpus, SyntheticGenerator};
//! use docclass::evaluation::Trainer;
//! use docclass::inference::InferenceService;
//!
//! let config = EngineConfig::default();
//! let corpus = Corpus::new(SyntheticGenerator::new(42).generate(150))?;
//! let outcome = Trainer::from_config(&config).train(&corpus)?;
//!
//! let store = ArtifactStore::new(&config.artifact_dir);
//! outcome.artifacts.save(&store)?;
//!
//! let service = InferenceService::new(store, config.inference.clone());
//! service.load()?;
//! let prediction = service.predict("Facture numéro 789 montant total 500 euros")?;
//! println!("{} ({:.2})", prediction.category, prediction.confidence);
//! # Ok::<(), docclass::error::DocClassError>(())
//! ```

pub mod analysis;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod inference;
pub mod model;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
