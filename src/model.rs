//! Candidate classification algorithms.
//!
//! Every algorithm implements [`Classifier`] over sparse
//! [`FeatureVector`](crate::feature::FeatureVector)s and category indices.
//! [`TrainedModel`] wraps them in one serializable enum so the selected
//! model can be persisted without knowing its concrete type.

pub mod classifier;
pub mod linear_svm;
pub mod logistic;
pub mod naive_bayes;
pub mod random_forest;
pub mod trained;

pub use classifier::{Classifier, ScoreKind, argmax, softmax};
pub use linear_svm::LinearSvm;
pub use logistic::LogisticRegression;
pub use naive_bayes::MultinomialNaiveBayes;
pub use random_forest::RandomForest;
pub use trained::{ModelKind, TrainedModel};
