//! Feature extraction: text to fixed-width TF-IDF vectors.

pub mod tfidf;
pub mod vector;

pub use tfidf::TfIdfVectorizer;
pub use vector::FeatureVector;
