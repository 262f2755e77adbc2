//! Response types of the inference service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Probability per category, in the model's category order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(Vec<(String, f64)>);

impl Distribution {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.iter().find(|(c, _)| c == category).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(c, p)| (c.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }

    pub fn max(&self) -> Option<f64> {
        self.0.iter().map(|(_, p)| *p).reduce(f64::max)
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, probability) in &self.0 {
            map.serialize_entry(category, probability)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = Distribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from category to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Distribution, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((category, probability)) = access.next_entry::<String, f64>()? {
                    entries.push((category, probability));
                }
                Ok(Distribution(entries))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}

/// Category assigned to one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    /// Probability of `category`; 0.0 for the empty-text default.
    pub confidence: f64,
    pub distribution: Distribution,
}

/// Outcome of one text in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success { index: usize, prediction: Prediction },
    Failure { index: usize, error: String },
}

impl BatchItem {
    pub fn index(&self) -> usize {
        match self {
            BatchItem::Success { index, .. } | BatchItem::Failure { index, .. } => *index,
        }
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            BatchItem::Success { prediction, .. } => Some(prediction),
            BatchItem::Failure { .. } => None,
        }
    }
}

/// Per-item results of a batch with aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItem>,
}

impl BatchPrediction {
    pub fn from_items(results: Vec<BatchItem>) -> Self {
        let successful = results.iter().filter(|r| r.prediction().is_some()).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }
}

/// One vocabulary term and its weight for a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    NotLoaded,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Loaded => f.write_str("loaded"),
            ModelStatus::NotLoaded => f.write_str("not_loaded"),
        }
    }
}

/// Description of the loaded model, or of why none is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub status: ModelStatus,
    pub model_type: Option<String>,
    pub model_name: Option<String>,
    pub categories: Vec<String>,
    pub feature_count: usize,
    pub test_accuracy: Option<f64>,
    pub trained_at: Option<DateTime<Utc>>,
    pub artifact_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_keeps_order_in_json() {
        let dist = Distribution::new(vec![
            ("Facture".to_string(), 0.7),
            ("Autre".to_string(), 0.2),
            ("CV".to_string(), 0.1),
        ]);
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(json, r#"{"Facture":0.7,"Autre":0.2,"CV":0.1}"#);

        let back: Distribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dist);
        assert_eq!(back.max(), Some(0.7));
    }

    #[test]
    fn test_batch_envelope_counts() {
        let prediction = Prediction {
            category: "CV".to_string(),
            confidence: 0.9,
            distribution: Distribution::default(),
        };
        let batch = BatchPrediction::from_items(vec![
            BatchItem::Success { index: 0, prediction },
            BatchItem::Failure {
                index: 1,
                error: "boom".to_string(),
            },
        ]);
        assert_eq!((batch.total, batch.successful, batch.failed), (2, 1, 1));

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["results"][1]["error"], "boom");
        assert_eq!(json["results"][0]["prediction"]["category"], "CV");
    }
}
