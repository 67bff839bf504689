//! Wire data types shared by the classifiers and the service

use serde::{Deserialize, Serialize};

/// An ordered sequence of numeric features
pub type FeatureVector = Vec<f64>;

/// A labelled training point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDataPoint {
    /// Target class label
    pub target_class: String,

    /// Feature vector
    pub point: FeatureVector,
}

impl ClassDataPoint {
    /// Create a new training point
    pub fn new(target_class: impl Into<String>, point: impl Into<FeatureVector>) -> Self {
        Self {
            target_class: target_class.into(),
            point: point.into(),
        }
    }

    /// Number of features in this point
    pub fn dimension(&self) -> usize {
        self.point.len()
    }
}
