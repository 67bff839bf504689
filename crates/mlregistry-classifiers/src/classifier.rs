//! Classifier trait and common types

use mlregistry_core::validation::check_dimensions;
use mlregistry_core::{ClassDataPoint, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Trait for all classifier variants.
///
/// Instances are owned by the registry and always accessed under the entry
/// lock, so mutating methods take `&mut self`. The methods are synchronous;
/// callers decide whether long-running ones (`train`, `save`, `load`) move to
/// a blocking worker.
pub trait Classifier: Send + Sync {
    /// Class-type token this instance was built for
    fn class_type(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> ClassifierState;

    /// Feature dimension fixed by the data seen so far, if the variant has one
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Reject a training batch before any of it is applied.
    ///
    /// Called under the entry lock right before the points are added one by
    /// one. The default checks every point against `dimension()`.
    fn validate_batch(&self, data: &[ClassDataPoint]) -> Result<()> {
        check_dimensions(data.iter().map(|item| item.point.as_slice()), self.dimension())
    }

    /// Accumulate one labelled training point
    fn add_training_point(&mut self, target_class: &str, point: &[f64]) -> Result<()>;

    /// Build the model from the accumulated points
    fn train(&mut self) -> Result<()>;

    /// Drop all accumulated data and any trained model
    fn clear(&mut self);

    /// Classify a single feature vector
    fn classify_point(&self, point: &[f64]) -> Result<String>;

    /// Persist the instance to `path`
    fn save(&self, path: &Path) -> Result<()>;

    /// Replace this instance's state with the snapshot at `path`
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Lifecycle of a classifier instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierState {
    /// No data and no model
    #[default]
    Untrained,
    /// Holds training data that has not been trained on yet
    Accumulating,
    /// Holds a trained model
    Trained,
}

impl ClassifierState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Untrained => "untrained",
            Self::Accumulating => "accumulating",
            Self::Trained => "trained",
        }
    }
}

impl fmt::Display for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
