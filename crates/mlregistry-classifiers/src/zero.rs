//! Baseline classifier that answers "0" for every point

use crate::classifier::{Classifier, ClassifierState};
use crate::snapshot::{read_snapshot, write_snapshot};
use mlregistry_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canonical class-type token
pub const ZERO_CLASSIFIER: &str = "zero";

/// Label returned for every point
pub const ZERO_LABEL: &str = "0";

/// Classifier that ignores its data and always answers [`ZERO_LABEL`].
///
/// Useful as a placeholder and for exercising the service end to end.
#[derive(Debug, Default)]
pub struct ZeroClassifier {
    state: ClassifierState,
    points_seen: u64,
}

#[derive(Serialize, Deserialize)]
struct ZeroData {
    points_seen: u64,
}

impl ZeroClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for ZeroClassifier {
    fn class_type(&self) -> &str {
        ZERO_CLASSIFIER
    }

    fn state(&self) -> ClassifierState {
        self.state
    }

    fn add_training_point(&mut self, _target_class: &str, _point: &[f64]) -> Result<()> {
        self.points_seen += 1;
        self.state = ClassifierState::Accumulating;
        Ok(())
    }

    fn train(&mut self) -> Result<()> {
        self.state = ClassifierState::Trained;
        Ok(())
    }

    fn clear(&mut self) {
        self.points_seen = 0;
        self.state = ClassifierState::Untrained;
    }

    fn classify_point(&self, _point: &[f64]) -> Result<String> {
        Ok(ZERO_LABEL.to_string())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let data = ZeroData {
            points_seen: self.points_seen,
        };
        write_snapshot(path, ZERO_CLASSIFIER, self.state, &data)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let (state, data): (ClassifierState, ZeroData) = read_snapshot(path, ZERO_CLASSIFIER)?;
        self.state = state;
        self.points_seen = data.points_seen;
        Ok(())
    }
}
