//! 1-nearest-neighbor classifier over Euclidean distance

use crate::classifier::{Classifier, ClassifierState};
use crate::snapshot::{read_snapshot, write_snapshot};
use mlregistry_core::{ClassDataPoint, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Canonical class-type token
pub const NEAREST_NEIGHBOR_CLASSIFIER: &str = "nearest_neighbor";

/// Labels each point with the class of the closest stored training point.
///
/// Training points are kept per class in label order, so ties between equally
/// distant points resolve to the smallest label and then the earliest point.
/// The first point added fixes the feature dimension until `clear`.
#[derive(Debug, Default)]
pub struct NearestNeighborClassifier {
    state: ClassifierState,
    dimension: Option<usize>,
    class_data: BTreeMap<String, Vec<Vec<f64>>>,
}

#[derive(Serialize, Deserialize)]
struct NearestNeighborData {
    class_data: BTreeMap<String, Vec<Vec<f64>>>,
}

impl NearestNeighborClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored training points
    pub fn len(&self) -> usize {
        self.class_data.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.class_data.is_empty()
    }

    fn check_dimension(&self, point: &[f64]) -> Result<()> {
        if point.is_empty() {
            return Err(Error::validation("feature vector is empty"));
        }
        match self.dimension {
            Some(expected) if expected != point.len() => Err(Error::validation(format!(
                "expected {expected} features, got {}",
                point.len()
            ))),
            _ => Ok(()),
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl Classifier for NearestNeighborClassifier {
    fn class_type(&self) -> &str {
        NEAREST_NEIGHBOR_CLASSIFIER
    }

    fn state(&self) -> ClassifierState {
        self.state
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The first point of a batch fixes the dimension for the rest when no
    /// data has been added yet.
    fn validate_batch(&self, data: &[ClassDataPoint]) -> Result<()> {
        let mut expected = self.dimension;

        for (index, item) in data.iter().enumerate() {
            if item.point.is_empty() {
                return Err(Error::validation_at(index, "feature vector is empty"));
            }
            match expected {
                None => expected = Some(item.point.len()),
                Some(dimension) if dimension != item.point.len() => {
                    return Err(Error::validation_at(
                        index,
                        format!("expected {dimension} features, got {}", item.point.len()),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn add_training_point(&mut self, target_class: &str, point: &[f64]) -> Result<()> {
        self.check_dimension(point)?;
        self.dimension = Some(point.len());
        self.class_data
            .entry(target_class.to_string())
            .or_default()
            .push(point.to_vec());
        self.state = ClassifierState::Accumulating;
        Ok(())
    }

    fn train(&mut self) -> Result<()> {
        if self.class_data.is_empty() {
            return Err(Error::training("no training data has been added"));
        }
        debug!(
            classes = self.class_data.len(),
            points = self.len(),
            "Nearest neighbor model ready"
        );
        self.state = ClassifierState::Trained;
        Ok(())
    }

    fn clear(&mut self) {
        self.class_data.clear();
        self.dimension = None;
        self.state = ClassifierState::Untrained;
    }

    fn classify_point(&self, point: &[f64]) -> Result<String> {
        self.check_dimension(point)?;

        let mut best: Option<(&str, f64)> = None;
        for (label, points) in &self.class_data {
            for candidate in points {
                let distance = squared_distance(point, candidate);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((label, distance));
                }
            }
        }

        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| Error::classifier("nearest neighbor classifier has no training data"))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let data = NearestNeighborData {
            class_data: self.class_data.clone(),
        };
        write_snapshot(path, NEAREST_NEIGHBOR_CLASSIFIER, self.state, &data)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let (state, data): (ClassifierState, NearestNeighborData) =
            read_snapshot(path, NEAREST_NEIGHBOR_CLASSIFIER)?;

        let mut dimension = None;
        for point in data.class_data.values().flatten() {
            match dimension {
                None => dimension = Some(point.len()),
                Some(expected) if expected != point.len() => {
                    return Err(Error::persistence(format!(
                        "snapshot {} mixes {expected}- and {}-feature points",
                        path.display(),
                        point.len()
                    )));
                }
                Some(_) => {}
            }
        }

        self.class_data = data.class_data;
        self.dimension = dimension;
        self.state = state;
        Ok(())
    }
}
