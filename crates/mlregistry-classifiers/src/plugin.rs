//! Extension points for classifier construction.

use crate::classifier::Classifier;
use crate::nearest_neighbor::{NearestNeighborClassifier, NEAREST_NEIGHBOR_CLASSIFIER};
use crate::zero::{ZeroClassifier, ZERO_CLASSIFIER};
use mlregistry_core::{Error, Result};

/// Pluggable source of classifier variants.
///
/// Implement this trait in external crates to offer additional algorithms to
/// the service without touching the registry or the dispatcher. A plugin is
/// asked to build a fresh, empty instance every time one of its class types is
/// resolved.
pub trait ClassifierPlugin: Send + Sync {
    /// Plugin name, used in logs
    fn name(&self) -> &str;

    /// Class-type tokens this plugin can construct
    fn class_types(&self) -> Vec<String>;

    /// Construct a new, empty instance of `class_type`
    fn create(&self, class_type: &str) -> Result<Box<dyn Classifier>>;
}

/// The classifiers that ship with mlregistry
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinClassifiers;

impl BuiltinClassifiers {
    /// Long-form aliases accepted for the built-in tokens
    pub fn aliases() -> [(&'static str, &'static str); 2] {
        [
            ("ZeroClassifier", ZERO_CLASSIFIER),
            ("NearestNeighborClassifier", NEAREST_NEIGHBOR_CLASSIFIER),
        ]
    }
}

impl ClassifierPlugin for BuiltinClassifiers {
    fn name(&self) -> &str {
        "builtin"
    }

    fn class_types(&self) -> Vec<String> {
        vec![
            ZERO_CLASSIFIER.to_string(),
            NEAREST_NEIGHBOR_CLASSIFIER.to_string(),
        ]
    }

    fn create(&self, class_type: &str) -> Result<Box<dyn Classifier>> {
        match class_type {
            ZERO_CLASSIFIER => Ok(Box::new(ZeroClassifier::new())),
            NEAREST_NEIGHBOR_CLASSIFIER => Ok(Box::new(NearestNeighborClassifier::new())),
            other => Err(Error::plugin_resolution(format!(
                "builtin plugin has no class type '{other}'"
            ))),
        }
    }
}
