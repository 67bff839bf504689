//! mlregistry Classifiers
//!
//! The classifier capability and everything that owns instances of it:
//! - the [`Classifier`] trait and its lifecycle states
//! - built-in variants: [`ZeroClassifier`] and [`NearestNeighborClassifier`]
//! - [`PluginRegistry`], which turns a class-type token into a fresh instance
//! - [`ClassifierRegistry`], which owns live instances by identifier
//!
//! Snapshot layout is private to each variant; the built-ins share the JSON
//! helpers in [`snapshot`].

pub mod classifier;
pub mod config;
pub mod nearest_neighbor;
pub mod plugin;
pub mod plugin_registry;
pub mod registry;
pub mod snapshot;
pub mod zero;

pub use classifier::{Classifier, ClassifierState};
pub use config::PluginConfig;
pub use nearest_neighbor::{NearestNeighborClassifier, NEAREST_NEIGHBOR_CLASSIFIER};
pub use plugin::{BuiltinClassifiers, ClassifierPlugin};
pub use plugin_registry::{ClassifierFactory, PluginRegistry, PluginRegistryBuilder};
pub use registry::{ClassifierEntry, ClassifierRegistry, ClassifierSummary, ExclusiveGuard};
pub use zero::{ZeroClassifier, ZERO_CLASSIFIER};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, ClassifierState};
    pub use crate::nearest_neighbor::NearestNeighborClassifier;
    pub use crate::plugin::ClassifierPlugin;
    pub use crate::plugin_registry::PluginRegistry;
    pub use crate::registry::ClassifierRegistry;
    pub use crate::zero::ZeroClassifier;
}
