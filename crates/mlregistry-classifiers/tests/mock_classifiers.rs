//! Mock classifiers for testing
//!
//! Provides configurable mock implementations of the Classifier and
//! ClassifierPlugin traits for testing plugin resolution, the identifier
//! registry, and error paths.

use mlregistry_classifiers::{
    Classifier, ClassifierPlugin, ClassifierRegistry, ClassifierState, PluginRegistry,
};
use mlregistry_core::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A classifier that answers with a fixed label
pub struct MockClassifier {
    class_type: String,
    label: String,
    state: ClassifierState,
    points: usize,
}

impl MockClassifier {
    /// Create a new mock classifier of the given class type
    pub fn new(class_type: &str) -> Self {
        Self {
            class_type: class_type.to_string(),
            label: "mock".to_string(),
            state: ClassifierState::Untrained,
            points: 0,
        }
    }

    /// Set the label this classifier will return
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

impl Classifier for MockClassifier {
    fn class_type(&self) -> &str {
        &self.class_type
    }

    fn state(&self) -> ClassifierState {
        self.state
    }

    fn add_training_point(&mut self, _target_class: &str, _point: &[f64]) -> Result<()> {
        self.points += 1;
        self.state = ClassifierState::Accumulating;
        Ok(())
    }

    fn train(&mut self) -> Result<()> {
        self.state = ClassifierState::Trained;
        Ok(())
    }

    fn clear(&mut self) {
        self.points = 0;
        self.state = ClassifierState::Untrained;
    }

    fn classify_point(&self, _point: &[f64]) -> Result<String> {
        Ok(self.label.clone())
    }

    fn save(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// A classifier whose training always fails - for testing error paths
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn class_type(&self) -> &str {
        "failing"
    }

    fn state(&self) -> ClassifierState {
        ClassifierState::Accumulating
    }

    fn add_training_point(&mut self, _target_class: &str, _point: &[f64]) -> Result<()> {
        Ok(())
    }

    fn train(&mut self) -> Result<()> {
        Err(Error::training("Simulated training failure"))
    }

    fn clear(&mut self) {}

    fn classify_point(&self, _point: &[f64]) -> Result<String> {
        Err(Error::classifier("Simulated classifier failure"))
    }

    fn save(&self, _path: &Path) -> Result<()> {
        Err(Error::persistence("Simulated write failure"))
    }

    fn load(&mut self, _path: &Path) -> Result<()> {
        Err(Error::persistence("Simulated read failure"))
    }
}

/// A plugin offering mock class types and counting constructions
pub struct MockPlugin {
    create_count: AtomicU32,
}

impl MockPlugin {
    pub fn new() -> Self {
        Self {
            create_count: AtomicU32::new(0),
        }
    }

    /// Get the number of instances constructed
    pub fn create_count(&self) -> u32 {
        self.create_count.load(Ordering::Relaxed)
    }
}

impl ClassifierPlugin for MockPlugin {
    fn name(&self) -> &str {
        "mock"
    }

    fn class_types(&self) -> Vec<String> {
        vec!["mock/yes".to_string(), "mock/no".to_string(), "mock/failing".to_string()]
    }

    fn create(&self, class_type: &str) -> Result<Box<dyn Classifier>> {
        self.create_count.fetch_add(1, Ordering::Relaxed);
        match class_type {
            "mock/yes" => Ok(Box::new(MockClassifier::new(class_type).with_label("yes"))),
            "mock/no" => Ok(Box::new(MockClassifier::new(class_type).with_label("no"))),
            "mock/failing" => Ok(Box::new(FailingClassifier)),
            other => Err(Error::plugin_resolution(format!("mock has no '{other}'"))),
        }
    }
}

fn mock_registry(plugin: Arc<MockPlugin>) -> PluginRegistry {
    PluginRegistry::builder()
        .with_builtins()
        .with_plugin(plugin)
        .with_alias("yes", "mock/yes")
        .build()
        .unwrap()
}

#[test]
fn test_plugin_instances_are_fresh() {
    let plugin = Arc::new(MockPlugin::new());
    let plugins = mock_registry(Arc::clone(&plugin));

    let mut first = plugins.resolve("mock/yes").unwrap();
    first.add_training_point("a", &[1.0]).unwrap();
    let second = plugins.resolve("yes").unwrap();

    assert_eq!(plugin.create_count(), 2);
    assert_eq!(first.state(), ClassifierState::Accumulating);
    assert_eq!(second.state(), ClassifierState::Untrained);
    assert_eq!(second.classify_point(&[0.0]).unwrap(), "yes");
}

#[test]
fn test_class_types_include_plugin_and_builtins() {
    let plugins = mock_registry(Arc::new(MockPlugin::new()));
    let types = plugins.class_types();

    for expected in ["mock/failing", "mock/no", "mock/yes", "nearest_neighbor", "zero"] {
        assert!(types.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn test_overwrite_through_plugins() {
    let plugins = mock_registry(Arc::new(MockPlugin::new()));
    let registry = ClassifierRegistry::new();

    registry.create("A", "mock/yes", plugins.resolve("mock/yes").unwrap());
    registry.create("A", "mock/no", plugins.resolve("mock/no").unwrap());

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup("A").unwrap().class_type(), "mock/no");
}

#[tokio::test]
async fn test_entry_lock_reaches_latest_instance() {
    let plugins = mock_registry(Arc::new(MockPlugin::new()));
    let registry = ClassifierRegistry::new();

    registry.create("A", "mock/yes", plugins.resolve("mock/yes").unwrap());
    registry.create("A", "mock/no", plugins.resolve("mock/no").unwrap());

    let entry = registry.get("A").unwrap();
    let classifier = entry.lock().await.unwrap();
    assert_eq!(classifier.classify_point(&[0.0]).unwrap(), "no");
}

#[test]
fn test_failing_classifier_errors() {
    let plugins = mock_registry(Arc::new(MockPlugin::new()));
    let mut classifier = plugins.resolve("mock/failing").unwrap();

    assert_eq!(classifier.train().unwrap_err().kind(), ErrorKind::Training);
    assert_eq!(classifier.classify_point(&[0.0]).unwrap_err().kind(), ErrorKind::Classifier);
    assert_eq!(
        classifier.save(Path::new("unused.json")).unwrap_err().kind(),
        ErrorKind::Persistence
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_classifier_basic() {
        let mut classifier = MockClassifier::new("test").with_label("positive");

        classifier.add_training_point("positive", &[1.0]).unwrap();
        assert_eq!(classifier.points, 1);
        assert_eq!(classifier.classify_point(&[2.0]).unwrap(), "positive");

        classifier.clear();
        assert_eq!(classifier.points, 0);
    }
}
