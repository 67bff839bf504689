//! Shared fixtures for server tests
//!
//! `StubClassifier` memorizes its training points and answers with the label
//! of an exact match, falling back to the first label it was given. It refuses
//! points labelled [`REJECTED_LABEL`]. Training can be slowed down and observed
//! to exercise the execution policies.

#![allow(dead_code)]

use mlregistry_classifiers::{Classifier, ClassifierRegistry, ClassifierState, PluginRegistry};
use mlregistry_core::{ClassDataPoint, Error, Result};
use mlregistry_server::messages::{
    AddClassDataRequest, ClassifyDataRequest, CreateClassifierRequest, IdentifierRequest,
    LoadClassifierRequest, SaveClassifierRequest,
};
use mlregistry_server::{DispatchConfig, ExecutionPolicy, ServiceDispatcher};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const STUB: &str = "stub";
pub const BROKEN: &str = "broken";

/// Label the stub refuses, raising a classifier error from inside a batch
pub const REJECTED_LABEL: &str = "rejected";

#[derive(Serialize, Deserialize)]
struct StubSnapshot {
    state: ClassifierState,
    points: Vec<(String, Vec<f64>)>,
}

pub struct StubClassifier {
    state: ClassifierState,
    points: Vec<(String, Vec<f64>)>,
    train_delay: Duration,
    train_started: Option<Arc<AtomicBool>>,
}

impl StubClassifier {
    pub fn new() -> Self {
        Self {
            state: ClassifierState::Untrained,
            points: Vec::new(),
            train_delay: Duration::ZERO,
            train_started: None,
        }
    }

    /// Sleep this long inside `train`
    pub fn with_train_delay(mut self, delay: Duration) -> Self {
        self.train_delay = delay;
        self
    }

    /// Raise `flag` when `train` begins
    pub fn with_train_signal(mut self, flag: Arc<AtomicBool>) -> Self {
        self.train_started = Some(flag);
        self
    }
}

impl Classifier for StubClassifier {
    fn class_type(&self) -> &str {
        STUB
    }

    fn state(&self) -> ClassifierState {
        self.state
    }

    fn add_training_point(&mut self, target_class: &str, point: &[f64]) -> Result<()> {
        if target_class == REJECTED_LABEL {
            return Err(Error::classifier(format!("label '{target_class}' is not accepted")));
        }
        self.points.push((target_class.to_string(), point.to_vec()));
        self.state = ClassifierState::Accumulating;
        Ok(())
    }

    fn train(&mut self) -> Result<()> {
        if let Some(flag) = &self.train_started {
            flag.store(true, Ordering::SeqCst);
        }
        if !self.train_delay.is_zero() {
            std::thread::sleep(self.train_delay);
        }
        if self.points.is_empty() {
            return Err(Error::training("stub has no points"));
        }
        self.state = ClassifierState::Trained;
        Ok(())
    }

    fn clear(&mut self) {
        self.points.clear();
        self.state = ClassifierState::Untrained;
    }

    fn classify_point(&self, point: &[f64]) -> Result<String> {
        if self.state != ClassifierState::Trained {
            return Err(Error::classifier("stub is not trained"));
        }
        self.points
            .iter()
            .find(|(_, p)| p.as_slice() == point)
            .or_else(|| self.points.first())
            .map(|(label, _)| label.clone())
            .ok_or_else(|| Error::classifier("stub has no points"))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let snapshot = StubSnapshot {
            state: self.state,
            points: self.points.clone(),
        };
        std::fs::write(path, serde_json::to_vec(&snapshot)?)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let snapshot: StubSnapshot = serde_json::from_slice(&std::fs::read(path)?)?;
        self.state = snapshot.state;
        self.points = snapshot.points;
        Ok(())
    }
}

/// Plugins with the built-ins, the stub, and a class type whose construction fails
pub fn plugins(train_delay: Duration, train_started: Option<Arc<AtomicBool>>) -> PluginRegistry {
    PluginRegistry::builder()
        .with_builtins()
        .with_factory(STUB, move || {
            let mut stub = StubClassifier::new().with_train_delay(train_delay);
            if let Some(flag) = &train_started {
                stub = stub.with_train_signal(Arc::clone(flag));
            }
            Ok(Box::new(stub) as Box<dyn Classifier>)
        })
        .with_factory(BROKEN, || Err(Error::internal("weights missing")))
        .build()
        .unwrap()
}

pub fn dispatcher() -> ServiceDispatcher {
    dispatcher_with(DispatchConfig::default())
}

pub fn dispatcher_with(config: DispatchConfig) -> ServiceDispatcher {
    ServiceDispatcher::new(
        Arc::new(ClassifierRegistry::new()),
        Arc::new(plugins(Duration::ZERO, None)),
        config,
    )
}

/// Dispatcher whose stub instances train slowly and report when training starts
pub fn slow_dispatcher(
    execution: ExecutionPolicy,
    train_delay: Duration,
) -> (Arc<ServiceDispatcher>, Arc<AtomicBool>) {
    let started = Arc::new(AtomicBool::new(false));
    let config = DispatchConfig {
        execution,
        ..Default::default()
    };
    let dispatcher = ServiceDispatcher::new(
        Arc::new(ClassifierRegistry::new()),
        Arc::new(plugins(train_delay, Some(Arc::clone(&started)))),
        config,
    );
    (Arc::new(dispatcher), started)
}

/// Poll until `flag` is raised
pub async fn wait_for(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn create(identifier: &str, class_type: &str) -> CreateClassifierRequest {
    CreateClassifierRequest {
        identifier: identifier.to_string(),
        class_type: class_type.to_string(),
    }
}

pub fn add(identifier: &str, data: Vec<(&str, Vec<f64>)>) -> AddClassDataRequest {
    AddClassDataRequest {
        identifier: identifier.to_string(),
        data: data
            .into_iter()
            .map(|(class, point)| ClassDataPoint::new(class, point))
            .collect(),
    }
}

pub fn id(identifier: &str) -> IdentifierRequest {
    IdentifierRequest {
        identifier: identifier.to_string(),
    }
}

pub fn save(identifier: &str, filename: &str) -> SaveClassifierRequest {
    SaveClassifierRequest {
        identifier: identifier.to_string(),
        filename: filename.to_string(),
    }
}

pub fn load(identifier: &str, class_type: &str, filename: &str) -> LoadClassifierRequest {
    LoadClassifierRequest {
        identifier: identifier.to_string(),
        class_type: class_type.to_string(),
        filename: filename.to_string(),
    }
}

pub fn classify(identifier: &str, data: Vec<Vec<f64>>) -> ClassifyDataRequest {
    ClassifyDataRequest {
        identifier: identifier.to_string(),
        data,
    }
}
