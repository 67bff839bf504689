//! Translates remote operations into registry and classifier calls
//!
//! Identifier naming rules apply only where entries are made (create and
//! load). Every other handler lets the registry lookup decide and fails with
//! `UnknownIdentifier` without touching the registry when it is absent.
//! Batches are validated completely before the first item is applied; the
//! length of a feature vector is for the classifier to judge.

use mlregistry_classifiers::{ClassifierRegistry, PluginRegistry};
use mlregistry_core::validation::{
    check_dimensions, validate_class_type, validate_filename, validate_identifier,
    validate_training_batch, validate_vector_batch,
};
use mlregistry_core::{Error, Result};
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{DispatchConfig, ExecutionPolicy};
use crate::messages::{
    AddClassDataRequest, ClassifyDataRequest, ClassifyDataResponse, ClearClassifierRequest,
    CreateClassifierRequest, DeleteClassifierRequest, ListClassifiersResponse,
    LoadClassifierRequest, Operation, SaveClassifierRequest, SuccessResponse,
    TrainClassifierRequest,
};
use crate::metrics as names;

/// Owns the registry and serves every remote operation against it
pub struct ServiceDispatcher {
    registry: Arc<ClassifierRegistry>,
    plugins: Arc<PluginRegistry>,
    config: DispatchConfig,
}

impl ServiceDispatcher {
    pub fn new(
        registry: Arc<ClassifierRegistry>,
        plugins: Arc<PluginRegistry>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            plugins,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<ClassifierRegistry> {
        &self.registry
    }

    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Resolve `class_type` and register an empty instance under the identifier
    pub async fn create_classifier(&self, req: CreateClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::CreateClassifier, &req.identifier, async {
            validate_identifier(&req.identifier)?;
            validate_class_type(&req.class_type)?;

            let classifier = self.plugins.resolve(&req.class_type)?;
            let class_type = self.plugins.canonical_name(&req.class_type).to_string();
            self.registry.create(req.identifier.clone(), class_type, classifier);

            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Add training points in input order
    pub async fn add_class_data(&self, req: AddClassDataRequest) -> Result<SuccessResponse> {
        self.observe(Operation::AddClassData, &req.identifier, async {
            validate_training_batch(&req.data, self.config.max_batch_size)?;

            let entry = self.registry.get(&req.identifier)?;
            let mut classifier = entry.lock().await?;
            classifier.validate_batch(&req.data)?;

            for (index, item) in req.data.iter().enumerate() {
                classifier
                    .add_training_point(&item.target_class, &item.point)
                    .map_err(|e| at_index(index, e))?;
            }

            debug!("Added {} points", req.data.len());
            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Train the instance according to the execution policy
    pub async fn train_classifier(&self, req: TrainClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::TrainClassifier, &req.identifier, async {
            let entry = self.registry.get(&req.identifier)?;
            info!("Training {}", req.identifier);

            match self.config.execution {
                ExecutionPolicy::Background => {
                    let mut guard = entry.lock_exclusive().await?;
                    run_blocking(move || guard.train()).await?;
                }
                ExecutionPolicy::Inline => {
                    entry.lock().await?.train()?;
                }
            }

            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Return the instance to its untrained state
    pub async fn clear_classifier(&self, req: ClearClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::ClearClassifier, &req.identifier, async {
            let entry = self.registry.get(&req.identifier)?;
            entry.lock().await?.clear();
            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Persist the instance; write failures are reported, not ignored
    pub async fn save_classifier(&self, req: SaveClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::SaveClassifier, &req.identifier, async {
            let path = self.snapshot_path(&req.filename)?;
            let entry = self.registry.get(&req.identifier)?;

            match self.config.execution {
                ExecutionPolicy::Background => {
                    let guard = entry.lock_exclusive().await?;
                    let target = path.clone();
                    run_blocking(move || guard.save(&target)).await?;
                }
                ExecutionPolicy::Inline => {
                    entry.lock().await?.save(&path)?;
                }
            }

            info!("Saved {} to {}", req.identifier, path.display());
            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Restore a fresh instance from a snapshot and register it.
    ///
    /// The instance is registered only after loading succeeded, so a failed
    /// load leaves any existing entry under the identifier untouched.
    pub async fn load_classifier(&self, req: LoadClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::LoadClassifier, &req.identifier, async {
            validate_identifier(&req.identifier)?;
            validate_class_type(&req.class_type)?;
            let path = self.snapshot_path(&req.filename)?;

            let mut classifier = self.plugins.resolve(&req.class_type)?;
            let class_type = self.plugins.canonical_name(&req.class_type).to_string();

            let classifier = match self.config.execution {
                ExecutionPolicy::Background => {
                    let source = path.clone();
                    run_blocking(move || classifier.load(&source).map(|_| classifier)).await?
                }
                ExecutionPolicy::Inline => {
                    classifier.load(&path)?;
                    classifier
                }
            };

            self.registry.create(req.identifier.clone(), class_type, classifier);
            info!("Loaded {} from {}", req.identifier, path.display());
            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Classify every vector, labels returned in input order
    pub async fn classify_data(&self, req: ClassifyDataRequest) -> Result<ClassifyDataResponse> {
        self.observe(Operation::ClassifyData, &req.identifier, async {
            validate_vector_batch(&req.data, self.config.max_batch_size)?;

            let entry = self.registry.get(&req.identifier)?;
            let classifier = entry.lock().await?;
            check_dimensions(req.data.iter().map(Vec::as_slice), classifier.dimension())?;

            let classifications = req
                .data
                .iter()
                .enumerate()
                .map(|(index, point)| {
                    classifier.classify_point(point).map_err(|e| at_index(index, e))
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(ClassifyDataResponse {
                success: true,
                classifications,
            })
        })
        .await
    }

    /// Remove the identifier from the registry unless a background operation
    /// owns it
    pub async fn delete_classifier(&self, req: DeleteClassifierRequest) -> Result<SuccessResponse> {
        self.observe(Operation::DeleteClassifier, &req.identifier, async {
            let removed = self.registry.erase_idle(&req.identifier)?;
            info!("Deleted {} ({})", req.identifier, removed.class_type());
            Ok(SuccessResponse::ok())
        })
        .await
    }

    /// Describe every live entry and the resolvable class types
    pub async fn list_classifiers(&self) -> Result<ListClassifiersResponse> {
        self.observe(Operation::ListClassifiers, "", async {
            Ok(ListClassifiersResponse {
                classifiers: self.registry.summaries(),
                class_types: self.plugins.class_types(),
            })
        })
        .await
    }

    fn snapshot_path(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        let path = Path::new(filename);

        let Some(dir) = &self.config.snapshot_dir else {
            return Ok(path.to_path_buf());
        };

        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::validation(format!(
                "filename '{filename}' must stay inside the snapshot directory"
            )));
        }
        Ok(dir.join(path))
    }

    async fn observe<T, F>(&self, operation: Operation, identifier: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let span = info_span!(
            "dispatch",
            operation = operation.as_str(),
            identifier = %identifier,
            call_id = %Uuid::new_v4(),
        );
        let start = Instant::now();
        metrics::counter!(names::REQUESTS_TOTAL, "operation" => operation.as_str()).increment(1);

        let result = call.instrument(span.clone()).await;

        metrics::histogram!(names::OPERATION_LATENCY_US, "operation" => operation.as_str())
            .record(start.elapsed().as_micros() as f64);
        metrics::gauge!(names::CLASSIFIERS).set(self.registry.len() as f64);

        if let Err(e) = &result {
            metrics::counter!(
                names::ERRORS_TOTAL,
                "operation" => operation.as_str(),
                "kind" => e.kind().as_str()
            )
            .increment(1);
            span.in_scope(|| warn!(kind = %e.kind(), "{} failed: {}", operation, e));
        }

        result
    }
}

/// Run a long-running classifier call on the blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("classifier worker failed: {e}")))?
}

/// Attach the batch index to errors raised for one item
fn at_index(index: usize, err: Error) -> Error {
    match err {
        Error::Validation(msg) => Error::validation_at(index, msg),
        Error::Classifier(msg) => Error::classifier(format!("data[{index}]: {msg}")),
        other => other,
    }
}

/// Construct a dispatcher with the built-in classifiers and default settings
pub fn default_dispatcher() -> Result<ServiceDispatcher> {
    let plugins = PluginRegistry::builder().with_builtins().build()?;
    Ok(ServiceDispatcher::new(
        Arc::new(ClassifierRegistry::new()),
        Arc::new(plugins),
        DispatchConfig::default(),
    ))
}
