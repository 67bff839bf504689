//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use mlregistry_core::{Error, ErrorKind};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::dispatcher::ServiceDispatcher;
use crate::messages::{
    AddClassDataRequest, ClassifyDataRequest, ClassifyDataResponse, ClearClassifierRequest,
    CreateClassifierRequest, DeleteClassifierRequest, ErrorResponse, ListClassifiersResponse,
    LoadClassifierRequest, SaveClassifierRequest, SuccessResponse, TrainClassifierRequest,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ServiceDispatcher>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(dispatcher: Arc<ServiceDispatcher>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            dispatcher,
            metrics,
        }
    }
}

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/classifiers", get(list_classifiers))
        .route("/create_classifier", post(create_classifier))
        .route("/add_class_data", post(add_class_data))
        .route("/train_classifier", post(train_classifier))
        .route("/clear_classifier", post(clear_classifier))
        .route("/save_classifier", post(save_classifier))
        .route("/load_classifier", post(load_classifier))
        .route("/classify_data", post(classify_data))
        .route("/delete_classifier", post(delete_classifier))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

async fn list_classifiers(
    State(state): State<AppState>,
) -> Result<Json<ListClassifiersResponse>, ApiError> {
    Ok(Json(state.dispatcher.list_classifiers().await?))
}

async fn create_classifier(
    State(state): State<AppState>,
    req: Result<Json<CreateClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.create_classifier(req).await?))
}

async fn add_class_data(
    State(state): State<AppState>,
    req: Result<Json<AddClassDataRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.add_class_data(req).await?))
}

async fn train_classifier(
    State(state): State<AppState>,
    req: Result<Json<TrainClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.train_classifier(req).await?))
}

async fn clear_classifier(
    State(state): State<AppState>,
    req: Result<Json<ClearClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.clear_classifier(req).await?))
}

async fn save_classifier(
    State(state): State<AppState>,
    req: Result<Json<SaveClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.save_classifier(req).await?))
}

async fn load_classifier(
    State(state): State<AppState>,
    req: Result<Json<LoadClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.load_classifier(req).await?))
}

async fn classify_data(
    State(state): State<AppState>,
    req: Result<Json<ClassifyDataRequest>, JsonRejection>,
) -> Result<Json<ClassifyDataResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.classify_data(req).await?))
}

async fn delete_classifier(
    State(state): State<AppState>,
    req: Result<Json<DeleteClassifierRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = req?;
    Ok(Json(state.dispatcher.delete_classifier(req).await?))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error returned by handlers, rendered as an [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::validation(rejection.body_text()))
    }
}

/// HTTP status for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::UnknownIdentifier => StatusCode::NOT_FOUND,
        ErrorKind::Busy => StatusCode::CONFLICT,
        ErrorKind::PluginResolution | ErrorKind::Training | ErrorKind::Classifier => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::Persistence | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
