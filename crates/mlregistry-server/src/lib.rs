//! mlregistry Server
//!
//! Remote surface for the classifier registry. Each operation arrives as a
//! JSON POST, is validated, and is dispatched against a shared
//! [`ClassifierRegistry`](mlregistry_classifiers::ClassifierRegistry).
//! Failures come back as a typed error kind with a matching HTTP status.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod messages;
pub mod metrics;
pub mod routes;

pub use cli::Cli;
pub use config::{DispatchConfig, ExecutionPolicy, ServerConfig};
pub use dispatcher::{default_dispatcher, ServiceDispatcher};
pub use routes::{create_router, AppState};
