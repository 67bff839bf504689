//! Prometheus metrics for dispatched operations

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

pub const REQUESTS_TOTAL: &str = "mlregistry_requests_total";
pub const ERRORS_TOTAL: &str = "mlregistry_errors_total";
pub const OPERATION_LATENCY_US: &str = "mlregistry_operation_latency_us";
pub const CLASSIFIERS: &str = "mlregistry_classifiers";

/// Install the global Prometheus recorder and return a handle for rendering
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    describe_metrics();

    info!("Metrics exporter initialized");
    Ok(handle)
}

/// Register descriptions for every metric the dispatcher emits
pub fn describe_metrics() {
    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of operations dispatched");
    metrics::describe_counter!(ERRORS_TOTAL, "Failed operations by operation and error kind");
    metrics::describe_histogram!(
        OPERATION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Operation latency in microseconds"
    );
    metrics::describe_gauge!(CLASSIFIERS, "Number of registered classifier instances");
}
