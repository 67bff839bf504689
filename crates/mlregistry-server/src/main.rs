//! mlregistry Server
//!
//! Serves named classifier instances over HTTP: create, train, persist and
//! query them by identifier.

use anyhow::Result;
use clap::Parser;
use mlregistry_classifiers::{ClassifierRegistry, PluginRegistry};
use mlregistry_server::metrics::init_metrics;
use mlregistry_server::{create_router, AppState, Cli, ServerConfig, ServiceDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting mlregistry server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Execution policy: {:?}", config.dispatch.execution);
    if let Some(dir) = &config.dispatch.snapshot_dir {
        info!("Snapshot directory: {}", dir.display());
    }

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    let plugins = PluginRegistry::from_config(&config.plugins)?;
    info!("Class types: {}", plugins.class_types().join(", "));

    let dispatcher = ServiceDispatcher::new(
        Arc::new(ClassifierRegistry::new()),
        Arc::new(plugins),
        config.dispatch.clone(),
    );
    let state = AppState::new(Arc::new(dispatcher), Some(metrics_handle));
    let app = create_router(state, config.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Classifier services now ready on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mlregistry=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mlregistry=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
