//! Server configuration

use mlregistry_classifiers::PluginConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Dispatcher behavior
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Class-type resolution
    #[serde(default)]
    pub plugins: PluginConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(dir) = &cli.snapshot_dir {
            config.dispatch.snapshot_dir = Some(dir.clone());
        }

        if let Some(execution) = cli.execution {
            config.dispatch.execution = execution;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            dispatch: DispatchConfig::default(),
            plugins: PluginConfig::default(),
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Where train/save/load run
    #[serde(default)]
    pub execution: ExecutionPolicy,

    /// Relative snapshot filenames resolve under this directory; when set,
    /// absolute paths and `..` components are rejected
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    /// Most items accepted in one add_class_data or classify_data call
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionPolicy::default(),
            snapshot_dir: None,
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Execution of long-running operations (train, save, load)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPolicy {
    /// Run on the blocking pool with the entry marked busy; other calls on
    /// the same identifier are rejected with `Busy` until it finishes
    #[default]
    Background,
    /// Run on the request task while holding the entry lock; other calls on
    /// the same identifier wait
    Inline,
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_batch_size() -> usize {
    100_000
}
