//! Configuration for classifier plugin resolution

use mlregistry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Which class types can be resolved, and under which names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Register the built-in zero and nearest-neighbor classifiers
    #[serde(default = "default_true")]
    pub builtins: bool,

    /// Extra names mapped to canonical class types
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    /// Canonical class types that must not be resolved
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PluginConfig {
    /// Load plugin configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            aliases: HashMap::new(),
            disabled: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
