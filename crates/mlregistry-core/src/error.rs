//! Error types for mlregistry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias using mlregistry's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for registry and dispatch operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Class type unknown, disabled, or failed to construct
    #[error("plugin resolution error: {0}")]
    PluginResolution(String),

    /// Operation referenced an identifier with no live entry
    #[error("unknown classifier identifier: {0}")]
    UnknownIdentifier(String),

    /// The classifier could not complete training
    #[error("training error: {0}")]
    Training(String),

    /// Snapshot could not be written or read back
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Malformed request, detected before any state is touched
    #[error("validation error: {0}")]
    Validation(String),

    /// Entry is running a background operation
    #[error("classifier '{0}' is busy")]
    Busy(String),

    /// The classifier could not answer a classify request
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new plugin resolution error
    pub fn plugin_resolution(msg: impl Into<String>) -> Self {
        Self::PluginResolution(msg.into())
    }

    /// Create a new unknown identifier error
    pub fn unknown_identifier(id: impl Into<String>) -> Self {
        Self::UnknownIdentifier(id.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Validation error for one item of a batch, reported by index
    pub fn validation_at(index: usize, msg: impl fmt::Display) -> Self {
        Self::Validation(format!("data[{index}]: {msg}"))
    }

    /// Create a new busy error
    pub fn busy(id: impl Into<String>) -> Self {
        Self::Busy(id.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The kind surfaced to remote callers.
    ///
    /// Filesystem and encoding failures only arise from snapshot handling, so
    /// they surface as persistence failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PluginResolution(_) => ErrorKind::PluginResolution,
            Self::UnknownIdentifier(_) => ErrorKind::UnknownIdentifier,
            Self::Training(_) => ErrorKind::Training,
            Self::Persistence(_) | Self::Io(_) | Self::Serialization(_) => {
                ErrorKind::Persistence
            }
            Self::Validation(_) => ErrorKind::Validation,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Classifier(_) => ErrorKind::Classifier,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error kinds as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PluginResolution,
    UnknownIdentifier,
    Training,
    Persistence,
    Validation,
    Busy,
    Classifier,
    Internal,
}

impl ErrorKind {
    /// Stable label used for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PluginResolution => "plugin_resolution",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::Training => "training",
            Self::Persistence => "persistence",
            Self::Validation => "validation",
            Self::Busy => "busy",
            Self::Classifier => "classifier",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
