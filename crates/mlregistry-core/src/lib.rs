//! mlregistry Core
//!
//! Types shared by every mlregistry crate.
//!
//! This crate provides:
//! - The error taxonomy surfaced to remote callers
//! - Wire data types for training points and feature vectors
//! - Request validation that runs before any registry state is touched

pub mod error;
pub mod types;
pub mod validation;

pub use error::{Error, ErrorKind, Result};
pub use types::{ClassDataPoint, FeatureVector};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::types::{ClassDataPoint, FeatureVector};
}
