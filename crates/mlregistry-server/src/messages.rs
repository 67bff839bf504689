//! Typed requests and responses for the remote operations

use mlregistry_classifiers::ClassifierSummary;
use mlregistry_core::{ClassDataPoint, Error, ErrorKind, FeatureVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote operations served by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateClassifier,
    AddClassData,
    TrainClassifier,
    ClearClassifier,
    SaveClassifier,
    LoadClassifier,
    ClassifyData,
    DeleteClassifier,
    ListClassifiers,
}

impl Operation {
    /// Service name, also used as the route path and metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateClassifier => "create_classifier",
            Self::AddClassData => "add_class_data",
            Self::TrainClassifier => "train_classifier",
            Self::ClearClassifier => "clear_classifier",
            Self::SaveClassifier => "save_classifier",
            Self::LoadClassifier => "load_classifier",
            Self::ClassifyData => "classify_data",
            Self::DeleteClassifier => "delete_classifier",
            Self::ListClassifiers => "list_classifiers",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassifierRequest {
    pub identifier: String,
    pub class_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddClassDataRequest {
    pub identifier: String,
    #[serde(default)]
    pub data: Vec<ClassDataPoint>,
}

/// Request naming only an identifier (train, clear, delete)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRequest {
    pub identifier: String,
}

pub type TrainClassifierRequest = IdentifierRequest;
pub type ClearClassifierRequest = IdentifierRequest;
pub type DeleteClassifierRequest = IdentifierRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveClassifierRequest {
    pub identifier: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadClassifierRequest {
    pub identifier: String,
    pub class_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyDataRequest {
    pub identifier: String,
    #[serde(default)]
    pub data: Vec<FeatureVector>,
}

/// Response carrying only the success flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Labels in the same order as the classified vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyDataResponse {
    pub success: bool,
    pub classifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListClassifiersResponse {
    pub classifiers: Vec<ClassifierSummary>,
    /// Class types that `create_classifier` and `load_classifier` accept
    pub class_types: Vec<String>,
}

/// Failure body returned for every error kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}
