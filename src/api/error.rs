//! Error types for Record API operations.

use thiserror::Error;

use crate::error::StoreError;
use crate::record::MergeError;

/// Error returned by [`RecordApi`](super::RecordApi) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required field, malformed JSON, or a payload of the wrong shape.
    #[error("{0}")]
    Validation(String),
    /// No record (or document entry) with this id.
    #[error("not found: {0}")]
    NotFound(String),
    /// The document backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Anything else the server cannot recover from.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MergeError> for ApiError {
    fn from(err: MergeError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(format!("invalid JSON: {}", err))
    }
}

impl ApiError {
    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Store(_) => 500,
            ApiError::Internal(_) => 500,
        }
    }
}
