//! Error types for the region cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache facade, the orchestrator and the HTTP surface.
///
/// Failures of caller-supplied computations are deliberately absent: they travel
/// through the orchestrator in the caller's own error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Empty key, separator inside a key or region, or a missing value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage collaborator can no longer serve operations
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Lookup miss, only raised by the HTTP layer
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Shorthand for an [`CacheError::InvalidArgument`] with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        CacheError::InvalidArgument(message.into())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
