//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the mapping of
//! core port errors onto HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use explainer_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The status code a port error is reported with.
pub fn status_for(err: &PortError) -> StatusCode {
    match err {
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        PortError::MalformedResponse(_) | PortError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
        PortError::Busy => StatusCode::CONFLICT,
        PortError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns a port error into the `(StatusCode, String)` pair handlers return.
/// Only the user-safe message leaves the process.
pub fn to_http(err: PortError) -> (StatusCode, String) {
    (status_for(&err), err.user_message())
}
