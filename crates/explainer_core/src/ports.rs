//! crates/explainer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the generation model and the PDF toolchain.

use async_trait::async_trait;

use crate::domain::Explanation;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate explanation. Please check your connection and API key.";
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Invalid AI response. The format was not correct.";

/// A generic error type for all port operations.
///
/// The payload of `MalformedResponse` and `GenerationFailed` is diagnostic detail for
/// the logs; use [`PortError::user_message`] for anything shown to a user.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("A request is already in progress")]
    Busy,
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message that is safe to show inline next to the input.
    pub fn user_message(&self) -> String {
        match self {
            PortError::Validation(msg) => msg.clone(),
            PortError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            PortError::GenerationFailed(_) => GENERATION_FAILED_MESSAGE.to_string(),
            PortError::Busy => "An explanation is already being generated.".to_string(),
            PortError::Unavailable(_) => "This feature is not available right now.".to_string(),
            PortError::NotFound(what) => format!("Not found: {}", what),
            PortError::Unexpected(_) => "An unknown error occurred.".to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ExplanationService: Send + Sync {
    /// Produces a complete explanation of `text`. One attempt, no caching.
    ///
    /// Callers are expected to reject blank input before calling.
    async fn explain(&self, text: &str) -> PortResult<Explanation>;
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Converts a self-contained HTML document into PDF bytes.
    async fn render_pdf(&self, html: &str) -> PortResult<Vec<u8>>;
}
