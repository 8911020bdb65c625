//! Error taxonomy for the query path.
//!
//! Startup code (config loading, corpus loading, provider construction)
//! uses `anyhow` and aborts the process on failure. Everything that runs
//! per question returns [`RagError`] so that [`crate::qa::QaService::ask`]
//! can turn any failure into a normal-looking answer.

use thiserror::Error;

use crate::index::IndexError;

/// Errors raised while answering a question.
#[derive(Debug, Error)]
pub enum RagError {
    /// The question was empty after trimming.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An embedding or generation call failed (network, auth, quota,
    /// timeout, or a malformed upstream response).
    #[error("{service} unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    /// Provider settings needed at construction are missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The query vector could not be searched against the index.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl RagError {
    /// Shorthand for a [`RagError::ServiceUnavailable`].
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for failures of an outbound service call.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}
