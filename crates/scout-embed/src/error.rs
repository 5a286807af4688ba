//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while generating embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Invalid adapter configuration (missing key, empty model name)
    #[error("Embedding config error: {0}")]
    Config(String),

    /// Transport-level failure talking to the embedding service
    #[error("Embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Embedding service error ({status}): {body}")]
    Service { status: u16, body: String },

    /// The response body did not match the request
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}
