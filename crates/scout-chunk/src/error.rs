//! Chunker error types.

use thiserror::Error;

/// Errors that can occur while chunking text.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// Invalid chunker configuration
    #[error("Invalid chunker config: {0}")]
    Config(String),

    /// Tokenizer could not be constructed
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// A token window could not be decoded back to text
    #[error("Token decode error: {0}")]
    Decode(String),
}
