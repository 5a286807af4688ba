//! Pipeline error types.

use thiserror::Error;

/// Errors that can occur during an indexing run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Chunker failure
    #[error("Chunking error: {0}")]
    Chunk(#[from] scout_chunk::ChunkError),

    /// Embedding provider failure
    #[error("Embedding error: {0}")]
    Embedding(#[from] scout_embed::EmbeddingError),

    /// Vector index failure
    #[error("Vector index error: {0}")]
    Vector(#[from] scout_vector::VectorError),

    /// Document store failure
    #[error("Store error: {0}")]
    Store(#[from] scout_store::StoreError),

    /// Index lock was poisoned by a panicking writer
    #[error("Index lock poisoned: {0}")]
    Lock(String),
}
