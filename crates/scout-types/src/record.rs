//! Persisted chunk record.
//!
//! The durable form of an indexed chunk, stored in the document store and
//! joined to the vector index through `vector_id`. One record exists per
//! `(source_doc_id, chunk_index)` pair per athlete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, ChunkMetadata};

/// A chunk as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Internal id of the corresponding vector in the index
    pub vector_id: u64,

    /// Chunk text
    pub text: String,

    /// Athlete the chunk is attributed to (denormalized for filtering)
    pub athlete_name: String,

    /// Zero-based chunk position within its source passage
    pub chunk_index: u32,

    /// Token count of `text`
    pub token_count: usize,

    /// Source attribution
    pub metadata: ChunkMetadata,

    /// Model that produced the stored embedding
    pub embedding_model: String,

    /// Dimension of the stored embedding
    pub embedding_dimension: usize,

    /// When the chunk was indexed
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub indexed_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Build a record from a chunk and its assigned vector id.
    pub fn from_chunk(
        chunk: &Chunk,
        vector_id: u64,
        embedding_model: impl Into<String>,
        embedding_dimension: usize,
    ) -> Self {
        Self {
            vector_id,
            text: chunk.text.clone(),
            athlete_name: chunk.metadata.athlete_name.clone(),
            chunk_index: chunk.chunk_index,
            token_count: chunk.token_count,
            metadata: chunk.metadata.clone(),
            embedding_model: embedding_model.into(),
            embedding_dimension,
            indexed_at: Utc::now(),
        }
    }

    /// The `(source_doc_id, chunk_index)` duplicate-suppression key.
    pub fn dedup_key(&self) -> (String, u32) {
        (self.metadata.source_doc_id.clone(), self.chunk_index)
    }
}
