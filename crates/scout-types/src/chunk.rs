//! Chunk types.
//!
//! A chunk is the unit of embedding and retrieval: a bounded, possibly
//! overlapping token window of a source passage, plus the attribution
//! needed to trace it back to where it was scraped from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribution carried by every chunk.
///
/// The fixed fields cover everything the retrieval layer filters or
/// displays; `extra` is an open extension map for fields added by future
/// ingest sources without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Identifier of the source passage this chunk was cut from
    pub source_doc_id: String,

    /// Athlete the passage is attributed to (the entity scope for retrieval)
    pub athlete_name: String,

    /// Crawl topic, if the source carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Source URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Forward-compatible extension fields
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl ChunkMetadata {
    /// Create metadata with the required attribution fields.
    pub fn new(source_doc_id: impl Into<String>, athlete_name: impl Into<String>) -> Self {
        Self {
            source_doc_id: source_doc_id.into(),
            athlete_name: athlete_name.into(),
            topic: None,
            url: None,
            title: None,
            extra: HashMap::new(),
        }
    }

    /// Set the crawl topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add an extension field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A bounded token window of a source passage.
///
/// Chunks are immutable once created. They exist transiently during an
/// indexing run; only their persisted form ([`crate::ChunkRecord`]) and the
/// vector index entry survive the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text (includes the metadata header when prefixing is enabled)
    pub text: String,

    /// Attribution back to the source passage
    pub metadata: ChunkMetadata,

    /// Zero-based position of this chunk within its passage
    pub chunk_index: u32,

    /// Number of tokens in `text`
    pub token_count: usize,
}

impl Chunk {
    pub fn new(
        text: impl Into<String>,
        metadata: ChunkMetadata,
        chunk_index: u32,
        token_count: usize,
    ) -> Self {
        Self {
            text: text.into(),
            metadata,
            chunk_index,
            token_count,
        }
    }

    /// The `(source_doc_id, chunk_index)` pair used for duplicate suppression.
    pub fn dedup_key(&self) -> (String, u32) {
        (self.metadata.source_doc_id.clone(), self.chunk_index)
    }
}
