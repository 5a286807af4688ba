//! Token-window chunker.
//!
//! Strides a window of `chunk_size` tokens across the tokenized text with a
//! step of `chunk_size - chunk_overlap`. Each window decodes back to the
//! text of one chunk. When the metadata prefix is enabled, the header is
//! prepended before tokenization so it participates in chunk boundaries and
//! in the resulting embedding.

use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::{debug, warn};

use scout_types::{Chunk, ChunkMetadata, SourcePassage};

use crate::config::ChunkerConfig;
use crate::error::ChunkError;

/// Compute `(start, end)` token offsets for each window.
///
/// Assumes `total > size` (the single-chunk case is handled by the caller).
/// The window start advances by `size - overlap` until it reaches or passes
/// the end of the token sequence.
fn windows(total: usize, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let step = size - overlap;
    let mut spans = Vec::new();
    let mut start = 0;
    while start < total {
        spans.push((start, (start + size).min(total)));
        start += step;
    }
    spans
}

/// Splits passage text into overlapping token-window chunks.
pub struct TokenChunker {
    config: ChunkerConfig,
    bpe: CoreBPE,
}

impl TokenChunker {
    /// Create a chunker, validating the window configuration.
    pub fn new(config: ChunkerConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        let bpe = cl100k_base().map_err(|e| ChunkError::Tokenizer(e.to_string()))?;
        Ok(Self { config, bpe })
    }

    /// Count cl100k_base tokens in a text.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Build the metadata header prepended to chunk text.
    ///
    /// One segment per present field, joined with `" | "`. Embedding the
    /// attribution alongside the body improves retrieval for queries that
    /// name the athlete or topic directly.
    fn metadata_header(metadata: &ChunkMetadata) -> String {
        let mut parts = Vec::new();

        if !metadata.athlete_name.is_empty() {
            parts.push(format!("Athlete: {}", metadata.athlete_name));
        }
        if let Some(topic) = &metadata.topic {
            parts.push(format!("Topic: {}", topic));
        }
        if let Some(title) = &metadata.title {
            parts.push(format!("Title: {}", title));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("{}\n\n", parts.join(" | "))
        }
    }

    /// Split one text into chunks.
    ///
    /// Empty or whitespace-only text yields no chunks. Text that fits in a
    /// single window yields exactly one chunk with `chunk_index = 0`.
    pub fn split(&self, text: &str, metadata: &ChunkMetadata) -> Result<Vec<Chunk>, ChunkError> {
        if text.trim().is_empty() {
            warn!(
                source_doc_id = %metadata.source_doc_id,
                "Empty text, no chunks created"
            );
            return Ok(Vec::new());
        }

        let text = if self.config.prepend_metadata {
            format!("{}{}", Self::metadata_header(metadata), text)
        } else {
            text.to_string()
        };

        let tokens = self.bpe.encode_ordinary(&text);
        let total = tokens.len();

        if total <= self.config.chunk_size {
            return Ok(vec![Chunk::new(text, metadata.clone(), 0, total)]);
        }

        let mut chunks = Vec::new();
        for (chunk_index, (start, end)) in
            windows(total, self.config.chunk_size, self.config.chunk_overlap)
                .into_iter()
                .enumerate()
        {
            let window = tokens[start..end].to_vec();
            let token_count = window.len();
            let chunk_text = self
                .bpe
                .decode(window)
                .map_err(|e| ChunkError::Decode(e.to_string()))?;

            chunks.push(Chunk::new(
                chunk_text,
                metadata.clone(),
                chunk_index as u32,
                token_count,
            ));
        }

        debug!(
            source_doc_id = %metadata.source_doc_id,
            tokens = total,
            chunks = chunks.len(),
            "Split text into chunks"
        );

        Ok(chunks)
    }

    /// Split a batch of passages, tagging every chunk with its passage
    /// attribution.
    pub fn split_passages(&self, passages: &[SourcePassage]) -> Result<Vec<Chunk>, ChunkError> {
        let mut all_chunks = Vec::new();

        for passage in passages {
            let mut metadata = ChunkMetadata::new(&passage.id, &passage.athlete_name);
            metadata.topic = passage.topic.clone();
            metadata.url = passage.url.clone();
            metadata.title = passage.title.clone();

            let chunks = self.split(&passage.text, &metadata)?;
            all_chunks.extend(chunks);
        }

        debug!(
            passages = passages.len(),
            chunks = all_chunks.len(),
            "Split passages into chunks"
        );
        Ok(all_chunks)
    }
}
