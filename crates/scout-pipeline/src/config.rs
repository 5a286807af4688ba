//! Pipeline configuration.

use scout_chunk::ChunkerConfig;

/// Configuration for [`crate::IndexingPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Chunker window settings
    pub chunker: ChunkerConfig,
    /// Passages shorter than this many characters are discarded as noise
    pub min_passage_chars: usize,
    /// Chunk texts per embedding request
    pub embed_batch_size: usize,
    /// Whether `(source_doc_id, chunk_index)` duplicates are suppressed
    pub skip_duplicates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            min_passage_chars: 100,
            embed_batch_size: 32,
            skip_duplicates: true,
        }
    }
}

impl PipelineConfig {
    /// Set the chunker window settings.
    pub fn with_chunker(mut self, chunker: ChunkerConfig) -> Self {
        self.chunker = chunker;
        self
    }

    /// Set the minimum passage length.
    pub fn with_min_passage_chars(mut self, chars: usize) -> Self {
        self.min_passage_chars = chars;
        self
    }

    /// Set the embedding batch size.
    pub fn with_embed_batch_size(mut self, batch_size: usize) -> Self {
        self.embed_batch_size = batch_size.max(1);
        self
    }

    /// Set whether duplicates are suppressed.
    pub fn with_skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicates = skip;
        self
    }
}
