//! Chunker configuration.

use crate::error::ChunkError;

/// Configuration for [`crate::TokenChunker`].
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum tokens per chunk
    pub chunk_size: usize,
    /// Tokens shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Whether to prepend a metadata header before tokenization
    pub prepend_metadata: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            prepend_metadata: true,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    /// Set whether the metadata header is prepended.
    pub fn with_prepend_metadata(mut self, prepend: bool) -> Self {
        self.prepend_metadata = prepend;
        self
    }

    /// Validate the window invariants.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 {
            return Err(ChunkError::Config("chunk_size must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ChunkerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ChunkerConfig::new(0, 0);
        assert!(matches!(config.validate(), Err(ChunkError::Config(_))));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let config = ChunkerConfig::new(100, 100);
        assert!(matches!(config.validate(), Err(ChunkError::Config(_))));

        let config = ChunkerConfig::new(100, 99);
        assert!(config.validate().is_ok());
    }
}
