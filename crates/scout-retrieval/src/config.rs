//! Retriever configuration.

/// Configuration for [`crate::Retriever`].
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Default number of chunks to return
    pub top_k: usize,
    /// Hits scoring below this similarity are dropped
    pub min_similarity: f32,
    /// Index over-fetch multiplier applied when an athlete filter is set,
    /// so enough candidates survive the filter
    pub overfetch_factor: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_similarity: 0.0,
            overfetch_factor: 10,
        }
    }
}

impl RetrieverConfig {
    /// Set the default result count.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the similarity floor.
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Set the over-fetch multiplier used under an athlete filter.
    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }
}
