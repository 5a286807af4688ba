//! Embedding value type and provider trait.

use crate::error::EmbeddingError;

/// A fixed-dimension semantic vector, normalized to unit length.
///
/// Because vectors are unit-normalized, inner product equals cosine
/// similarity, which is what the flat index exploits.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector (unit L2 norm)
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding, normalizing to unit length.
    ///
    /// A zero vector is left as-is rather than producing NaNs.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values }
    }

    /// Wrap values that are already unit-normalized.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding, in [-1, 1].
    ///
    /// Both operands are unit vectors, so this is a plain dot product.
    /// Mismatched dimensions yield 0.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Information about an embedding model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model identifier, stored alongside every indexed chunk
    pub name: String,
    /// Vector dimension the model produces
    pub dimension: usize,
}

/// An embedding provider.
///
/// `embed_batch` is the required method: batching is the only performance
/// lever the engine has over the provider, so single-text embedding is the
/// derived form, not the other way around.
pub trait EmbeddingModel: Send + Sync {
    /// Model name and dimension.
    fn info(&self) -> &ModelInfo;

    /// Embed a batch of texts, preserving order and length.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("provider returned no embedding".to_string())
            })
    }

    /// Embed a batch of owned strings.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.embed_batch(&refs)
    }
}
