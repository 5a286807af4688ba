//! # scout-embed
//!
//! Embedding types and the embedding-service adapter for scoutrag.
//!
//! The engine treats the embedding provider as a pure function with a batch
//! form: text in, fixed-dimension vector out. This crate defines the
//! [`Embedding`] value type (unit-normalized on construction), the
//! [`EmbeddingModel`] trait the pipeline and retriever consume, and
//! [`HttpEmbedder`], a blocking client for OpenAI-compatible `/embeddings`
//! endpoints.

pub mod error;
pub mod http;
pub mod model;

pub use error::EmbeddingError;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
pub use model::{Embedding, EmbeddingModel, ModelInfo};
