//! # scout-chunk
//!
//! Token-window chunker for the scoutrag indexing pipeline.
//!
//! Splits passage text into bounded, overlapping windows of cl100k_base
//! tokens. Windows are decoded back to text, so a chunk is always a valid
//! substring-level slice of the (optionally metadata-prefixed) input.
//!
//! ## Features
//! - Deterministic tokenization via tiktoken (cl100k_base)
//! - Configurable window size and overlap
//! - Optional metadata header prefix so attribution participates in the
//!   embedding

pub mod chunker;
pub mod config;
pub mod error;

pub use chunker::TokenChunker;
pub use config::ChunkerConfig;
pub use error::ChunkError;
