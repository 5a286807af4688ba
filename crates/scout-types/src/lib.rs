//! # scout-types
//!
//! Shared domain types for the scoutrag retrieval engine.
//!
//! This crate defines the data structures passed between the chunker,
//! embedding adapter, vector index, document store, and pipeline:
//! - Source passages: raw crawled text attributed to an athlete
//! - Chunks: bounded, overlapping token windows of a passage
//! - Chunk records: the persisted form of an indexed chunk

pub mod chunk;
pub mod passage;
pub mod record;

pub use chunk::{Chunk, ChunkMetadata};
pub use passage::SourcePassage;
pub use record::ChunkRecord;
