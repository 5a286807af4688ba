//! # scout-pipeline
//!
//! Indexing pipeline for the scoutrag retrieval engine.
//!
//! Orchestrates one athlete's indexing run as a single pass:
//! `fetch → chunk → embed → index`. Runs are idempotent: already-indexed
//! source passages are excluded up front and `(source_doc_id, chunk_index)`
//! duplicates are suppressed at the indexing step, so re-running after a
//! partial failure is safe.
//!
//! Consistency between the document store and the vector index is
//! best-effort, not transactional; the duplicate checks are what make
//! re-runs safe, not rollback.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{EmbeddedChunk, IndexingPipeline, StoreStats};
pub use stats::{RunStats, RunStatus};
