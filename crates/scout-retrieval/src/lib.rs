//! # scout-retrieval
//!
//! Entity-filtered semantic retrieval for the scoutrag engine.
//!
//! The retriever embeds a query once, searches the vector index, and joins
//! each hit back to its chunk record in the document store. An optional
//! athlete filter is applied after the search; the index is over-fetched to
//! compensate, since the index itself knows nothing about athletes.

pub mod config;
pub mod error;
pub mod retriever;

pub use config::RetrieverConfig;
pub use error::RetrievalError;
pub use retriever::{RetrievedChunk, Retriever};
