//! # scout-store
//!
//! Document store for the scoutrag retrieval engine.
//!
//! Holds two kinds of documents, keyed independently of the vector index's
//! internal ids:
//! - chunk records: the persisted form of every indexed chunk
//! - source passages: raw crawled text the pipeline fetches per athlete
//!
//! The [`DocumentStore`] and [`SourceStore`] traits define the interface
//! boundary; any document-oriented store satisfying them is acceptable.
//! [`RocksDbStore`] is the durable implementation, [`MemoryStore`] the
//! in-memory one used by tests.

pub mod error;
pub mod memory;
pub mod rocks;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rocks::RocksDbStore;
pub use traits::{DocumentStore, SourceStore};
