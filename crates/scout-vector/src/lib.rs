//! # scout-vector
//!
//! Flat similarity index for scoutrag.
//!
//! An append-only, exact inner-product index over unit-normalized vectors,
//! paired with a durable mapping from internal vector ids to document-store
//! keys. Exhaustive scan keeps scores exact; the target scale (a few
//! hundred thousand vectors, single process, single writer) does not need
//! approximate search.
//!
//! ## Persistence
//! Two co-located artifacts under the index directory:
//! - `vectors.bin`: versioned bincode blob of the flat vector store and
//!   the tombstone set
//! - `id_map.json`: id-to-key mapping plus the next-id counter
//!
//! A missing file pair starts a fresh empty index; unreadable or mutually
//! inconsistent files degrade to a fresh index with a warning.

pub mod error;
pub mod flat;
pub mod id_map;
pub mod index;

pub use error::VectorError;
pub use flat::{FlatIndex, SearchHit};
pub use id_map::IdMap;
pub use index::{IndexConfig, IndexStats, VectorIndex};
