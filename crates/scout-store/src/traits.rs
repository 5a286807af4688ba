//! Store interface boundary.
//!
//! The engine issues inserts, point lookups, duplicate checks, and
//! per-athlete aggregations; everything else about the backing store is an
//! implementation detail.

use std::collections::HashSet;

use scout_types::{ChunkRecord, SourcePassage};

use crate::error::StoreError;

/// Store of persisted chunk records, keyed by an opaque string.
pub trait DocumentStore: Send + Sync {
    /// Insert a record, returning its assigned key.
    fn insert(&self, record: &ChunkRecord) -> Result<String, StoreError>;

    /// Point lookup by key.
    fn find_by_key(&self, key: &str) -> Result<Option<ChunkRecord>, StoreError>;

    /// Look up a record by its `(source_doc_id, chunk_index)` duplicate key.
    fn find_duplicate(
        &self,
        source_doc_id: &str,
        chunk_index: u32,
    ) -> Result<Option<ChunkRecord>, StoreError>;

    /// All `source_doc_id` values already indexed for an athlete.
    fn indexed_source_ids(&self, athlete_name: &str) -> Result<HashSet<String>, StoreError>;

    /// All `(source_doc_id, chunk_index)` pairs already indexed for an
    /// athlete. Fetched once per run so duplicate checks are local set
    /// lookups instead of one store round-trip per chunk.
    fn indexed_chunk_keys(
        &self,
        athlete_name: &str,
    ) -> Result<HashSet<(String, u32)>, StoreError>;

    /// Count records, optionally scoped to one athlete.
    fn count(&self, athlete_name: Option<&str>) -> Result<usize, StoreError>;

    /// Delete all records for an athlete.
    ///
    /// Returns the vector ids of the deleted records so the caller can
    /// tombstone them in the vector index; the store itself never touches
    /// vectors.
    fn delete_athlete(&self, athlete_name: &str) -> Result<Vec<u64>, StoreError>;
}

/// Store of raw source passages, the input of the indexing pipeline.
pub trait SourceStore: Send + Sync {
    /// All passages attributed to an athlete.
    fn fetch_for_athlete(&self, athlete_name: &str) -> Result<Vec<SourcePassage>, StoreError>;

    /// Persist a passage (written by the crawler, read by the pipeline).
    fn put_passage(&self, passage: &SourcePassage) -> Result<(), StoreError>;
}
