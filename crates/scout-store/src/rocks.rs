//! RocksDB store implementation.
//!
//! Two column families: `chunks` (ULID key → JSON chunk record) and
//! `sources` (passage id → JSON passage). Secondary queries (duplicate
//! check, per-athlete aggregations) are linear scans over the chunks
//! column family, which is adequate for the target scale of a few hundred
//! thousand records.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use tracing::{debug, info};
use ulid::Ulid;

use scout_types::{ChunkRecord, SourcePassage};

use crate::error::StoreError;
use crate::traits::{DocumentStore, SourceStore};

/// Column family for chunk records
pub const CF_CHUNKS: &str = "chunks";
/// Column family for source passages
pub const CF_SOURCES: &str = "sources";

/// Durable document store backed by RocksDB.
pub struct RocksDbStore {
    db: DB,
}

impl RocksDbStore {
    /// Open or create the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_CHUNKS, Options::default()),
            ColumnFamilyDescriptor::new(CF_SOURCES, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        info!(path = ?path, "Opened document store");
        Ok(Self { db })
    }

    fn chunks_cf(&self) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_CHUNKS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_CHUNKS.to_string()))
    }

    fn sources_cf(&self) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_SOURCES)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_SOURCES.to_string()))
    }

    /// Scan every chunk record, applying `f` until it returns false.
    fn scan_chunks<F>(&self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&str, ChunkRecord) -> bool,
    {
        let iter = self.db.iterator_cf(self.chunks_cf()?, IteratorMode::Start);
        for item in iter {
            let (key, value) = item?;
            let record: ChunkRecord = serde_json::from_slice(&value)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let key = String::from_utf8_lossy(&key);
            if !f(&key, record) {
                break;
            }
        }
        Ok(())
    }
}

impl DocumentStore for RocksDbStore {
    fn insert(&self, record: &ChunkRecord) -> Result<String, StoreError> {
        let key = Ulid::new().to_string();
        let value = serde_json::to_vec(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.db.put_cf(self.chunks_cf()?, key.as_bytes(), value)?;
        debug!(key = %key, vector_id = record.vector_id, "Inserted chunk record");
        Ok(key)
    }

    fn find_by_key(&self, key: &str) -> Result<Option<ChunkRecord>, StoreError> {
        match self.db.get_cf(self.chunks_cf()?, key.as_bytes())? {
            Some(bytes) => {
                let record: ChunkRecord = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn find_duplicate(
        &self,
        source_doc_id: &str,
        chunk_index: u32,
    ) -> Result<Option<ChunkRecord>, StoreError> {
        let mut found = None;
        self.scan_chunks(|_, record| {
            if record.metadata.source_doc_id == source_doc_id
                && record.chunk_index == chunk_index
            {
                found = Some(record);
                false
            } else {
                true
            }
        })?;
        Ok(found)
    }

    fn indexed_source_ids(
        &self,
        athlete_name: &str,
    ) -> Result<std::collections::HashSet<String>, StoreError> {
        let mut ids = std::collections::HashSet::new();
        self.scan_chunks(|_, record| {
            if record.athlete_name == athlete_name {
                ids.insert(record.metadata.source_doc_id);
            }
            true
        })?;
        debug!(athlete = %athlete_name, sources = ids.len(), "Aggregated indexed source ids");
        Ok(ids)
    }

    fn indexed_chunk_keys(
        &self,
        athlete_name: &str,
    ) -> Result<std::collections::HashSet<(String, u32)>, StoreError> {
        let mut keys = std::collections::HashSet::new();
        self.scan_chunks(|_, record| {
            if record.athlete_name == athlete_name {
                keys.insert(record.dedup_key());
            }
            true
        })?;
        Ok(keys)
    }

    fn count(&self, athlete_name: Option<&str>) -> Result<usize, StoreError> {
        let mut count = 0;
        self.scan_chunks(|_, record| {
            if athlete_name.map_or(true, |name| record.athlete_name == name) {
                count += 1;
            }
            true
        })?;
        Ok(count)
    }

    fn delete_athlete(&self, athlete_name: &str) -> Result<Vec<u64>, StoreError> {
        let mut keys = Vec::new();
        let mut vector_ids = Vec::new();
        self.scan_chunks(|key, record| {
            if record.athlete_name == athlete_name {
                keys.push(key.to_string());
                vector_ids.push(record.vector_id);
            }
            true
        })?;

        let cf = self.chunks_cf()?;
        for key in &keys {
            self.db.delete_cf(cf, key.as_bytes())?;
        }

        info!(
            athlete = %athlete_name,
            deleted = vector_ids.len(),
            "Deleted chunk records for athlete"
        );
        Ok(vector_ids)
    }
}

impl SourceStore for RocksDbStore {
    fn fetch_for_athlete(&self, athlete_name: &str) -> Result<Vec<SourcePassage>, StoreError> {
        let mut passages = Vec::new();
        let iter = self.db.iterator_cf(self.sources_cf()?, IteratorMode::Start);
        for item in iter {
            let (_, value) = item?;
            let passage: SourcePassage = serde_json::from_slice(&value)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if passage.athlete_name == athlete_name {
                passages.push(passage);
            }
        }
        passages.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(passages)
    }

    fn put_passage(&self, passage: &SourcePassage) -> Result<(), StoreError> {
        let value = serde_json::to_vec(passage)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.db
            .put_cf(self.sources_cf()?, passage.id.as_bytes(), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_types::{Chunk, ChunkMetadata};
    use tempfile::TempDir;

    fn record(athlete: &str, doc: &str, chunk_index: u32, vector_id: u64) -> ChunkRecord {
        let chunk = Chunk::new("text", ChunkMetadata::new(doc, athlete), chunk_index, 1);
        ChunkRecord::from_chunk(&chunk, vector_id, "test-model", 4)
    }

    #[test]
    fn test_insert_and_find_by_key() {
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();

        let key = store.insert(&record("A", "doc-1", 0, 0)).unwrap();
        let found = store.find_by_key(&key).unwrap().unwrap();
        assert_eq!(found.athlete_name, "A");
        assert_eq!(found.vector_id, 0);

        assert!(store.find_by_key("no-such-key").unwrap().is_none());
    }

    #[test]
    fn test_find_duplicate() {
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();

        store.insert(&record("A", "doc-1", 3, 0)).unwrap();

        assert!(store.find_duplicate("doc-1", 3).unwrap().is_some());
        assert!(store.find_duplicate("doc-1", 4).unwrap().is_none());
    }

    #[test]
    fn test_aggregations() {
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();

        store.insert(&record("A", "doc-1", 0, 0)).unwrap();
        store.insert(&record("A", "doc-1", 1, 1)).unwrap();
        store.insert(&record("A", "doc-2", 0, 2)).unwrap();
        store.insert(&record("B", "doc-9", 0, 3)).unwrap();

        let ids = store.indexed_source_ids("A").unwrap();
        assert_eq!(ids.len(), 2);

        let keys = store.indexed_chunk_keys("A").unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&("doc-2".to_string(), 0)));

        assert_eq!(store.count(None).unwrap(), 4);
        assert_eq!(store.count(Some("B")).unwrap(), 1);
    }

    #[test]
    fn test_delete_athlete() {
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();

        store.insert(&record("A", "doc-1", 0, 7)).unwrap();
        store.insert(&record("B", "doc-2", 0, 8)).unwrap();

        let ids = store.delete_athlete("A").unwrap();
        assert_eq!(ids, vec![7]);
        assert_eq!(store.count(None).unwrap(), 1);
        assert!(store.find_duplicate("doc-1", 0).unwrap().is_none());
    }

    #[test]
    fn test_missing_column_family_is_reported_not_panicked() {
        let err = StoreError::ColumnFamilyNotFound(CF_CHUNKS.to_string());
        assert_eq!(err.to_string(), "Column family not found: chunks");

        // Both handles resolve on a freshly opened store.
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();
        assert!(store.chunks_cf().is_ok());
        assert!(store.sources_cf().is_ok());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let key = {
            let store = RocksDbStore::open(temp.path()).unwrap();
            store.insert(&record("A", "doc-1", 0, 0)).unwrap()
        };

        let store = RocksDbStore::open(temp.path()).unwrap();
        assert!(store.find_by_key(&key).unwrap().is_some());
    }

    #[test]
    fn test_source_passages() {
        let temp = TempDir::new().unwrap();
        let store = RocksDbStore::open(temp.path()).unwrap();

        store
            .put_passage(&SourcePassage::new("p-2", "A", "second passage"))
            .unwrap();
        store
            .put_passage(&SourcePassage::new("p-1", "A", "first passage"))
            .unwrap();

        let passages = store.fetch_for_athlete("A").unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].id, "p-1");
        assert!(store.fetch_for_athlete("B").unwrap().is_empty());
    }
}
