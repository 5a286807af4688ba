//! In-memory store implementation.
//!
//! Reference implementation of the store traits, used by tests and small
//! fixtures. Mirrors the observable behavior of [`crate::RocksDbStore`].

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use scout_types::{ChunkRecord, SourcePassage};
use ulid::Ulid;

use crate::error::StoreError;
use crate::traits::{DocumentStore, SourceStore};

/// In-memory document and source store.
#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<HashMap<String, ChunkRecord>>,
    sources: RwLock<HashMap<String, SourcePassage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, record: &ChunkRecord) -> Result<String, StoreError> {
        let key = Ulid::new().to_string();
        self.chunks
            .write()
            .expect("chunks lock poisoned")
            .insert(key.clone(), record.clone());
        Ok(key)
    }

    fn find_by_key(&self, key: &str) -> Result<Option<ChunkRecord>, StoreError> {
        Ok(self
            .chunks
            .read()
            .expect("chunks lock poisoned")
            .get(key)
            .cloned())
    }

    fn find_duplicate(
        &self,
        source_doc_id: &str,
        chunk_index: u32,
    ) -> Result<Option<ChunkRecord>, StoreError> {
        Ok(self
            .chunks
            .read()
            .expect("chunks lock poisoned")
            .values()
            .find(|r| r.metadata.source_doc_id == source_doc_id && r.chunk_index == chunk_index)
            .cloned())
    }

    fn indexed_source_ids(&self, athlete_name: &str) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .chunks
            .read()
            .expect("chunks lock poisoned")
            .values()
            .filter(|r| r.athlete_name == athlete_name)
            .map(|r| r.metadata.source_doc_id.clone())
            .collect())
    }

    fn indexed_chunk_keys(
        &self,
        athlete_name: &str,
    ) -> Result<HashSet<(String, u32)>, StoreError> {
        Ok(self
            .chunks
            .read()
            .expect("chunks lock poisoned")
            .values()
            .filter(|r| r.athlete_name == athlete_name)
            .map(|r| r.dedup_key())
            .collect())
    }

    fn count(&self, athlete_name: Option<&str>) -> Result<usize, StoreError> {
        let chunks = self.chunks.read().expect("chunks lock poisoned");
        Ok(match athlete_name {
            Some(name) => chunks.values().filter(|r| r.athlete_name == name).count(),
            None => chunks.len(),
        })
    }

    fn delete_athlete(&self, athlete_name: &str) -> Result<Vec<u64>, StoreError> {
        let mut chunks = self.chunks.write().expect("chunks lock poisoned");
        let keys: Vec<String> = chunks
            .iter()
            .filter(|(_, r)| r.athlete_name == athlete_name)
            .map(|(k, _)| k.clone())
            .collect();

        let mut vector_ids = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(record) = chunks.remove(&key) {
                vector_ids.push(record.vector_id);
            }
        }
        Ok(vector_ids)
    }
}

impl SourceStore for MemoryStore {
    fn fetch_for_athlete(&self, athlete_name: &str) -> Result<Vec<SourcePassage>, StoreError> {
        let mut passages: Vec<SourcePassage> = self
            .sources
            .read()
            .expect("sources lock poisoned")
            .values()
            .filter(|p| p.athlete_name == athlete_name)
            .cloned()
            .collect();
        // Stable order for deterministic pipeline runs
        passages.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(passages)
    }

    fn put_passage(&self, passage: &SourcePassage) -> Result<(), StoreError> {
        self.sources
            .write()
            .expect("sources lock poisoned")
            .insert(passage.id.clone(), passage.clone());
        Ok(())
    }
}
