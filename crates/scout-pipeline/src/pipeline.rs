//! The indexing pipeline.
//!
//! One run is a single synchronous pass for one athlete:
//! fetch passages, chunk them, embed the chunk texts, then append to the
//! vector index and document store. The write lock on the index is held
//! for the whole indexing step so vector ids stay dense and the id→key
//! mapping stays consistent; the index is persisted once per run.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use scout_chunk::TokenChunker;
use scout_embed::{Embedding, EmbeddingModel};
use scout_store::{DocumentStore, SourceStore};
use scout_types::{Chunk, ChunkRecord, SourcePassage};
use scout_vector::VectorIndex;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stats::{RunStats, RunStatus};

/// A chunk paired with its embedding, ready for indexing.
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

/// Combined store and index statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Chunk records in the document store (optionally athlete-scoped)
    pub chunk_records: usize,
    /// Vectors ever appended to the index (tombstoned included)
    pub vector_count: usize,
    /// Tombstoned vector ids
    pub revoked_count: usize,
    /// Embedding dimension of the index
    pub dimension: usize,
}

/// Idempotent indexing pipeline.
///
/// Generic over the embedding provider and both store roles so tests can
/// substitute deterministic in-memory implementations.
pub struct IndexingPipeline<E, S, M>
where
    E: EmbeddingModel,
    S: SourceStore,
    M: DocumentStore,
{
    embedder: Arc<E>,
    sources: Arc<S>,
    store: Arc<M>,
    index: Arc<RwLock<VectorIndex>>,
    chunker: TokenChunker,
    config: PipelineConfig,
}

impl<E, S, M> IndexingPipeline<E, S, M>
where
    E: EmbeddingModel,
    S: SourceStore,
    M: DocumentStore,
{
    /// Create a pipeline, validating the chunker configuration.
    pub fn new(
        embedder: Arc<E>,
        sources: Arc<S>,
        store: Arc<M>,
        index: Arc<RwLock<VectorIndex>>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let chunker = TokenChunker::new(config.chunker.clone())?;
        Ok(Self {
            embedder,
            sources,
            store,
            index,
            chunker,
            config,
        })
    }

    /// Load the athlete's passages, dropping noise and, when `skip_indexed`
    /// is set, passages whose `source_doc_id` is already in the store.
    pub fn fetch(
        &self,
        athlete_name: &str,
        skip_indexed: bool,
    ) -> Result<Vec<SourcePassage>, PipelineError> {
        let passages = self.sources.fetch_for_athlete(athlete_name)?;
        let total = passages.len();

        let indexed = if skip_indexed {
            self.store.indexed_source_ids(athlete_name)?
        } else {
            HashSet::new()
        };

        let passages: Vec<SourcePassage> = passages
            .into_iter()
            .filter(|p| {
                if p.text.trim().len() < self.config.min_passage_chars {
                    debug!(passage = %p.id, "Passage below minimum length, skipped");
                    return false;
                }
                if indexed.contains(&p.id) {
                    debug!(passage = %p.id, "Passage already indexed, skipped");
                    return false;
                }
                true
            })
            .collect();

        info!(
            athlete = %athlete_name,
            loaded = passages.len(),
            total,
            "Fetched source passages"
        );
        Ok(passages)
    }

    /// Split passages into token-window chunks.
    pub fn chunk(&self, passages: &[SourcePassage]) -> Result<Vec<Chunk>, PipelineError> {
        Ok(self.chunker.split_passages(passages)?)
    }

    /// Embed chunk texts in configured batches.
    ///
    /// Chunks whose embedding comes back with the wrong dimension are
    /// dropped with a warning rather than poisoning the index.
    pub fn embed(&self, chunks: &[Chunk]) -> Result<Vec<EmbeddedChunk>, PipelineError> {
        let expected = self.embedder.info().dimension;
        let mut embedded = Vec::with_capacity(chunks.len());

        for group in chunks.chunks(self.config.embed_batch_size) {
            let texts: Vec<&str> = group.iter().map(|c| c.text.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;

            for (chunk, embedding) in group.iter().zip(vectors) {
                if embedding.dimension() != expected {
                    warn!(
                        source_doc_id = %chunk.metadata.source_doc_id,
                        chunk_index = chunk.chunk_index,
                        dimension = embedding.dimension(),
                        expected,
                        "Embedding has wrong dimension, chunk dropped"
                    );
                    continue;
                }
                embedded.push(EmbeddedChunk {
                    chunk: chunk.clone(),
                    embedding,
                });
            }
        }

        Ok(embedded)
    }

    /// Append embedded chunks to the index and document store.
    ///
    /// Already-indexed `(source_doc_id, chunk_index)` pairs are fetched once
    /// up front, so duplicate checks are local set lookups. Returns the
    /// number of chunks actually indexed.
    pub fn index_chunks(
        &self,
        athlete_name: &str,
        embedded: Vec<EmbeddedChunk>,
    ) -> Result<usize, PipelineError> {
        if embedded.is_empty() {
            return Ok(0);
        }

        let mut seen = if self.config.skip_duplicates {
            self.store.indexed_chunk_keys(athlete_name)?
        } else {
            HashSet::new()
        };

        let model = self.embedder.info().clone();
        let mut index = self
            .index
            .write()
            .map_err(|e| PipelineError::Lock(e.to_string()))?;

        let base = index.next_id();
        let mut pending: Vec<(Embedding, String)> = Vec::new();

        for item in embedded {
            let dedup_key = item.chunk.dedup_key();
            if self.config.skip_duplicates && seen.contains(&dedup_key) {
                debug!(
                    source_doc_id = %dedup_key.0,
                    chunk_index = dedup_key.1,
                    "Duplicate chunk, skipped"
                );
                continue;
            }

            let vector_id = base + pending.len() as u64;
            let record =
                ChunkRecord::from_chunk(&item.chunk, vector_id, &model.name, model.dimension);
            let store_key = self.store.insert(&record)?;
            pending.push((item.embedding, store_key));
            seen.insert(dedup_key);
        }

        if pending.is_empty() {
            debug!(athlete = %athlete_name, "All chunks were duplicates, nothing to index");
            return Ok(0);
        }

        let indexed = pending.len();
        index.append_batch(&pending)?;
        index.save()?;

        info!(
            athlete = %athlete_name,
            indexed,
            vectors = index.len(),
            "Indexed chunks"
        );
        Ok(indexed)
    }

    /// Run the full pipeline for one athlete.
    pub fn run(&self, athlete_name: &str, skip_indexed: bool) -> Result<RunStats, PipelineError> {
        let started = Instant::now();
        info!(athlete = %athlete_name, skip_indexed, "Starting indexing run");

        let passages = self.fetch(athlete_name, skip_indexed)?;
        if passages.is_empty() {
            return Ok(RunStats::finished(
                athlete_name,
                RunStatus::NoNewDocuments,
                0,
                0,
                0,
                started.elapsed(),
            ));
        }

        let chunks = self.chunk(&passages)?;
        if chunks.is_empty() {
            return Ok(RunStats::finished(
                athlete_name,
                RunStatus::NoChunksCreated,
                passages.len(),
                0,
                0,
                started.elapsed(),
            ));
        }

        let embedded = self.embed(&chunks)?;
        let indexed = self.index_chunks(athlete_name, embedded)?;

        let stats = RunStats::finished(
            athlete_name,
            RunStatus::Success,
            passages.len(),
            chunks.len(),
            indexed,
            started.elapsed(),
        );
        info!(
            athlete = %athlete_name,
            documents = stats.documents_loaded,
            chunks = stats.chunks_created,
            indexed = stats.chunks_indexed,
            "Indexing run finished"
        );
        Ok(stats)
    }

    /// Run the pipeline for a batch of athletes.
    ///
    /// A failure for one athlete is recorded in its stats entry and does
    /// not abort the remaining runs; the result always has one entry per
    /// athlete, in input order.
    pub fn run_all(&self, athlete_names: &[String]) -> Vec<RunStats> {
        athlete_names
            .iter()
            .map(|name| match self.run(name, true) {
                Ok(stats) => stats,
                Err(e) => {
                    error!(athlete = %name, error = %e, "Indexing run failed");
                    RunStats::failed(name, e.to_string())
                }
            })
            .collect()
    }

    /// Remove an athlete's records and tombstone their vectors.
    ///
    /// Returns the number of vectors newly revoked.
    pub fn delete_athlete(&self, athlete_name: &str) -> Result<usize, PipelineError> {
        let vector_ids = self.store.delete_athlete(athlete_name)?;
        if vector_ids.is_empty() {
            return Ok(0);
        }

        let mut index = self
            .index
            .write()
            .map_err(|e| PipelineError::Lock(e.to_string()))?;
        let revoked = index.revoke(&vector_ids);
        index.save()?;

        info!(athlete = %athlete_name, revoked, "Revoked athlete vectors");
        Ok(revoked)
    }

    /// Combined store and index statistics, optionally athlete-scoped.
    pub fn stats(&self, athlete_name: Option<&str>) -> Result<StoreStats, PipelineError> {
        let chunk_records = self.store.count(athlete_name)?;
        let index = self
            .index
            .read()
            .map_err(|e| PipelineError::Lock(e.to_string()))?;
        let index_stats = index.stats();

        Ok(StoreStats {
            chunk_records,
            vector_count: index_stats.vector_count,
            revoked_count: index_stats.revoked_count,
            dimension: index_stats.dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_embed::{EmbeddingError, ModelInfo};
    use scout_store::MemoryStore;
    use scout_vector::IndexConfig;
    use tempfile::TempDir;

    const DIM: usize = 8;

    /// Deterministic embedder: folds text bytes into a fixed-dimension
    /// vector, so identical texts always embed identically.
    struct FoldEmbedder {
        info: ModelInfo,
    }

    impl FoldEmbedder {
        fn new() -> Self {
            Self {
                info: ModelInfo {
                    name: "fold-test".to_string(),
                    dimension: DIM,
                },
            }
        }
    }

    impl EmbeddingModel for FoldEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut values = vec![1.0f32; DIM];
                    for (i, b) in text.bytes().enumerate() {
                        values[i % DIM] += b as f32;
                    }
                    Embedding::new(values)
                })
                .collect())
        }
    }

    /// Embedder that returns a wrong-dimension vector for texts containing
    /// a marker word, and a valid vector otherwise.
    struct GlitchEmbedder {
        info: ModelInfo,
    }

    impl GlitchEmbedder {
        fn new() -> Self {
            Self {
                info: ModelInfo {
                    name: "glitch-test".to_string(),
                    dimension: DIM,
                },
            }
        }
    }

    impl EmbeddingModel for GlitchEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|text| {
                    if text.contains("glitch") {
                        Embedding::new(vec![1.0; DIM + 1])
                    } else {
                        Embedding::new(vec![1.0; DIM])
                    }
                })
                .collect())
        }
    }

    /// Embedder that always fails, for error-path tests.
    struct BrokenEmbedder {
        info: ModelInfo,
    }

    impl EmbeddingModel for BrokenEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
            Err(EmbeddingError::InvalidResponse(
                "service unavailable".to_string(),
            ))
        }
    }

    fn pipeline_at(
        temp: &TempDir,
        config: PipelineConfig,
    ) -> (
        IndexingPipeline<FoldEmbedder, MemoryStore, MemoryStore>,
        Arc<MemoryStore>,
        Arc<RwLock<VectorIndex>>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let index = Arc::new(RwLock::new(
            VectorIndex::open(IndexConfig::new(DIM, temp.path())).unwrap(),
        ));
        let pipeline = IndexingPipeline::new(
            Arc::new(FoldEmbedder::new()),
            store.clone(),
            store.clone(),
            index.clone(),
            config,
        )
        .unwrap();
        (pipeline, store, index)
    }

    fn long_passage(id: &str, athlete: &str, seed: &str) -> SourcePassage {
        let text = format!("{} match report. ", seed).repeat(12);
        SourcePassage::new(id, athlete, text)
    }

    #[test]
    fn test_run_indexes_passages() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, index) = pipeline_at(&temp, PipelineConfig::default());

        store.put_passage(&long_passage("p-1", "A", "opening goal")).unwrap();
        store.put_passage(&long_passage("p-2", "A", "late equalizer")).unwrap();

        let stats = pipeline.run("A", true).unwrap();
        assert_eq!(stats.status, RunStatus::Success);
        assert_eq!(stats.documents_loaded, 2);
        assert!(stats.chunks_indexed >= 2);
        assert_eq!(stats.chunks_created, stats.chunks_indexed);

        assert_eq!(store.count(Some("A")).unwrap(), stats.chunks_indexed);
        assert_eq!(index.read().unwrap().len(), stats.chunks_indexed);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, index) = pipeline_at(&temp, PipelineConfig::default());

        store.put_passage(&long_passage("p-1", "A", "training update")).unwrap();

        let first = pipeline.run("A", true).unwrap();
        assert_eq!(first.status, RunStatus::Success);
        let count_after_first = store.count(None).unwrap();

        let second = pipeline.run("A", true).unwrap();
        assert_eq!(second.status, RunStatus::NoNewDocuments);
        assert_eq!(second.chunks_indexed, 0);
        assert_eq!(store.count(None).unwrap(), count_after_first);
        assert_eq!(index.read().unwrap().len(), count_after_first);
    }

    #[test]
    fn test_duplicates_suppressed_without_skip_indexed() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, _) = pipeline_at(&temp, PipelineConfig::default());

        store.put_passage(&long_passage("p-1", "A", "injury news")).unwrap();

        let first = pipeline.run("A", false).unwrap();
        assert!(first.chunks_indexed > 0);

        // Re-chunked and re-embedded, but every chunk is a known duplicate.
        let second = pipeline.run("A", false).unwrap();
        assert_eq!(second.status, RunStatus::Success);
        assert_eq!(second.chunks_created, first.chunks_created);
        assert_eq!(second.chunks_indexed, 0);
    }

    #[test]
    fn test_short_passages_filtered_out() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, _) = pipeline_at(&temp, PipelineConfig::default());

        store
            .put_passage(&SourcePassage::new("p-1", "A", "too short"))
            .unwrap();

        let stats = pipeline.run("A", true).unwrap();
        assert_eq!(stats.status, RunStatus::NoNewDocuments);
        assert_eq!(stats.documents_loaded, 0);
    }

    #[test]
    fn test_whitespace_passage_yields_no_chunks_status() {
        let temp = TempDir::new().unwrap();
        let config = PipelineConfig::default().with_min_passage_chars(0);
        let (pipeline, store, _) = pipeline_at(&temp, config);

        store
            .put_passage(&SourcePassage::new("p-1", "A", "   \n\t  "))
            .unwrap();

        let stats = pipeline.run("A", true).unwrap();
        assert_eq!(stats.status, RunStatus::NoChunksCreated);
        assert_eq!(stats.documents_loaded, 1);
        assert_eq!(stats.chunks_created, 0);
    }

    #[test]
    fn test_wrong_dimension_chunks_dropped_not_fatal() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let index = Arc::new(RwLock::new(
            VectorIndex::open(IndexConfig::new(DIM, temp.path())).unwrap(),
        ));
        let pipeline = IndexingPipeline::new(
            Arc::new(GlitchEmbedder::new()),
            store.clone(),
            store.clone(),
            index.clone(),
            PipelineConfig::default(),
        )
        .unwrap();

        store.put_passage(&long_passage("p-1", "A", "clean sheet")).unwrap();
        store.put_passage(&long_passage("p-2", "A", "glitch report")).unwrap();

        let stats = pipeline.run("A", true).unwrap();
        assert_eq!(stats.status, RunStatus::Success);
        assert_eq!(stats.documents_loaded, 2);
        assert_eq!(stats.chunks_created, 2);
        assert_eq!(stats.chunks_indexed, 1);

        assert_eq!(store.count(Some("A")).unwrap(), 1);
        assert_eq!(index.read().unwrap().len(), 1);

        // The dropped chunk was never recorded, so a later run with a
        // healthy embedder could still pick up its passage.
        assert!(store.indexed_source_ids("A").unwrap().contains("p-1"));
        assert!(!store.indexed_source_ids("A").unwrap().contains("p-2"));
    }

    #[test]
    fn test_run_all_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let index = Arc::new(RwLock::new(
            VectorIndex::open(IndexConfig::new(DIM, temp.path())).unwrap(),
        ));
        let pipeline = IndexingPipeline::new(
            Arc::new(BrokenEmbedder {
                info: ModelInfo {
                    name: "broken".to_string(),
                    dimension: DIM,
                },
            }),
            store.clone(),
            store.clone(),
            index,
            PipelineConfig::default(),
        )
        .unwrap();

        // "A" has no passages, "B" has one that will hit the broken embedder.
        store.put_passage(&long_passage("p-1", "B", "transfer rumor")).unwrap();

        let names = vec!["A".to_string(), "B".to_string()];
        let results = pipeline.run_all(&names);
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].athlete_name, "A");
        assert_eq!(results[0].status, RunStatus::NoNewDocuments);

        assert_eq!(results[1].athlete_name, "B");
        assert_eq!(results[1].status, RunStatus::Error);
        assert!(results[1].error.as_deref().unwrap().contains("unavailable"));
    }

    #[test]
    fn test_delete_athlete_revokes_vectors() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, _) = pipeline_at(&temp, PipelineConfig::default());

        store.put_passage(&long_passage("p-1", "A", "season recap")).unwrap();
        store.put_passage(&long_passage("p-2", "B", "cup final")).unwrap();

        let a_stats = pipeline.run("A", true).unwrap();
        pipeline.run("B", true).unwrap();

        let revoked = pipeline.delete_athlete("A").unwrap();
        assert_eq!(revoked, a_stats.chunks_indexed);
        assert_eq!(store.count(Some("A")).unwrap(), 0);
        assert!(store.count(Some("B")).unwrap() > 0);

        let stats = pipeline.stats(None).unwrap();
        assert_eq!(stats.revoked_count, revoked);

        // Deleting again is a no-op.
        assert_eq!(pipeline.delete_athlete("A").unwrap(), 0);
    }

    #[test]
    fn test_stats_scoped_by_athlete() {
        let temp = TempDir::new().unwrap();
        let (pipeline, store, _) = pipeline_at(&temp, PipelineConfig::default());

        store.put_passage(&long_passage("p-1", "A", "derby win")).unwrap();
        pipeline.run("A", true).unwrap();

        let all = pipeline.stats(None).unwrap();
        assert_eq!(all.dimension, DIM);
        assert_eq!(all.chunk_records, all.vector_count);
        assert_eq!(pipeline.stats(Some("B")).unwrap().chunk_records, 0);
    }
}
