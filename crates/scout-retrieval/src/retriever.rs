//! Query-side retrieval.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use scout_embed::EmbeddingModel;
use scout_store::DocumentStore;
use scout_types::ChunkRecord;
use scout_vector::VectorIndex;

use crate::config::RetrieverConfig;
use crate::error::RetrievalError;

/// One retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    /// The stored chunk record
    pub record: ChunkRecord,
    /// Cosine similarity to the query, in [-1, 1]
    pub similarity: f32,
    /// Internal id of the matching vector
    pub vector_id: u64,
}

/// Semantic retriever over the vector index and document store.
pub struct Retriever<E, M>
where
    E: EmbeddingModel,
    M: DocumentStore,
{
    embedder: Arc<E>,
    store: Arc<M>,
    index: Arc<RwLock<VectorIndex>>,
    config: RetrieverConfig,
}

impl<E, M> Retriever<E, M>
where
    E: EmbeddingModel,
    M: DocumentStore,
{
    pub fn new(
        embedder: Arc<E>,
        store: Arc<M>,
        index: Arc<RwLock<VectorIndex>>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            index,
            config,
        }
    }

    /// Retrieve with the configured defaults.
    pub fn retrieve(
        &self,
        query: &str,
        athlete_filter: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        self.retrieve_top(
            query,
            athlete_filter,
            self.config.top_k,
            self.config.min_similarity,
        )
    }

    /// Retrieve the `top_k` most similar chunks for a query.
    ///
    /// With an athlete filter the index is over-fetched by the configured
    /// factor (capped at the index size), since filtering happens after the
    /// similarity search. Returns at most `top_k` results, sorted by
    /// descending similarity; fewer when the index or the filtered
    /// candidate set runs out.
    pub fn retrieve_top(
        &self,
        query: &str,
        athlete_filter: Option<&str>,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query)?;

        let index = self
            .index
            .read()
            .map_err(|e| RetrievalError::Lock(e.to_string()))?;
        if index.is_empty() {
            debug!("Vector index is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let search_k = match athlete_filter {
            Some(_) => (top_k * self.config.overfetch_factor).min(index.len()),
            None => top_k.min(index.len()),
        };
        let hits = index.search(&query_embedding, search_k)?;

        let mut results = Vec::with_capacity(top_k);
        for hit in hits {
            if hit.score < min_similarity {
                // Hits are sorted by descending score, so nothing after
                // this one can pass either.
                break;
            }

            let Some(key) = index.key_for(hit.vector_id) else {
                warn!(vector_id = hit.vector_id, "Vector id has no store key, skipped");
                continue;
            };
            let Some(record) = self.store.find_by_key(key)? else {
                warn!(vector_id = hit.vector_id, key = %key, "Stale store key, skipped");
                continue;
            };

            if let Some(athlete) = athlete_filter {
                if record.athlete_name != athlete {
                    continue;
                }
            }

            results.push(RetrievedChunk {
                record,
                similarity: hit.score,
                vector_id: hit.vector_id,
            });
            if results.len() == top_k {
                break;
            }
        }

        info!(
            athlete = athlete_filter.unwrap_or("<any>"),
            requested = top_k,
            returned = results.len(),
            "Retrieved chunks"
        );
        Ok(results)
    }
}
