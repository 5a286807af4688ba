//! Flat inner-product index.
//!
//! Row-major storage of unit-normalized vectors. Search is an exact
//! exhaustive scan; with normalized operands the inner product equals
//! cosine similarity, so scores lie in [-1, 1].

use std::collections::HashSet;

use scout_embed::Embedding;
use tracing::debug;

use crate::error::VectorError;

/// One search result: internal vector id and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Internal vector id (dense, zero-based)
    pub vector_id: u64,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

impl SearchHit {
    pub fn new(vector_id: u64, score: f32) -> Self {
        Self { vector_id, score }
    }
}

/// Append-only flat vector store.
///
/// Ids are assigned densely from zero: the id of a new vector equals the
/// vector count at insertion time, and ids are never reused. There is no
/// in-place removal; [`FlatIndex::revoke`] tombstones an id so search skips
/// it, and reclaiming space requires a full rebuild.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    /// Row-major vector data, `len() * dimension` floats
    data: Vec<f32>,
    /// Tombstoned ids, never returned from search
    deleted: HashSet<u64>,
}

impl FlatIndex {
    /// Create an empty index with a fixed dimension.
    pub fn new(dimension: usize) -> Result<Self, VectorError> {
        if dimension == 0 {
            return Err(VectorError::Config("dimension must be > 0".to_string()));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
            deleted: HashSet::new(),
        })
    }

    /// Rebuild an index from persisted parts. Internal to this crate.
    pub(crate) fn from_parts(
        dimension: usize,
        data: Vec<f32>,
        deleted: HashSet<u64>,
    ) -> Result<Self, VectorError> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(VectorError::Serialization(format!(
                "vector blob length {} is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            data,
            deleted,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors ever appended (tombstoned ids included).
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of tombstoned ids.
    pub fn revoked_count(&self) -> usize {
        self.deleted.len()
    }

    pub(crate) fn raw_data(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn deleted_ids(&self) -> &HashSet<u64> {
        &self.deleted
    }

    /// Append one vector, normalizing it to unit length.
    ///
    /// Returns the assigned id (== the count before insertion).
    pub fn append(&mut self, embedding: &Embedding) -> Result<u64, VectorError> {
        if embedding.dimension() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.dimension(),
            });
        }

        let id = self.len() as u64;
        self.data.extend(normalized(&embedding.values));
        debug!(vector_id = id, "Appended vector");
        Ok(id)
    }

    /// Tombstone an id. Returns false if the id is out of range or already
    /// revoked.
    pub fn revoke(&mut self, vector_id: u64) -> bool {
        if vector_id >= self.len() as u64 {
            return false;
        }
        self.deleted.insert(vector_id)
    }

    /// Whether an id has been tombstoned.
    pub fn is_revoked(&self, vector_id: u64) -> bool {
        self.deleted.contains(&vector_id)
    }

    /// Exact top-k search by inner product over normalized vectors.
    ///
    /// Returns up to `k` hits sorted by descending score; fewer when the
    /// index holds fewer live vectors, and an empty vec for an empty index.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>, VectorError> {
        if query.dimension() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            });
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = normalized(&query.values);
        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .filter(|(id, _)| !self.deleted.contains(&(*id as u64)))
            .map(|(id, row)| {
                let score: f32 = row.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                SearchHit::new(id as u64, score)
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Normalize a vector to unit L2 length. A zero vector is returned as-is.
fn normalized(values: &[f32]) -> Vec<f32> {
    let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        values.iter().map(|x| x / norm).collect()
    } else {
        values.to_vec()
    }
}
