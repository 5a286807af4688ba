//! Durable vector index.
//!
//! [`VectorIndex`] pairs the flat vector store with the id→key mapping and
//! owns their on-disk persistence. The two artifacts are saved and loaded
//! as a unit; a missing pair starts empty, damaged files degrade to empty
//! with a warning, and only a parsed-but-wrong dimension is fatal, since
//! that is a configuration conflict rather than corruption.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use scout_embed::Embedding;

use crate::error::VectorError;
use crate::flat::{FlatIndex, SearchHit};
use crate::id_map::IdMap;

/// On-disk format version for both artifacts.
const FORMAT_VERSION: u32 = 1;

/// File name of the binary vector blob.
pub const VECTORS_FILE: &str = "vectors.bin";
/// File name of the id-mapping document.
pub const ID_MAP_FILE: &str = "id_map.json";

/// Vector index configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Embedding dimension, fixed for the lifetime of a persisted index
    pub dimension: usize,
    /// Directory holding the two persisted artifacts
    pub index_path: PathBuf,
}

impl IndexConfig {
    pub fn new(dimension: usize, index_path: impl Into<PathBuf>) -> Self {
        Self {
            dimension,
            index_path: index_path.into(),
        }
    }
}

/// Index statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    /// Vectors ever appended (tombstoned included)
    pub vector_count: usize,
    /// Tombstoned vector ids
    pub revoked_count: usize,
    /// Embedding dimension
    pub dimension: usize,
}

#[derive(Serialize, Deserialize)]
struct VectorBlob {
    version: u32,
    dimension: u32,
    count: u64,
    data: Vec<f32>,
    deleted: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct IdMapFile {
    version: u32,
    next_id: u64,
    mapping: BTreeMap<u64, String>,
}

/// Flat vector store plus id mapping, persisted as a unit.
pub struct VectorIndex {
    config: IndexConfig,
    flat: FlatIndex,
    id_map: IdMap,
}

impl VectorIndex {
    /// Open a persisted index, or create an empty one.
    ///
    /// Missing files start fresh; unreadable, structurally invalid, or
    /// mutually inconsistent files are discarded with a warning and the
    /// index starts fresh. A valid blob whose dimension differs from the
    /// configured dimension is a fatal configuration error.
    pub fn open(config: IndexConfig) -> Result<Self, VectorError> {
        if config.dimension == 0 {
            return Err(VectorError::Config("dimension must be > 0".to_string()));
        }

        let loaded = Self::try_load(&config)?;
        let (flat, id_map) = match loaded {
            Some(parts) => parts,
            None => (FlatIndex::new(config.dimension)?, IdMap::new()),
        };

        info!(
            path = ?config.index_path,
            dimension = config.dimension,
            vectors = flat.len(),
            "Opened vector index"
        );

        Ok(Self {
            config,
            flat,
            id_map,
        })
    }

    /// Attempt to load both artifacts. `Ok(None)` means "start fresh".
    fn try_load(config: &IndexConfig) -> Result<Option<(FlatIndex, IdMap)>, VectorError> {
        let vectors_file = config.index_path.join(VECTORS_FILE);
        let id_map_file = config.index_path.join(ID_MAP_FILE);

        if !vectors_file.exists() || !id_map_file.exists() {
            info!(path = ?config.index_path, "No persisted index found, starting empty");
            return Ok(None);
        }

        let blob_bytes = match fs::read(&vectors_file) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, path = ?vectors_file, "Unreadable vector blob, starting empty");
                return Ok(None);
            }
        };
        let blob: VectorBlob = match bincode::deserialize(&blob_bytes) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, path = ?vectors_file, "Invalid vector blob, starting empty");
                return Ok(None);
            }
        };

        if blob.version != FORMAT_VERSION {
            warn!(
                version = blob.version,
                expected = FORMAT_VERSION,
                "Unknown vector blob version, starting empty"
            );
            return Ok(None);
        }

        // A well-formed blob with the wrong dimension is a config conflict,
        // not corruption.
        if blob.dimension as usize != config.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: config.dimension,
                actual: blob.dimension as usize,
            });
        }

        if blob.data.len() as u64 != blob.count * blob.dimension as u64 {
            warn!(
                count = blob.count,
                floats = blob.data.len(),
                "Vector blob length inconsistent with count, starting empty"
            );
            return Ok(None);
        }

        let map_bytes = match fs::read(&id_map_file) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, path = ?id_map_file, "Unreadable id map, starting empty");
                return Ok(None);
            }
        };
        let map_file: IdMapFile = match serde_json::from_slice(&map_bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, path = ?id_map_file, "Invalid id map, starting empty");
                return Ok(None);
            }
        };

        if map_file.version != FORMAT_VERSION {
            warn!(
                version = map_file.version,
                expected = FORMAT_VERSION,
                "Unknown id map version, starting empty"
            );
            return Ok(None);
        }

        if map_file.mapping.len() as u64 != blob.count {
            warn!(
                vectors = blob.count,
                mapped = map_file.mapping.len(),
                "Id map inconsistent with vector blob, starting empty"
            );
            return Ok(None);
        }

        let deleted: HashSet<u64> = blob.deleted.into_iter().collect();
        let flat = match FlatIndex::from_parts(config.dimension, blob.data, deleted) {
            Ok(flat) => flat,
            Err(e) => {
                warn!(error = %e, "Could not rebuild flat index, starting empty");
                return Ok(None);
            }
        };
        let id_map = IdMap::from_parts(map_file.next_id, map_file.mapping);

        info!(vectors = flat.len(), "Loaded persisted vector index");
        Ok(Some((flat, id_map)))
    }

    /// Persist both artifacts.
    ///
    /// Each file is written to a temporary sibling and renamed into place,
    /// so a crash mid-save never leaves a half-written artifact.
    pub fn save(&self) -> Result<(), VectorError> {
        fs::create_dir_all(&self.config.index_path)?;

        let blob = VectorBlob {
            version: FORMAT_VERSION,
            dimension: self.config.dimension as u32,
            count: self.flat.len() as u64,
            data: self.flat.raw_data().to_vec(),
            deleted: self.flat.deleted_ids().iter().copied().collect(),
        };
        let blob_bytes =
            bincode::serialize(&blob).map_err(|e| VectorError::Serialization(e.to_string()))?;
        write_atomic(&self.config.index_path.join(VECTORS_FILE), &blob_bytes)?;

        let map_file = IdMapFile {
            version: FORMAT_VERSION,
            next_id: self.id_map.next_id(),
            mapping: self.id_map.mapping().clone(),
        };
        let map_bytes = serde_json::to_vec(&map_file)
            .map_err(|e| VectorError::Serialization(e.to_string()))?;
        write_atomic(&self.config.index_path.join(ID_MAP_FILE), &map_bytes)?;

        info!(
            path = ?self.config.index_path,
            vectors = self.flat.len(),
            "Saved vector index"
        );
        Ok(())
    }

    /// Append a batch of vectors, assigning dense ids and recording their
    /// document-store keys. Returns the assigned ids in order.
    ///
    /// Does not persist; call [`VectorIndex::save`] once per run.
    pub fn append_batch(
        &mut self,
        items: &[(Embedding, String)],
    ) -> Result<Vec<u64>, VectorError> {
        let mut ids = Vec::with_capacity(items.len());
        for (embedding, key) in items {
            let id = self.flat.append(embedding)?;
            self.id_map.record(id, key.clone());
            ids.push(id);
        }
        Ok(ids)
    }

    /// Exact top-k search. Tombstoned ids never surface.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>, VectorError> {
        self.flat.search(query, k)
    }

    /// Tombstone a set of vector ids. Returns how many were newly revoked.
    pub fn revoke(&mut self, vector_ids: &[u64]) -> usize {
        vector_ids
            .iter()
            .filter(|id| self.flat.revoke(**id))
            .count()
    }

    /// Resolve a vector id to its document-store key.
    pub fn key_for(&self, vector_id: u64) -> Option<&str> {
        self.id_map.get(vector_id)
    }

    /// The id the next appended vector will receive.
    pub fn next_id(&self) -> u64 {
        self.flat.len() as u64
    }

    /// Vectors ever appended (tombstoned included).
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            vector_count: self.flat.len(),
            revoked_count: self.flat.revoked_count(),
            dimension: self.config.dimension,
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), VectorError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
