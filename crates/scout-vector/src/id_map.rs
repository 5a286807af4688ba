//! Vector id to metadata key mapping.
//!
//! The durable join between vector space and the document store: every
//! appended vector records which document-store key holds its chunk.

use std::collections::BTreeMap;

/// Mapping from internal vector ids to document-store keys.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    next_id: u64,
    mapping: BTreeMap<u64, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(next_id: u64, mapping: BTreeMap<u64, String>) -> Self {
        Self { next_id, mapping }
    }

    /// Record the key for a newly assigned vector id.
    pub fn record(&mut self, vector_id: u64, key: impl Into<String>) {
        self.mapping.insert(vector_id, key.into());
        self.next_id = self.next_id.max(vector_id + 1);
    }

    /// Look up the document-store key for a vector id.
    pub fn get(&self, vector_id: u64) -> Option<&str> {
        self.mapping.get(&vector_id).map(String::as_str)
    }

    /// The id the next appended vector will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub(crate) fn mapping(&self) -> &BTreeMap<u64, String> {
        &self.mapping
    }
}
