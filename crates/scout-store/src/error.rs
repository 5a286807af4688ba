//! Document store error types.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// RocksDB error
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store opened with an invalid path or options
    #[error("Store config error: {0}")]
    Config(String),

    /// Expected column family handle is missing
    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),
}
