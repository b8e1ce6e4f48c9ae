//! Key-addressed blob storage for cover images.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod fs;
pub mod memory;

pub use fs::FsObjectStore;
pub use memory::{MemoryObjectStore, StoreOp, StoreOpKind};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
    #[error("storage io error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous object. Returns the
    /// locator clients use to fetch it.
    async fn save(&self, key: &str, bytes: Bytes) -> Result<String, StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;
}

/// Keys are flat names; anything that could escape the store root is refused.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
