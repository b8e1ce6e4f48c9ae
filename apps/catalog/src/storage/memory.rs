//! In-memory object store that records every call.
//!
//! Failures can be injected per operation kind, and an artificial latency
//! makes cancellation paths observable in tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{check_key, ObjectStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOpKind {
    Save,
    Delete,
    Get,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Save { key: String, size: usize },
    Delete { key: String },
    Get { key: String },
}

impl StoreOp {
    pub fn kind(&self) -> StoreOpKind {
        match self {
            StoreOp::Save { .. } => StoreOpKind::Save,
            StoreOp::Delete { .. } => StoreOpKind::Delete,
            StoreOp::Get { .. } => StoreOpKind::Get,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    failing: Arc<Mutex<HashSet<StoreOpKind>>>,
    latency: Option<Duration>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Fail every later call of this kind. The call is still recorded.
    pub fn inject_failure(&self, kind: StoreOpKind) {
        lock(&self.failing).insert(kind);
    }

    pub fn operations(&self) -> Vec<StoreOp> {
        lock(&self.operations).clone()
    }

    pub fn count(&self, kind: StoreOpKind) -> usize {
        lock(&self.operations)
            .iter()
            .filter(|op| op.kind() == kind)
            .count()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.objects).contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.objects).keys().cloned().collect();
        keys.sort();
        keys
    }

    fn record(&self, op: StoreOp) {
        lock(&self.operations).push(op);
    }

    fn check_failure(&self, kind: StoreOpKind, key: &str) -> Result<(), StorageError> {
        if lock(&self.failing).contains(&kind) {
            return Err(StorageError::Unavailable(format!(
                "injected {kind:?} failure for {key}"
            )));
        }
        Ok(())
    }

    async fn maybe_delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn save(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        self.record(StoreOp::Save {
            key: key.to_string(),
            size: bytes.len(),
        });
        self.maybe_delay().await;
        check_key(key)?;
        self.check_failure(StoreOpKind::Save, key)?;

        lock(&self.objects).insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.record(StoreOp::Delete {
            key: key.to_string(),
        });
        self.maybe_delay().await;
        check_key(key)?;
        self.check_failure(StoreOpKind::Delete, key)?;

        lock(&self.objects).remove(key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.record(StoreOp::Get {
            key: key.to_string(),
        });
        self.maybe_delay().await;
        check_key(key)?;
        self.check_failure(StoreOpKind::Get, key)?;

        lock(&self.objects)
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
