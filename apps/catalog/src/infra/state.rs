use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{CatalogRepoSea, MemoryCatalogRepo};
use crate::config::db::DbKind;
use crate::config::storage::StorageSettings;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::{AppState, DEFAULT_REQUEST_TIMEOUT};
use crate::storage::{FsObjectStore, MemoryObjectStore, ObjectStore};

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    db_kind: Option<DbKind>,
    storage: Option<StorageSettings>,
    store: Option<Arc<dyn ObjectStore>>,
    request_timeout: Duration,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_kind: None,
            storage: None,
            store: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Use the SeaORM repository on this database. Without it the
    /// in-memory repository is used.
    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    /// Filesystem object store with these settings.
    pub fn with_storage(mut self, settings: StorageSettings) -> Self {
        self.storage = Some(settings);
        self
    }

    /// Explicit object store; wins over `with_storage`.
    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store: Arc<dyn ObjectStore> = match (self.store, self.storage) {
            (Some(store), _) => store,
            (None, Some(settings)) => Arc::new(FsObjectStore::new(
                settings.image_root,
                settings.public_base_url,
            )),
            (None, None) => Arc::new(MemoryObjectStore::new()),
        };

        let state = match self.db_kind {
            Some(kind) => {
                // single entrypoint: connect + migrate
                let conn = bootstrap_db(kind).await?;
                AppState::new(Arc::new(CatalogRepoSea::new(conn.clone())), store).with_db(conn)
            }
            None => AppState::new(Arc::new(MemoryCatalogRepo::new()), store),
        };

        Ok(state.with_request_timeout(self.request_timeout))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
