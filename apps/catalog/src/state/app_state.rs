use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::repos::catalog::CatalogRepo;
use crate::request::RequestCtx;
use crate::services::catalog::CatalogService;
use crate::storage::ObjectStore;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    repo: Arc<dyn CatalogRepo>,
    store: Arc<dyn ObjectStore>,
    /// Set when the repository is database-backed; used by health checks.
    db: Option<DatabaseConnection>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(repo: Arc<dyn CatalogRepo>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            repo,
            store,
            db: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_db(mut self, db: DatabaseConnection) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(Arc::clone(&self.repo), Arc::clone(&self.store))
    }

    /// Request scope bounded by this state's timeout.
    pub fn request_ctx(&self, request_id: impl Into<String>) -> RequestCtx {
        RequestCtx::new(request_id).with_timeout(self.request_timeout)
    }
}
