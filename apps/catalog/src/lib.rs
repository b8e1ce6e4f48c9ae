#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod middleware;
pub mod repos;
pub mod request;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod telemetry;

// Re-exports for public API
pub use adapters::{CatalogRepoSea, MemoryCatalogRepo};
pub use config::db::{db_url, DbKind};
pub use error::AppError;
pub use errors::{CatalogError, ErrorCode};
pub use infra::db::{bootstrap_db, connect_db};
pub use infra::state::build_state;
pub use middleware::{RequestTrace, StructuredLogger};
pub use repos::catalog::CatalogRepo;
pub use request::RequestCtx;
pub use services::catalog::CatalogService;
pub use state::app_state::AppState;
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectStore};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    catalog_test_support::logging::init();
}
