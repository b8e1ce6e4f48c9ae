//! Environment-driven configuration.

pub mod db;
pub mod server;
pub mod storage;

pub use db::{db_url, DbKind};
pub use server::ServerSettings;
pub use storage::StorageSettings;
