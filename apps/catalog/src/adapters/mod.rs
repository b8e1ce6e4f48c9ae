//! Implementations of the repository capability traits.

pub mod catalog_sea;
pub mod memory;

pub use catalog_sea::CatalogRepoSea;
pub use memory::{MemoryCatalogRepo, RepoOp};
