//! Error handling for the catalog service.

pub mod domain;
pub mod error_code;

pub use domain::CatalogError;
pub use error_code::ErrorCode;
