//! Catalog test support utilities
//!
//! Shared bootstrap for integration test binaries of the catalog service.

pub mod logging;
