pub mod catalog;
pub mod resolver;

pub use catalog::{AddGameOutcome, CatalogService, DeleteOutcome};
pub use resolver::{resolve_by_names, RefKind};
