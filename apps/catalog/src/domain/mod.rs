//! Pure catalog rules: status machine, create validation, listing facets.

pub mod filters;
pub mod game;
pub mod status;

pub use filters::{GameFilters, ListingPlan, DEFAULT_LIST_LIMIT};
pub use game::{image_key, slug, NewGame, ReleaseDateParts, ValidGame};
pub use status::{is_allowed, GameStatus};
