pub mod game_genres;
pub mod game_tags;
pub mod games;
pub mod genres;
pub mod tags;

pub use game_genres::Entity as GameGenres;
pub use game_tags::Entity as GameTags;
pub use games::Entity as Games;
pub use games::Model as GameRow;
pub use genres::Entity as Genres;
pub use genres::Model as Genre;
pub use tags::Entity as Tags;
pub use tags::Model as Tag;
