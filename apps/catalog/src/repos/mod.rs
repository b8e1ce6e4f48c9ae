//! Repository traits for the catalog layer.

pub mod catalog;

pub use catalog::{
    CatalogRepo, DeletedGame, Game, GameRecord, GenreRef, NamedRef, NewGameRecord, ShortGame,
    TagRef,
};
