//! Catalog repository capability and the models it speaks.
//!
//! Two implementations exist: `adapters::catalog_sea::CatalogRepoSea`
//! (relational, SeaORM) and `adapters::memory::MemoryCatalogRepo`
//! (in-process fake used by tests and local runs).

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use time::Date;

use crate::domain::filters::ListingPlan;
use crate::domain::status::GameStatus;
use crate::entities::games;
use crate::errors::domain::CatalogError;
use crate::request::RequestCtx;

/// A tag or genre reference: identifier plus its unique name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

pub type TagRef = NamedRef;
pub type GenreRef = NamedRef;

/// Full game as returned by `GetGame`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub release_date: Date,
    /// Empty until a cover image has been stored.
    pub image_key: Option<String>,
    pub status: GameStatus,
    pub tags: Vec<TagRef>,
    pub genres: Vec<GenreRef>,
}

impl Game {
    pub fn tag_ids(&self) -> BTreeSet<i64> {
        self.tags.iter().map(|t| t.id).collect()
    }

    pub fn genre_ids(&self) -> BTreeSet<i64> {
        self.genres.iter().map(|g| g.id).collect()
    }
}

/// Listing summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortGame {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub release_date: Date,
    pub image_key: Option<String>,
}

/// Row-level view used by the duplicate pre-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: i64,
    pub title: String,
    pub release_date: Date,
    pub status: GameStatus,
}

/// Row to insert; status always starts at DRAFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameRecord {
    pub title: String,
    pub description: String,
    pub release_date: Date,
    pub image_key: Option<String>,
}

/// Snapshot of a game taken in the same transaction that deleted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedGame {
    pub id: i64,
    pub title: String,
    pub release_year: i32,
    pub image_key: Option<String>,
}

#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// Live game with this title whose release date falls in `year`.
    async fn find_by_title_year(
        &self,
        ctx: &RequestCtx,
        title: &str,
        year: i32,
    ) -> Result<Option<GameRecord>, CatalogError>;

    /// Tags whose name is in `names`; unknown names are simply absent.
    async fn find_tags_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<TagRef>, CatalogError>;

    async fn find_genres_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<GenreRef>, CatalogError>;

    /// Insert the game row and one association row per id, atomically.
    async fn save_game(
        &self,
        ctx: &RequestCtx,
        game: NewGameRecord,
        tag_ids: &BTreeSet<i64>,
        genre_ids: &BTreeSet<i64>,
    ) -> Result<i64, CatalogError>;

    async fn get_game(&self, ctx: &RequestCtx, id: i64) -> Result<Option<Game>, CatalogError>;

    /// Remove the game and its associations atomically; `None` if no row matched.
    async fn delete_game(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<DeletedGame>, CatalogError>;

    async fn game_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<GameStatus>, CatalogError>;

    /// Compare-and-set: writes `status` only while the row still holds
    /// `expected`. `false` when no row matched `id` and `expected`.
    async fn set_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
        expected: GameStatus,
        status: GameStatus,
    ) -> Result<bool, CatalogError>;

    /// Published games matching `plan`, ordered by (title, release date, id), limited.
    async fn list_games(
        &self,
        ctx: &RequestCtx,
        plan: &ListingPlan,
    ) -> Result<Vec<ShortGame>, CatalogError>;
}

// Conversions between SeaORM models and catalog models

impl From<games::Model> for GameRecord {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            release_date: model.release_date,
            status: model.status,
        }
    }
}

impl From<games::Model> for ShortGame {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            release_date: model.release_date,
            image_key: model.image_key,
        }
    }
}

impl From<games::Model> for DeletedGame {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            release_year: model.release_date.year(),
            title: model.title,
            image_key: model.image_key,
        }
    }
}
