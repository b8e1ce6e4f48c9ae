//! In-process `CatalogRepo` for tests and local runs without a database.
//!
//! Keeps the same observable contract as the SeaORM adapter: ids are
//! assigned on insert, saves and deletes are all-or-nothing, listing is
//! ordered by (title, release date, id). Individual operations can be made
//! to fail to exercise the orchestrator's error paths.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use time::Date;
use tracing::debug;

use crate::domain::filters::{Candidate, ListingPlan};
use crate::domain::game::year_bounds;
use crate::domain::status::GameStatus;
use crate::errors::domain::{CatalogError, InternalKind};
use crate::repos::catalog::{
    CatalogRepo, DeletedGame, Game, GameRecord, GenreRef, NamedRef, NewGameRecord, ShortGame,
    TagRef,
};
use crate::request::RequestCtx;

/// Repository operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOp {
    FindByTitleYear,
    FindTags,
    FindGenres,
    SaveGame,
    GetGame,
    DeleteGame,
    GameStatus,
    SetStatus,
    ListGames,
}

#[derive(Debug, Clone)]
struct StoredGame {
    title: String,
    description: String,
    release_date: Date,
    image_key: Option<String>,
    status: GameStatus,
    tag_ids: BTreeSet<i64>,
    genre_ids: BTreeSet<i64>,
}

#[derive(Debug, Default)]
struct State {
    next_game_id: i64,
    next_ref_id: i64,
    games: BTreeMap<i64, StoredGame>,
    tags: BTreeMap<i64, String>,
    genres: BTreeMap<i64, String>,
}

impl State {
    fn ref_id(&mut self) -> i64 {
        self.next_ref_id += 1;
        self.next_ref_id
    }

    fn refs(names: &BTreeMap<i64, String>, ids: &BTreeSet<i64>) -> Vec<NamedRef> {
        let mut out: Vec<NamedRef> = ids
            .iter()
            .filter_map(|id| {
                names.get(id).map(|name| NamedRef {
                    id: *id,
                    name: name.clone(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    fn lookup(names: &BTreeMap<i64, String>, wanted: &BTreeSet<String>) -> Vec<NamedRef> {
        let mut out: Vec<NamedRef> = names
            .iter()
            .filter(|(_, name)| wanted.contains(*name))
            .map(|(id, name)| NamedRef {
                id: *id,
                name: name.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogRepo {
    state: Arc<Mutex<State>>,
    failing: Arc<Mutex<HashSet<RepoOp>>>,
}

impl MemoryCatalogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed tags; returns self for chaining.
    pub fn with_tags<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_tag(name);
        }
        self
    }

    pub fn with_genres<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_genre(name);
        }
        self
    }

    /// Insert a tag (or return the id of an existing one with that name).
    pub fn add_tag(&self, name: impl Into<String>) -> i64 {
        let name = name.into();
        let mut state = lock(&self.state);
        if let Some((id, _)) = state.tags.iter().find(|(_, n)| **n == name) {
            return *id;
        }
        let id = state.ref_id();
        state.tags.insert(id, name);
        id
    }

    pub fn add_genre(&self, name: impl Into<String>) -> i64 {
        let name = name.into();
        let mut state = lock(&self.state);
        if let Some((id, _)) = state.genres.iter().find(|(_, n)| **n == name) {
            return *id;
        }
        let id = state.ref_id();
        state.genres.insert(id, name);
        id
    }

    /// Make every subsequent call of `op` fail with `Internal(DbUnavailable)`.
    pub fn fail_on(&self, op: RepoOp) {
        lock(&self.failing).insert(op);
    }

    pub fn game_count(&self) -> usize {
        lock(&self.state).games.len()
    }

    /// Total association rows (game_tag + game_genre).
    pub fn association_count(&self) -> usize {
        lock(&self.state)
            .games
            .values()
            .map(|g| g.tag_ids.len() + g.genre_ids.len())
            .sum()
    }

    fn check(&self, op: RepoOp) -> Result<(), CatalogError> {
        if lock(&self.failing).contains(&op) {
            return Err(CatalogError::internal(
                InternalKind::DbUnavailable,
                format!("injected failure: {op:?}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepo for MemoryCatalogRepo {
    async fn find_by_title_year(
        &self,
        _ctx: &RequestCtx,
        title: &str,
        year: i32,
    ) -> Result<Option<GameRecord>, CatalogError> {
        self.check(RepoOp::FindByTitleYear)?;
        let Some((start, end)) = year_bounds(year) else {
            return Ok(None);
        };
        let state = lock(&self.state);
        Ok(state
            .games
            .iter()
            .find(|(_, g)| g.title == title && g.release_date >= start && g.release_date <= end)
            .map(|(id, g)| GameRecord {
                id: *id,
                title: g.title.clone(),
                release_date: g.release_date,
                status: g.status,
            }))
    }

    async fn find_tags_by_names(
        &self,
        _ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<TagRef>, CatalogError> {
        self.check(RepoOp::FindTags)?;
        Ok(State::lookup(&lock(&self.state).tags, names))
    }

    async fn find_genres_by_names(
        &self,
        _ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<GenreRef>, CatalogError> {
        self.check(RepoOp::FindGenres)?;
        Ok(State::lookup(&lock(&self.state).genres, names))
    }

    async fn save_game(
        &self,
        ctx: &RequestCtx,
        game: NewGameRecord,
        tag_ids: &BTreeSet<i64>,
        genre_ids: &BTreeSet<i64>,
    ) -> Result<i64, CatalogError> {
        self.check(RepoOp::SaveGame)?;
        let mut state = lock(&self.state);

        // Validate everything before touching state so a failure leaves nothing behind.
        let dangling = tag_ids.iter().any(|id| !state.tags.contains_key(id))
            || genre_ids.iter().any(|id| !state.genres.contains_key(id));
        if dangling {
            return Err(CatalogError::internal(
                InternalKind::Other("ForeignKey".into()),
                "Foreign key constraint violation",
            ));
        }

        state.next_game_id += 1;
        let id = state.next_game_id;
        state.games.insert(
            id,
            StoredGame {
                title: game.title,
                description: game.description,
                release_date: game.release_date,
                image_key: game.image_key,
                status: GameStatus::Draft,
                tag_ids: tag_ids.clone(),
                genre_ids: genre_ids.clone(),
            },
        );
        debug!(request_id = %ctx.request_id(), game_id = id, "game saved (memory)");
        Ok(id)
    }

    async fn get_game(&self, _ctx: &RequestCtx, id: i64) -> Result<Option<Game>, CatalogError> {
        self.check(RepoOp::GetGame)?;
        let state = lock(&self.state);
        Ok(state.games.get(&id).map(|g| Game {
            id,
            title: g.title.clone(),
            description: g.description.clone(),
            release_date: g.release_date,
            image_key: g.image_key.clone(),
            status: g.status,
            tags: State::refs(&state.tags, &g.tag_ids),
            genres: State::refs(&state.genres, &g.genre_ids),
        }))
    }

    async fn delete_game(
        &self,
        _ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<DeletedGame>, CatalogError> {
        self.check(RepoOp::DeleteGame)?;
        Ok(lock(&self.state)
            .games
            .remove(&id)
            .map(|g| DeletedGame {
                id,
                release_year: g.release_date.year(),
                title: g.title,
                image_key: g.image_key,
            }))
    }

    async fn game_status(
        &self,
        _ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<GameStatus>, CatalogError> {
        self.check(RepoOp::GameStatus)?;
        Ok(lock(&self.state).games.get(&id).map(|g| g.status))
    }

    async fn set_status(
        &self,
        _ctx: &RequestCtx,
        id: i64,
        expected: GameStatus,
        status: GameStatus,
    ) -> Result<bool, CatalogError> {
        self.check(RepoOp::SetStatus)?;
        match lock(&self.state).games.get_mut(&id) {
            Some(game) if game.status == expected => {
                game.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_games(
        &self,
        _ctx: &RequestCtx,
        plan: &ListingPlan,
    ) -> Result<Vec<ShortGame>, CatalogError> {
        self.check(RepoOp::ListGames)?;
        let state = lock(&self.state);

        let mut hits: Vec<ShortGame> = state
            .games
            .iter()
            .filter(|(_, g)| {
                let candidate = Candidate {
                    status: g.status,
                    release_date: g.release_date,
                    tags: g
                        .tag_ids
                        .iter()
                        .filter_map(|id| state.tags.get(id).map(String::as_str))
                        .collect(),
                    genres: g
                        .genre_ids
                        .iter()
                        .filter_map(|id| state.genres.get(id).map(String::as_str))
                        .collect(),
                };
                plan.matches(&candidate)
            })
            .map(|(id, g)| ShortGame {
                id: *id,
                title: g.title.clone(),
                description: g.description.clone(),
                release_date: g.release_date,
                image_key: g.image_key.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            (a.title.as_str(), a.release_date, a.id).cmp(&(b.title.as_str(), b.release_date, b.id))
        });
        hits.truncate(usize::try_from(plan.limit()).unwrap_or(usize::MAX));
        Ok(hits)
    }
}
