//! SeaORM adapter for the catalog repository - generic over ConnectionTrait.
//!
//! Free functions return `DbErr`; `CatalogRepoSea` wraps them, owns the
//! transaction boundaries and maps errors to `CatalogError`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};

use crate::db::txn::with_txn;
use crate::domain::filters::ListingPlan;
use crate::domain::status::GameStatus;
use crate::entities::{game_genres, game_tags, games, genres, tags};
use crate::errors::domain::CatalogError;
use crate::infra::db_errors::map_db_err;
use crate::repos::catalog::{
    CatalogRepo, DeletedGame, Game, GameRecord, GenreRef, NamedRef, NewGameRecord, ShortGame,
    TagRef,
};
use crate::request::RequestCtx;

mod listing;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id).one(conn).await
}

pub async fn find_by_title_year<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    title: &str,
    year: i32,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    let Some((start, end)) = crate::domain::game::year_bounds(year) else {
        return Ok(None);
    };

    games::Entity::find()
        .filter(games::Column::Title.eq(title))
        .filter(games::Column::ReleaseDate.gte(start))
        .filter(games::Column::ReleaseDate.lte(end))
        .order_by_asc(games::Column::Id)
        .one(conn)
        .await
}

pub async fn find_tags_by_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    names: &BTreeSet<String>,
) -> Result<Vec<tags::Model>, sea_orm::DbErr> {
    tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().cloned()))
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await
}

pub async fn find_genres_by_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    names: &BTreeSet<String>,
) -> Result<Vec<genres::Model>, sea_orm::DbErr> {
    genres::Entity::find()
        .filter(genres::Column::Name.is_in(names.iter().cloned()))
        .order_by_asc(genres::Column::Name)
        .all(conn)
        .await
}

/// Reference data is created out of band; this is the out-of-band path
/// (seeding, fixtures).
pub async fn insert_tag<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<tags::Model, sea_orm::DbErr> {
    tags::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    }
    .insert(conn)
    .await
}

pub async fn insert_genre<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<genres::Model, sea_orm::DbErr> {
    genres::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    }
    .insert(conn)
    .await
}

/// Game row plus association rows. Callers provide the transaction.
pub async fn insert_game_with_refs<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game: NewGameRecord,
    tag_ids: &BTreeSet<i64>,
    genre_ids: &BTreeSet<i64>,
) -> Result<games::Model, sea_orm::DbErr> {
    let row = games::ActiveModel {
        id: NotSet,
        title: Set(game.title),
        description: Set(game.description),
        release_date: Set(game.release_date),
        image_key: Set(game.image_key),
        status: Set(GameStatus::Draft),
    }
    .insert(conn)
    .await?;

    if !tag_ids.is_empty() {
        game_tags::Entity::insert_many(tag_ids.iter().map(|tag_id| game_tags::ActiveModel {
            game_id: Set(row.id),
            tag_id: Set(*tag_id),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    if !genre_ids.is_empty() {
        game_genres::Entity::insert_many(genre_ids.iter().map(|genre_id| {
            game_genres::ActiveModel {
                game_id: Set(row.id),
                genre_id: Set(*genre_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok(row)
}

pub async fn tags_of_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<tags::Model>, sea_orm::DbErr> {
    tags::Entity::find()
        .inner_join(game_tags::Entity)
        .filter(game_tags::Column::GameId.eq(game_id))
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await
}

pub async fn genres_of_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<genres::Model>, sea_orm::DbErr> {
    genres::Entity::find()
        .inner_join(game_genres::Entity)
        .filter(game_genres::Column::GameId.eq(game_id))
        .order_by_asc(genres::Column::Name)
        .all(conn)
        .await
}

/// Delete associations, then the row. Returns the row as it was.
pub async fn delete_game_cascade<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    let Some(row) = find_by_id(conn, game_id).await? else {
        return Ok(None);
    };

    game_tags::Entity::delete_many()
        .filter(game_tags::Column::GameId.eq(game_id))
        .exec(conn)
        .await?;
    game_genres::Entity::delete_many()
        .filter(game_genres::Column::GameId.eq(game_id))
        .exec(conn)
        .await?;

    let deleted = games::Entity::delete_many()
        .filter(games::Column::Id.eq(game_id))
        .exec(conn)
        .await?;

    if deleted.rows_affected == 0 {
        // Lost a race with another delete between the read and the delete.
        return Ok(None);
    }

    Ok(Some(row))
}

/// Rows affected; 0 when the game is gone or no longer in `expected`.
pub async fn update_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    expected: GameStatus,
    status: GameStatus,
) -> Result<u64, sea_orm::DbErr> {
    let result = games::Entity::update_many()
        .col_expr(games::Column::Status, Expr::val(status).into())
        .filter(games::Column::Id.eq(game_id))
        .filter(games::Column::Status.eq(expected))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn list_games<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    plan: &ListingPlan,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    if plan.is_unsatisfiable() {
        return Ok(Vec::new());
    }
    listing::listing_select(plan).all(conn).await
}

fn named(id: i64, name: String) -> NamedRef {
    NamedRef { id, name }
}

/// SeaORM implementation of `CatalogRepo`.
#[derive(Debug, Clone)]
pub struct CatalogRepoSea {
    db: DatabaseConnection,
}

impl CatalogRepoSea {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepo for CatalogRepoSea {
    async fn find_by_title_year(
        &self,
        ctx: &RequestCtx,
        title: &str,
        year: i32,
    ) -> Result<Option<GameRecord>, CatalogError> {
        debug!(request_id = %ctx.request_id(), title, year, "lookup game by title and year");
        let row = find_by_title_year(&self.db, title, year)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(GameRecord::from))
    }

    async fn find_tags_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<TagRef>, CatalogError> {
        debug!(request_id = %ctx.request_id(), count = names.len(), "lookup tags by name");
        let rows = find_tags_by_names(&self.db, names)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(|t| named(t.id, t.name)).collect())
    }

    async fn find_genres_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<GenreRef>, CatalogError> {
        debug!(request_id = %ctx.request_id(), count = names.len(), "lookup genres by name");
        let rows = find_genres_by_names(&self.db, names)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(|g| named(g.id, g.name)).collect())
    }

    async fn save_game(
        &self,
        ctx: &RequestCtx,
        game: NewGameRecord,
        tag_ids: &BTreeSet<i64>,
        genre_ids: &BTreeSet<i64>,
    ) -> Result<i64, CatalogError> {
        let tag_ids = tag_ids.clone();
        let genre_ids = genre_ids.clone();

        let row = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                insert_game_with_refs(txn, game, &tag_ids, &genre_ids)
                    .await
                    .map_err(map_db_err)
            })
        })
        .await?;

        info!(request_id = %ctx.request_id(), game_id = row.id, "game saved");
        Ok(row.id)
    }

    async fn get_game(&self, ctx: &RequestCtx, id: i64) -> Result<Option<Game>, CatalogError> {
        debug!(request_id = %ctx.request_id(), game_id = id, "load game");
        let Some(row) = find_by_id(&self.db, id).await.map_err(map_db_err)? else {
            return Ok(None);
        };
        let tags = tags_of_game(&self.db, id).await.map_err(map_db_err)?;
        let genres = genres_of_game(&self.db, id).await.map_err(map_db_err)?;

        Ok(Some(Game {
            id: row.id,
            title: row.title,
            description: row.description,
            release_date: row.release_date,
            image_key: row.image_key,
            status: row.status,
            tags: tags.into_iter().map(|t| named(t.id, t.name)).collect(),
            genres: genres.into_iter().map(|g| named(g.id, g.name)).collect(),
        }))
    }

    async fn delete_game(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<DeletedGame>, CatalogError> {
        let deleted = with_txn(&self.db, move |txn| {
            Box::pin(async move { delete_game_cascade(txn, id).await.map_err(map_db_err) })
        })
        .await?;

        if deleted.is_some() {
            info!(request_id = %ctx.request_id(), game_id = id, "game deleted");
        }
        Ok(deleted.map(DeletedGame::from))
    }

    async fn game_status(
        &self,
        _ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<GameStatus>, CatalogError> {
        let status = games::Entity::find_by_id(id)
            .select_only()
            .column(games::Column::Status)
            .into_tuple::<GameStatus>()
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(status)
    }

    async fn set_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
        expected: GameStatus,
        status: GameStatus,
    ) -> Result<bool, CatalogError> {
        let rows = update_status(&self.db, id, expected, status)
            .await
            .map_err(map_db_err)?;
        debug!(
            request_id = %ctx.request_id(),
            game_id = id,
            expected = expected.as_str(),
            status = status.as_str(),
            rows,
            "status updated"
        );
        Ok(rows > 0)
    }

    async fn list_games(
        &self,
        ctx: &RequestCtx,
        plan: &ListingPlan,
    ) -> Result<Vec<ShortGame>, CatalogError> {
        debug!(request_id = %ctx.request_id(), facets = plan.facets().len(), limit = plan.limit(), "list games");
        let rows = list_games(&self.db, plan).await.map_err(map_db_err)?;
        Ok(rows.into_iter().map(ShortGame::from).collect())
    }
}
