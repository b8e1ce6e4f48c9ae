#![allow(dead_code)]

//! Fixtures shared by the catalog integration tests.

use std::sync::Arc;

use catalog::adapters::catalog_sea::{insert_genre, insert_tag};
use catalog::adapters::{CatalogRepoSea, MemoryCatalogRepo};
use catalog::config::db::DbKind;
use catalog::domain::game::{NewGame, ReleaseDateParts};
use catalog::domain::status::GameStatus;
use catalog::infra::db::bootstrap_db;
use catalog::request::RequestCtx;
use catalog::services::catalog::CatalogService;
use catalog::storage::MemoryObjectStore;
use sea_orm::DatabaseConnection;

pub const TAGS: [&str; 4] = ["A", "B", "C", "rpg"];
pub const GENRES: [&str; 3] = ["X", "Y", "action"];

/// Fresh migrated in-memory SQLite database with reference data seeded.
pub async fn sqlite_db() -> DatabaseConnection {
    let conn = bootstrap_db(DbKind::SqliteMemory)
        .await
        .expect("bootstrap sqlite memory db");
    for name in TAGS {
        insert_tag(&conn, name).await.expect("seed tag");
    }
    for name in GENRES {
        insert_genre(&conn, name).await.expect("seed genre");
    }
    conn
}

pub struct SeaHarness {
    pub conn: DatabaseConnection,
    pub repo: CatalogRepoSea,
    pub store: MemoryObjectStore,
    pub service: CatalogService,
}

/// Service over the SeaORM repository and an in-memory object store.
pub async fn sea_harness() -> SeaHarness {
    let conn = sqlite_db().await;
    let repo = CatalogRepoSea::new(conn.clone());
    let store = MemoryObjectStore::new();
    let service = CatalogService::new(Arc::new(repo.clone()), Arc::new(store.clone()));
    SeaHarness {
        conn,
        repo,
        store,
        service,
    }
}

pub struct MemoryHarness {
    pub repo: MemoryCatalogRepo,
    pub store: MemoryObjectStore,
    pub service: CatalogService,
}

pub fn memory_harness() -> MemoryHarness {
    let repo = MemoryCatalogRepo::new().with_tags(TAGS).with_genres(GENRES);
    let store = MemoryObjectStore::new();
    let service = CatalogService::new(Arc::new(repo.clone()), Arc::new(store.clone()));
    MemoryHarness {
        repo,
        store,
        service,
    }
}

pub fn ctx() -> RequestCtx {
    RequestCtx::generate()
}

pub fn new_game(title: &str, year: i32, month: u8, day: u8) -> NewGame {
    NewGame::new(
        title,
        format!("{title} description"),
        ReleaseDateParts::new(year, month, day),
    )
}

/// The worked example: Nova (2020-05-01), tags A,B, genre X, with a cover.
pub fn nova() -> NewGame {
    new_game("Nova", 2020, 5, 1)
        .with_tags(["A", "B"])
        .with_genres(["X"])
        .with_cover(&b"\x89PNG nova"[..])
}

/// Create a game and walk it to PUBLISH.
pub async fn publish(service: &CatalogService, game: NewGame) -> i64 {
    let ctx = ctx();
    let id = service.add_game(&ctx, game).await.expect("create").id;
    service
        .update_status(&ctx, id, GameStatus::Pending)
        .await
        .expect("to pending");
    service
        .update_status(&ctx, id, GameStatus::Publish)
        .await
        .expect("to publish");
    id
}
