mod common;
mod support;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog::adapters::MemoryCatalogRepo;
use catalog::domain::filters::{GameFilters, ListingPlan};
use catalog::domain::status::GameStatus;
use catalog::entities::{game_genres, game_tags, games};
use catalog::errors::domain::{CatalogError, ImageOp, InternalKind, NotFoundKind, ValidationKind};
use catalog::repos::catalog::{
    CatalogRepo, DeletedGame, Game, GameRecord, GenreRef, NewGameRecord, ShortGame, TagRef,
};
use catalog::request::RequestCtx;
use catalog::services::CatalogService;
use catalog::storage::{MemoryObjectStore, StoreOp, StoreOpKind};
use sea_orm::{EntityTrait, PaginatorTrait};
use support::{ctx, memory_harness, new_game, nova, publish, sea_harness};
use time::macros::date;
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn created_game_reads_back_with_resolved_refs() {
    let h = sea_harness().await;
    let ctx = ctx();

    let out = h.service.add_game(&ctx, nova()).await.unwrap();
    assert_eq!(out.image_error, None);

    let game = h.service.get_game(&ctx, out.id).await.unwrap();
    assert_eq!(game.title, "Nova");
    assert_eq!(game.description, "Nova description");
    assert_eq!(game.release_date, date!(2020 - 05 - 01));
    assert_eq!(game.status, GameStatus::Draft);
    assert_eq!(game.image_key.as_deref(), Some("memory://nova_2020"));

    let tags = h.repo.find_tags_by_names(&ctx, &["A".into(), "B".into()].into()).await.unwrap();
    let genres = h.repo.find_genres_by_names(&ctx, &["X".into()].into()).await.unwrap();
    assert_eq!(game.tag_ids(), tags.iter().map(|t| t.id).collect());
    assert_eq!(game.genre_ids(), genres.iter().map(|g| g.id).collect());

    assert!(h.store.contains("nova_2020"));
}

#[tokio::test]
async fn duplicate_title_and_year_is_rejected_regardless_of_details() {
    let h = sea_harness().await;
    let ctx = ctx();
    h.service
        .add_game(&ctx, new_game("Nova", 2020, 1, 15))
        .await
        .unwrap();

    let again = new_game("Nova", 2020, 11, 2)
        .with_tags(["C"])
        .with_genres(["Y"])
        .with_cover(&b"other"[..]);
    let err = h.service.add_game(&ctx, again).await.unwrap_err();

    assert!(matches!(err, CatalogError::AlreadyExists(_)), "{err:?}");
    assert_eq!(h.store.count(StoreOpKind::Save), 0);
    assert_eq!(games::Entity::find().count(&h.conn).await.unwrap(), 1);

    // Another year is a different game.
    h.service
        .add_game(&ctx, new_game("Nova", 2021, 1, 15))
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_tag_persists_nothing() {
    let h = sea_harness().await;
    let input = nova().with_tags(["A", "missing-tag"]);

    let err = h.service.add_game(&ctx(), input).await.unwrap_err();

    assert_eq!(
        err,
        CatalogError::NotFound(NotFoundKind::Tag, "tags not found: missing-tag".into())
    );
    assert_eq!(games::Entity::find().count(&h.conn).await.unwrap(), 0);
    assert_eq!(game_tags::Entity::find().count(&h.conn).await.unwrap(), 0);
    assert_eq!(game_genres::Entity::find().count(&h.conn).await.unwrap(), 0);
    // The cover was uploaded before resolution and then removed again.
    assert!(h.store.keys().is_empty());
    assert_eq!(h.store.count(StoreOpKind::Delete), 1);
}

#[tokio::test]
async fn unknown_genre_persists_nothing() {
    let h = sea_harness().await;
    let err = h
        .service
        .add_game(&ctx(), nova().with_genres(["X", "nope"]))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(NotFoundKind::Genre, _)));
    assert_eq!(games::Entity::find().count(&h.conn).await.unwrap(), 0);
    assert!(h.store.keys().is_empty());
}

#[tokio::test]
async fn nova_with_failing_cover_upload_is_created_without_image() {
    let h = sea_harness().await;
    h.store.inject_failure(StoreOpKind::Save);
    let ctx = ctx();

    let out = h.service.add_game(&ctx, nova()).await.unwrap();
    assert!(matches!(
        out.image_error,
        Some(CatalogError::CompensationFailure(ImageOp::Save, _))
    ));

    let game = h.service.get_game(&ctx, out.id).await.unwrap();
    assert_eq!(game.image_key, None);
    assert_eq!(game.title, "Nova");
    let tag_names: Vec<_> = game.tags.iter().map(|t| t.name.as_str()).collect();
    let genre_names: Vec<_> = game.genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(tag_names, vec!["A", "B"]);
    assert_eq!(genre_names, vec!["X"]);
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let h = sea_harness().await;
    let err = h.service.delete_game(&ctx(), 4242).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(NotFoundKind::Game, _)));
    assert!(h.store.operations().is_empty());
}

#[tokio::test]
async fn delete_removes_everything_and_tries_cover_once() {
    let h = sea_harness().await;
    let ctx = ctx();
    let id = h.service.add_game(&ctx, nova()).await.unwrap().id;

    let out = h.service.delete_game(&ctx, id).await.unwrap();
    assert_eq!(out.id, id);
    assert_eq!(out.image_error, None);

    assert_eq!(games::Entity::find().count(&h.conn).await.unwrap(), 0);
    assert_eq!(game_tags::Entity::find().count(&h.conn).await.unwrap(), 0);
    assert_eq!(game_genres::Entity::find().count(&h.conn).await.unwrap(), 0);

    let deletes: Vec<_> = h
        .store
        .operations()
        .into_iter()
        .filter(|op| op.kind() == StoreOpKind::Delete)
        .collect();
    assert_eq!(
        deletes,
        vec![StoreOp::Delete {
            key: "nova_2020".into()
        }]
    );
    assert!(!h.store.contains("nova_2020"));
}

#[tokio::test]
async fn failed_cover_removal_does_not_undo_delete() {
    let h = sea_harness().await;
    let ctx = ctx();
    let id = h.service.add_game(&ctx, nova()).await.unwrap().id;
    h.store.inject_failure(StoreOpKind::Delete);

    let out = h.service.delete_game(&ctx, id).await.unwrap();

    assert!(matches!(
        out.image_error,
        Some(CatalogError::CompensationFailure(ImageOp::Delete, _))
    ));
    assert_eq!(h.store.count(StoreOpKind::Delete), 1);
    assert!(matches!(
        h.service.get_game(&ctx, id).await,
        Err(CatalogError::NotFound(NotFoundKind::Game, _))
    ));
}

#[tokio::test]
async fn status_machine_is_enforced() {
    let h = sea_harness().await;
    let ctx = ctx();
    let id = h
        .service
        .add_game(&ctx, new_game("Flow", 2022, 2, 2))
        .await
        .unwrap()
        .id;

    let err = h
        .service
        .update_status(&ctx, id, GameStatus::Publish)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidArgument(ValidationKind::IllegalTransition, _)
    ));

    h.service.update_status(&ctx, id, GameStatus::Pending).await.unwrap();
    h.service.update_status(&ctx, id, GameStatus::Publish).await.unwrap();

    for back in [GameStatus::Pending, GameStatus::Draft] {
        let err = h.service.update_status(&ctx, id, back).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidArgument(ValidationKind::IllegalTransition, _)
        ));
    }
    // No-op is allowed.
    h.service.update_status(&ctx, id, GameStatus::Publish).await.unwrap();
    assert_eq!(
        h.service.get_game(&ctx, id).await.unwrap().status,
        GameStatus::Publish
    );

    let err = h
        .service
        .update_status(&ctx, id + 1000, GameStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(NotFoundKind::Game, _)));
}

#[tokio::test]
async fn listing_goes_through_the_service() {
    let h = sea_harness().await;
    let ctx = ctx();
    publish(&h.service, new_game("Beta", 2020, 1, 1).with_tags(["A"]).with_genres(["X"])).await;
    publish(&h.service, new_game("Alpha", 2020, 1, 1).with_tags(["B"]).with_genres(["X"])).await;
    publish(&h.service, new_game("Gamma", 2020, 1, 1).with_tags(["A"]).with_genres(["Y"])).await;
    h.service
        .add_game(&ctx, new_game("Draft", 2020, 1, 1).with_tags(["A"]).with_genres(["X"]))
        .await
        .unwrap();

    let filters = GameFilters::default().with_tags(["A", "B"]).with_genres(["X"]);
    let listed = h.service.list_games(&ctx, &filters, 0).await.unwrap();
    let titles: Vec<_> = listed.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);

    let all = h.service.list_games(&ctx, &GameFilters::default(), 1).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Alpha");
}

#[tokio::test]
async fn cover_is_served_from_the_object_store() {
    let h = sea_harness().await;
    let ctx = ctx();
    let with_cover = h.service.add_game(&ctx, nova()).await.unwrap().id;
    let without = h
        .service
        .add_game(&ctx, new_game("Bare", 2020, 1, 1))
        .await
        .unwrap()
        .id;

    let bytes = h.service.game_cover(&ctx, with_cover).await.unwrap();
    assert_eq!(&bytes[..], &b"\x89PNG nova"[..]);

    let err = h.service.game_cover(&ctx, without).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(NotFoundKind::Image, _)));

    h.store.inject_failure(StoreOpKind::Get);
    let err = h.service.game_cover(&ctx, with_cover).await.unwrap_err();
    assert!(matches!(err, CatalogError::Internal(InternalKind::ObjectStore, _)));
}

#[tokio::test]
async fn cancelled_request_touches_no_store() {
    let h = memory_harness();
    let token = CancellationToken::new();
    let ctx = ctx().with_cancellation(token.clone());
    token.cancel();

    let err = h.service.add_game(&ctx, nova()).await.unwrap_err();

    assert!(matches!(err, CatalogError::Internal(InternalKind::Cancelled, _)));
    assert_eq!(h.repo.game_count(), 0);
    assert!(h.store.operations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_during_delete_cover_keeps_relational_delete() {
    let repo = MemoryCatalogRepo::new()
        .with_tags(support::TAGS)
        .with_genres(support::GENRES);
    let fast = MemoryObjectStore::new();
    let slow = MemoryObjectStore::with_latency(Duration::from_secs(60));

    let create = CatalogService::new(
        Arc::new(repo.clone()),
        Arc::new(fast),
    );
    let id = create.add_game(&ctx(), nova()).await.unwrap().id;

    let delete = CatalogService::new(
        Arc::new(repo.clone()),
        Arc::new(slow.clone()),
    );
    let ctx = ctx().with_timeout(Duration::from_secs(1));
    let out = delete.delete_game(&ctx, id).await.unwrap();

    assert!(matches!(
        out.image_error,
        Some(CatalogError::CompensationFailure(ImageOp::Delete, _))
    ));
    assert_eq!(repo.game_count(), 0);
    assert_eq!(slow.count(StoreOpKind::Delete), 1);
}

#[tokio::test]
async fn repository_failure_after_upload_removes_the_cover() {
    let h = memory_harness();
    h.repo.fail_on(catalog::adapters::RepoOp::SaveGame);

    let err = h.service.add_game(&ctx(), nova()).await.unwrap_err();

    assert!(matches!(err, CatalogError::Internal(InternalKind::DbUnavailable, _)));
    assert!(h.store.keys().is_empty());
    assert_eq!(h.repo.association_count(), 0);
}

#[tokio::test]
async fn lookup_failure_is_internal_and_stops_the_create() {
    let h = memory_harness();
    h.repo.fail_on(catalog::adapters::RepoOp::FindByTitleYear);

    let err = h.service.add_game(&ctx(), nova()).await.unwrap_err();

    assert!(matches!(err, CatalogError::Internal(..)));
    assert!(h.store.operations().is_empty());
}

/// Memory repo whose first two status reads return together, so two status
/// updates both act on the same starting status.
struct LockstepStatusReads {
    inner: MemoryCatalogRepo,
    barrier: Barrier,
    reads: AtomicUsize,
}

#[async_trait]
impl CatalogRepo for LockstepStatusReads {
    async fn find_by_title_year(
        &self,
        ctx: &RequestCtx,
        title: &str,
        year: i32,
    ) -> Result<Option<GameRecord>, CatalogError> {
        self.inner.find_by_title_year(ctx, title, year).await
    }

    async fn find_tags_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<TagRef>, CatalogError> {
        self.inner.find_tags_by_names(ctx, names).await
    }

    async fn find_genres_by_names(
        &self,
        ctx: &RequestCtx,
        names: &BTreeSet<String>,
    ) -> Result<Vec<GenreRef>, CatalogError> {
        self.inner.find_genres_by_names(ctx, names).await
    }

    async fn save_game(
        &self,
        ctx: &RequestCtx,
        game: NewGameRecord,
        tag_ids: &BTreeSet<i64>,
        genre_ids: &BTreeSet<i64>,
    ) -> Result<i64, CatalogError> {
        self.inner.save_game(ctx, game, tag_ids, genre_ids).await
    }

    async fn get_game(&self, ctx: &RequestCtx, id: i64) -> Result<Option<Game>, CatalogError> {
        self.inner.get_game(ctx, id).await
    }

    async fn delete_game(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<DeletedGame>, CatalogError> {
        self.inner.delete_game(ctx, id).await
    }

    async fn game_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<Option<GameStatus>, CatalogError> {
        let status = self.inner.game_status(ctx, id).await;
        // Hold the answer until the other reader has one too.
        if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait().await;
        }
        status
    }

    async fn set_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
        expected: GameStatus,
        status: GameStatus,
    ) -> Result<bool, CatalogError> {
        self.inner.set_status(ctx, id, expected, status).await
    }

    async fn list_games(
        &self,
        ctx: &RequestCtx,
        plan: &ListingPlan,
    ) -> Result<Vec<ShortGame>, CatalogError> {
        self.inner.list_games(ctx, plan).await
    }
}

#[tokio::test]
async fn concurrent_status_updates_cannot_skip_the_state_machine() {
    let inner = MemoryCatalogRepo::new();
    let setup = CatalogService::new(Arc::new(inner.clone()), Arc::new(MemoryObjectStore::new()));
    let id = setup
        .add_game(&ctx(), new_game("Race", 2020, 1, 1))
        .await
        .unwrap()
        .id;
    setup
        .update_status(&ctx(), id, GameStatus::Pending)
        .await
        .unwrap();

    let racing = CatalogService::new(
        Arc::new(LockstepStatusReads {
            inner: inner.clone(),
            barrier: Barrier::new(2),
            reads: AtomicUsize::new(0),
        }),
        Arc::new(MemoryObjectStore::new()),
    );
    let (ctx_a, ctx_b) = (ctx(), ctx());
    let (to_publish, to_draft) = tokio::join!(
        racing.update_status(&ctx_a, id, GameStatus::Publish),
        racing.update_status(&ctx_b, id, GameStatus::Draft),
    );

    // Both saw PENDING; only the first write may land.
    let winner = match (&to_publish, &to_draft) {
        (Ok(()), Err(e)) | (Err(e), Ok(())) => {
            assert!(
                matches!(
                    e,
                    CatalogError::InvalidArgument(ValidationKind::IllegalTransition, _)
                ),
                "{e:?}"
            );
            if to_publish.is_ok() {
                GameStatus::Publish
            } else {
                GameStatus::Draft
            }
        }
        other => panic!("exactly one update must win: {other:?}"),
    };

    let stored = setup.get_game(&ctx(), id).await.unwrap().status;
    assert_eq!(stored, winner);
}

#[tokio::test]
async fn update_of_game_deleted_underneath_is_not_found() {
    let h = memory_harness();
    let ctx = ctx();
    let id = h
        .service
        .add_game(&ctx, new_game("Gone", 2020, 1, 1))
        .await
        .unwrap()
        .id;
    h.service.delete_game(&ctx, id).await.unwrap();

    let err = h
        .service
        .update_status(&ctx, id, GameStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(NotFoundKind::Game, _)));
}

#[tokio::test]
async fn last_calendar_year_is_supported_on_both_repositories() {
    let sea = sea_harness().await;
    let mem = memory_harness();

    for service in [&sea.service, &mem.service] {
        let ctx = ctx();
        let id = publish(service, new_game("Far", 9999, 6, 1)).await;
        assert_eq!(
            service.get_game(&ctx, id).await.unwrap().release_date,
            date!(9999 - 06 - 01)
        );

        let err = service
            .add_game(&ctx, new_game("Far", 9999, 12, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists(_)), "{err:?}");

        let listed = service
            .list_games(&ctx, &GameFilters::default().with_year(9999), 0)
            .await
            .unwrap();
        let titles: Vec<_> = listed.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Far"]);
    }
}
