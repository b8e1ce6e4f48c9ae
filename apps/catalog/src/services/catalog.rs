//! Catalog lifecycle: create, delete, status changes, listing and reads.
//!
//! The relational store is the source of truth. Object-store side effects
//! in create/delete never fail the operation; their errors come back next
//! to the primary result as `CompensationFailure`.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::domain::filters::{GameFilters, ListingPlan};
use crate::domain::game::{image_key, NewGame};
use crate::domain::status::{check_transition, GameStatus};
use crate::errors::domain::{CatalogError, ImageOp, InternalKind, NotFoundKind, ValidationKind};
use crate::repos::catalog::{CatalogRepo, Game, NewGameRecord, ShortGame};
use crate::request::RequestCtx;
use crate::services::resolver::{resolve_by_names, RefKind};
use crate::storage::ObjectStore;

/// Result of a create: the new id plus a non-fatal cover error.
#[derive(Debug, Clone, PartialEq)]
pub struct AddGameOutcome {
    pub id: i64,
    pub image_error: Option<CatalogError>,
}

/// Result of a delete: the removed id plus a non-fatal cover error.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub id: i64,
    pub image_error: Option<CatalogError>,
}

fn check_game_id(id: i64) -> Result<(), CatalogError> {
    if id <= 0 {
        return Err(CatalogError::invalid(
            ValidationKind::InvalidGameId,
            "Game ID must be positive",
        ));
    }
    Ok(())
}

fn game_not_found(id: i64) -> CatalogError {
    CatalogError::not_found(NotFoundKind::Game, format!("Game with ID {id} not found"))
}

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepo>,
    store: Arc<dyn ObjectStore>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepo>, store: Arc<dyn ObjectStore>) -> Self {
        Self { repo, store }
    }

    /// Create a game in DRAFT.
    ///
    /// Order: duplicate check, cover upload, tag resolution, genre
    /// resolution, transactional save. Only the cover upload may fail
    /// without failing the create.
    pub async fn add_game(
        &self,
        ctx: &RequestCtx,
        input: NewGame,
    ) -> Result<AddGameOutcome, CatalogError> {
        let game = input.validate()?;
        let year = game.release_year();

        let existing = ctx
            .guard(
                "find_by_title_year",
                self.repo.find_by_title_year(ctx, &game.title, year),
            )
            .await??;
        if let Some(existing) = existing {
            debug!(request_id = %ctx.request_id(), game_id = existing.id, "duplicate title and year");
            return Err(CatalogError::already_exists(format!(
                "Game '{}' released in {year} already exists",
                game.title
            )));
        }

        let key = game.image_key();
        let mut locator = None;
        let mut image_error = None;
        if let Some(cover) = game.cover.clone() {
            match ctx.guard("store.save", self.store.save(&key, cover)).await? {
                Ok(loc) => locator = Some(loc),
                Err(e) => {
                    warn!(request_id = %ctx.request_id(), key = %key, error = %e, "cover upload failed; creating game without image");
                    image_error = Some(CatalogError::compensation(ImageOp::Save, e.to_string()));
                }
            }
        }

        let stored = locator.is_some();
        let saved = self
            .persist(
                ctx,
                NewGameRecord {
                    title: game.title,
                    description: game.description,
                    release_date: game.release_date,
                    image_key: locator,
                },
                &game.tag_names,
                &game.genre_names,
            )
            .await;

        match saved {
            Ok(id) => {
                info!(request_id = %ctx.request_id(), game_id = id, has_image = stored, "game created");
                Ok(AddGameOutcome { id, image_error })
            }
            Err(err) => {
                if stored {
                    self.discard_cover(ctx, &key).await;
                }
                Err(err)
            }
        }
    }

    async fn persist(
        &self,
        ctx: &RequestCtx,
        record: NewGameRecord,
        tag_names: &BTreeSet<String>,
        genre_names: &BTreeSet<String>,
    ) -> Result<i64, CatalogError> {
        let tags = resolve_by_names(self.repo.as_ref(), ctx, RefKind::Tag, tag_names).await?;
        let genres =
            resolve_by_names(self.repo.as_ref(), ctx, RefKind::Genre, genre_names).await?;

        let tag_ids: BTreeSet<i64> = tags.iter().map(|t| t.id).collect();
        let genre_ids: BTreeSet<i64> = genres.iter().map(|g| g.id).collect();

        ctx.guard(
            "save_game",
            self.repo.save_game(ctx, record, &tag_ids, &genre_ids),
        )
        .await?
    }

    /// Best-effort removal of a cover stored by a create that then failed.
    async fn discard_cover(&self, ctx: &RequestCtx, key: &str) {
        match ctx.guard("store.delete", self.store.delete(key)).await {
            Ok(Ok(())) => debug!(request_id = %ctx.request_id(), key, "orphan cover removed"),
            Ok(Err(e)) => {
                warn!(request_id = %ctx.request_id(), key, error = %e, "failed to remove orphan cover")
            }
            Err(e) => {
                warn!(request_id = %ctx.request_id(), key, error = %e, "orphan cover cleanup aborted")
            }
        }
    }

    pub async fn get_game(&self, ctx: &RequestCtx, id: i64) -> Result<Game, CatalogError> {
        check_game_id(id)?;
        ctx.guard("get_game", self.repo.get_game(ctx, id))
            .await??
            .ok_or_else(|| game_not_found(id))
    }

    /// Delete the row and its associations, then try once to remove the cover.
    pub async fn delete_game(
        &self,
        ctx: &RequestCtx,
        id: i64,
    ) -> Result<DeleteOutcome, CatalogError> {
        check_game_id(id)?;
        let deleted = ctx
            .guard("delete_game", self.repo.delete_game(ctx, id))
            .await??
            .ok_or_else(|| game_not_found(id))?;

        info!(request_id = %ctx.request_id(), game_id = id, "game deleted");

        if deleted.image_key.is_none() {
            return Ok(DeleteOutcome {
                id,
                image_error: None,
            });
        }

        let key = image_key(&deleted.title, deleted.release_year);
        let image_error = match ctx.guard("store.delete", self.store.delete(&key)).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => {
                warn!(request_id = %ctx.request_id(), game_id = id, key = %key, error = %e, "cover removal failed");
                Some(CatalogError::compensation(ImageOp::Delete, e.to_string()))
            }
            // The row is gone either way; report an aborted removal like a failed one.
            Err(e) => {
                warn!(request_id = %ctx.request_id(), game_id = id, key = %key, error = %e, "cover removal aborted");
                Some(CatalogError::compensation(ImageOp::Delete, e.to_string()))
            }
        };

        Ok(DeleteOutcome { id, image_error })
    }

    pub async fn update_status(
        &self,
        ctx: &RequestCtx,
        id: i64,
        proposed: GameStatus,
    ) -> Result<(), CatalogError> {
        check_game_id(id)?;
        let current = ctx
            .guard("game_status", self.repo.game_status(ctx, id))
            .await??
            .ok_or_else(|| game_not_found(id))?;

        check_transition(current, proposed)?;

        let updated = ctx
            .guard(
                "set_status",
                self.repo.set_status(ctx, id, current, proposed),
            )
            .await??;
        if !updated {
            // Someone else changed or deleted the row after we read it.
            let now = ctx
                .guard("game_status", self.repo.game_status(ctx, id))
                .await??
                .ok_or_else(|| game_not_found(id))?;
            warn!(
                request_id = %ctx.request_id(),
                game_id = id,
                expected = current.as_str(),
                found = now.as_str(),
                "concurrent status change"
            );
            return Err(CatalogError::invalid(
                ValidationKind::IllegalTransition,
                format!(
                    "status of game {id} changed from {} to {} concurrently",
                    current.as_str(),
                    now.as_str()
                ),
            ));
        }

        info!(
            request_id = %ctx.request_id(),
            game_id = id,
            from = current.as_str(),
            to = proposed.as_str(),
            "status changed"
        );
        Ok(())
    }

    /// Published games matching `filters`; `limit == 0` means the default.
    pub async fn list_games(
        &self,
        ctx: &RequestCtx,
        filters: &GameFilters,
        limit: u64,
    ) -> Result<Vec<ShortGame>, CatalogError> {
        let plan = ListingPlan::from_filters(filters, limit);
        ctx.guard("list_games", self.repo.list_games(ctx, &plan))
            .await?
    }

    /// Cover bytes of a game that has one.
    pub async fn game_cover(&self, ctx: &RequestCtx, id: i64) -> Result<Bytes, CatalogError> {
        let game = self.get_game(ctx, id).await?;
        if game.image_key.is_none() {
            return Err(CatalogError::not_found(
                NotFoundKind::Image,
                format!("Game with ID {id} has no cover image"),
            ));
        }

        let key = image_key(&game.title, game.release_date.year());
        match ctx.guard("store.get", self.store.get(&key)).await? {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.is_not_found() => Err(CatalogError::not_found(
                NotFoundKind::Image,
                format!("cover image {key} not found"),
            )),
            Err(e) => {
                warn!(request_id = %ctx.request_id(), game_id = id, key = %key, error = %e, "cover read failed");
                Err(CatalogError::internal(
                    InternalKind::ObjectStore,
                    "Failed to read cover image",
                ))
            }
        }
    }
}
