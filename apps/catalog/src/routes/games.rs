//! Game catalog HTTP routes. Thin JSON mapping over `CatalogService`.

use std::str::FromStr;

use actix_web::http::header::ContentType;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::domain::filters::GameFilters;
use crate::domain::game::{NewGame, ReleaseDateParts};
use crate::domain::status::GameStatus;
use crate::error::AppError;
use crate::errors::domain::CatalogError;
use crate::errors::ErrorCode;
use crate::middleware::request_trace::RequestId;
use crate::repos::catalog::{Game, ShortGame};
use crate::request::RequestCtx;
use crate::state::app_state::AppState;

fn request_ctx(req: &HttpRequest, state: &AppState) -> RequestCtx {
    let id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| RequestCtx::generate().request_id().to_string());
    state.request_ctx(id)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDateBody {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddGameRequest {
    pub title: String,
    pub description: String,
    pub release_date: ReleaseDateBody,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    /// Base64-encoded cover image.
    pub cover: Option<String>,
}

impl AddGameRequest {
    fn into_new_game(self) -> Result<NewGame, AppError> {
        let date = ReleaseDateParts::new(
            self.release_date.year,
            self.release_date.month,
            self.release_date.day,
        );
        let mut game = NewGame::new(self.title, self.description, date)
            .with_tags(self.tags)
            .with_genres(self.genres);

        if let Some(encoded) = self.cover {
            let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
                AppError::bad_request(ErrorCode::BadRequest, format!("cover is not valid base64: {e}"))
            })?;
            game = game.with_cover(bytes);
        }
        Ok(game)
    }
}

/// Primary result plus an optional non-fatal image error.
#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_error: Option<String>,
}

fn image_error_text(err: Option<CatalogError>) -> Option<String> {
    err.map(|e| e.to_string())
}

/// POST /api/games
async fn add_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AddGameRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = request_ctx(&req, &state);
    let input = body.into_inner().into_new_game()?;
    let outcome = state.catalog().add_game(&ctx, input).await?;

    Ok(HttpResponse::Created().json(MutationResponse {
        id: outcome.id,
        image_error: image_error_text(outcome.image_error),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub year: Option<i32>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
    /// Comma-separated genre names.
    pub genres: Option<String>,
    pub limit: Option<u64>,
}

fn split_names(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| s.split(',').collect()).unwrap_or_default()
}

impl ListQuery {
    fn filters(&self) -> GameFilters {
        let mut filters = GameFilters::default()
            .with_tags(split_names(self.tags.as_deref()))
            .with_genres(split_names(self.genres.as_deref()));
        if let Some(year) = self.year {
            filters = filters.with_year(year);
        }
        filters
    }
}

/// GET /api/games
async fn list_games(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<web::Json<Vec<ShortGame>>, AppError> {
    let ctx = request_ctx(&req, &state);
    let games = state
        .catalog()
        .list_games(&ctx, &query.filters(), query.limit.unwrap_or(0))
        .await?;
    Ok(web::Json(games))
}

/// GET /api/games/{id}
async fn get_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<web::Json<Game>, AppError> {
    let ctx = request_ctx(&req, &state);
    let game = state.catalog().get_game(&ctx, path.into_inner()).await?;
    Ok(web::Json(game))
}

/// DELETE /api/games/{id}
async fn delete_game(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<web::Json<MutationResponse>, AppError> {
    let ctx = request_ctx(&req, &state);
    let outcome = state.catalog().delete_game(&ctx, path.into_inner()).await?;
    Ok(web::Json(MutationResponse {
        id: outcome.id,
        image_error: image_error_text(outcome.image_error),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// PUT /api/games/{id}/status
async fn update_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = request_ctx(&req, &state);
    let status = GameStatus::from_str(&body.status)?;
    state
        .catalog()
        .update_status(&ctx, path.into_inner(), status)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/games/{id}/cover
async fn get_cover(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ctx = request_ctx(&req, &state);
    let bytes = state.catalog().game_cover(&ctx, path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .body(bytes))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_games))
            .route(web::post().to(add_game)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(get_game))
            .route(web::delete().to(delete_game)),
    )
    .service(web::resource("/{id}/status").route(web::put().to(update_status)))
    .service(web::resource("/{id}/cover").route(web::get().to(get_cover)));
}
