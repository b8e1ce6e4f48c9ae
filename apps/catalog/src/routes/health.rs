use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub app_version: String,
    /// `ok`, `error`, or `none` when running on the in-memory repository.
    pub db: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub db_error: Option<String>,
    pub migrations: String,
    pub time: String,
}

struct DbCheck {
    status: &'static str,
    error: Option<String>,
    migrations: String,
}

async fn check_db(db: &DatabaseConnection) -> DbCheck {
    let ping = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());
    if let Err(e) = db.query_one(ping).await {
        return DbCheck {
            status: "error",
            error: Some(format!("DB query failed: {e}")),
            migrations: "unknown".to_string(),
        };
    }

    let migrations = match get_latest_migration_version(db).await {
        Ok(Some(version)) => version,
        Ok(None) => "no_migrations".to_string(),
        Err(_) => "unknown".to_string(),
    };
    DbCheck {
        status: "ok",
        error: None,
        migrations,
    }
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let check = match app_state.db() {
        Some(db) => check_db(db).await,
        None => DbCheck {
            status: "none",
            error: None,
            migrations: "n/a".to_string(),
        },
    };

    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        db: check.status.to_string(),
        db_error: check.error,
        migrations: check.migrations,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
