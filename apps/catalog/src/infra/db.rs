use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, sanitize_db_url, DbKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

/// Retry a connection attempt with fixed interval delays.
/// Returns the error of the last attempt once all attempts are used.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "connection_retry=success");
                }
                return Ok(conn);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!(attempt, max_attempts, interval_ms, error = %e, "connection_retry=failed");
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }
        }
    }
}

fn connect_options(kind: DbKind, url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(url);
    opt.acquire_timeout(Duration::from_secs(5)).sqlx_logging(false);
    match kind {
        // Every connection to `sqlite::memory:` is its own database.
        DbKind::SqliteMemory => {
            opt.min_connections(1).max_connections(1);
        }
        DbKind::SqliteFile => {
            opt.max_connections(4);
        }
        DbKind::Postgres => {
            opt.min_connections(1).max_connections(16);
        }
    }
    opt
}

/// Connect without running migrations.
pub async fn connect_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    let opt = connect_options(kind, &url);
    let safe_url = sanitize_db_url(&url);

    let connect = || {
        let opt = opt.clone();
        let safe_url = safe_url.clone();
        async move {
            Database::connect(opt).await.map_err(|e| {
                AppError::config(format!("failed to connect to {safe_url}: {e}"))
            })
        }
    };

    let conn = match kind {
        DbKind::Postgres => {
            retry_connection(connect, CONNECT_ATTEMPTS, CONNECT_RETRY_INTERVAL_MS).await?
        }
        DbKind::SqliteFile | DbKind::SqliteMemory => connect().await?,
    };

    info!(engine = kind.engine(), url = %safe_url, "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date. Single entrypoint for the server.
pub async fn bootstrap_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(kind).await?;
    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::config(format!("migration failed: {e}")))?;
    info!(engine = kind.engine(), "bootstrap=ok");
    Ok(conn)
}
