use std::env;

use crate::error::AppError;

/// Which database engine to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    pub fn engine(self) -> &'static str {
        match self {
            DbKind::Postgres => "postgresql",
            DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
        }
    }
}

/// Builds the connection URL for `kind` from environment variables.
///
/// For Postgres `DATABASE_URL` wins when set; otherwise the URL is assembled
/// from `POSTGRES_HOST`, `POSTGRES_PORT`, `CATALOG_DB`, `CATALOG_DB_USER`
/// and `CATALOG_DB_PASSWORD`.
pub fn db_url(kind: DbKind) -> Result<String, AppError> {
    match kind {
        DbKind::Postgres => {
            if let Ok(url) = env::var("DATABASE_URL") {
                if !url.trim().is_empty() {
                    return Ok(url);
                }
            }
            let host = host();
            let port = port()?;
            let db_name = must_var("CATALOG_DB")?;
            let username = must_var("CATALOG_DB_USER")?;
            let password = must_var("CATALOG_DB_PASSWORD")?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = must_var("CATALOG_SQLITE_PATH")?;
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Connection URL with the password masked, for logs.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{host}")
        }
        None => url.to_string(),
    }
}

/// Get database host from environment (defaults to localhost)
fn host() -> String {
    env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string())
}

/// Get database port from environment (defaults to 5432)
fn port() -> Result<u16, AppError> {
    match env::var("POSTGRES_PORT") {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("POSTGRES_PORT is not a valid port: '{raw}'"))),
        Err(_) => Ok(5432),
    }
}

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
