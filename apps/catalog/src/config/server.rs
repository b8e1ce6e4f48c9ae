use std::env;
use std::time::Duration;

use crate::error::AppError;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single request's store work.
    pub request_timeout: Duration,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("CATALOG_PORT", 3001u16)?;
        let timeout_ms = parse_var("CATALOG_REQUEST_TIMEOUT_MS", 10_000u64)?;
        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
