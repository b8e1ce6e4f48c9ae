//! SeaORM -> CatalogError translation.
//!
//! Adapters convert `sea_orm::DbErr` here so higher layers only ever see
//! `CatalogError`. Raw driver messages go to the log, never to callers.

use tracing::{error, warn};

use crate::errors::domain::{CatalogError, InternalKind, NotFoundKind};

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// Translate a `DbErr` into a `CatalogError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> CatalogError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return CatalogError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return CatalogError::internal(InternalKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if is_unique_violation(&error_msg) {
        // The catalog has no storage-level uniqueness on games; if a deployment
        // adds one on (title, release_date) it surfaces as a duplicate here.
        warn!(raw_error = %error_msg, "Unique constraint violation");
        return CatalogError::already_exists("Record already exists");
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return CatalogError::internal(
            InternalKind::Other("ForeignKey".into()),
            "Foreign key constraint violation",
        );
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(raw_error = %error_msg, "Database timeout");
        return CatalogError::internal(InternalKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    CatalogError::internal(
        InternalKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
