//! Catalog-level error type used across services, repositories and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `CatalogError`
//! using the provided `From<CatalogError> for AppError` implementation.

use thiserror::Error;

/// Input/business-rule violations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    MissingTitle,
    MissingDescription,
    InvalidReleaseDate,
    UnknownStatus,
    IllegalTransition,
    InvalidGameId,
    Other(String),
}

/// Missing resources in catalog terms
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Tag,
    Genre,
    Image,
    Other(String),
}

/// Operational failure kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InternalKind {
    DbUnavailable,
    Timeout,
    Cancelled,
    NotImplemented,
    ObjectStore,
    Other(String),
}

/// Which image-store side effect failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOp {
    Save,
    Delete,
}

/// Central catalog error type.
///
/// `CompensationFailure` is never returned as the `Err` of an operation; it
/// travels next to a successful primary result (see `services::catalog`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("invalid argument {0:?}: {1}")]
    InvalidArgument(ValidationKind, String),
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("internal {0:?}: {1}")]
    Internal(InternalKind, String),
    #[error("image {0:?} failed: {1}")]
    CompensationFailure(ImageOp, String),
}

impl CatalogError {
    pub fn invalid(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::InvalidArgument(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn already_exists(detail: impl Into<String>) -> Self {
        Self::AlreadyExists(detail.into())
    }
    pub fn internal(kind: InternalKind, detail: impl Into<String>) -> Self {
        Self::Internal(kind, detail.into())
    }
    pub fn compensation(op: ImageOp, detail: impl Into<String>) -> Self {
        Self::CompensationFailure(op, detail.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }
}
