use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{CatalogError, InternalKind, NotFoundKind, ValidationKind};
use crate::errors::ErrorCode;
use crate::middleware::request_trace::current_request_id;

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Timed out: {detail}")]
    Timeout { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::DbUnavailable { .. } => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::Timeout,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail }
            | AppError::DbUnavailable { detail }
            | AppError::Timeout { detail } => detail.clone(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::DbUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(kind, detail) => {
                let code = match kind {
                    ValidationKind::MissingTitle => ErrorCode::MissingTitle,
                    ValidationKind::MissingDescription => ErrorCode::MissingDescription,
                    ValidationKind::InvalidReleaseDate => ErrorCode::InvalidReleaseDate,
                    ValidationKind::UnknownStatus => ErrorCode::UnknownStatus,
                    ValidationKind::IllegalTransition => ErrorCode::IllegalStatusTransition,
                    ValidationKind::InvalidGameId => ErrorCode::InvalidGameId,
                    _ => ErrorCode::ValidationError,
                };
                AppError::invalid(code, detail)
            }
            // Unknown reference names are bad input at the API surface.
            CatalogError::NotFound(NotFoundKind::Tag, detail) => {
                AppError::bad_request(ErrorCode::TagNotFound, detail)
            }
            CatalogError::NotFound(NotFoundKind::Genre, detail) => {
                AppError::bad_request(ErrorCode::GenreNotFound, detail)
            }
            CatalogError::NotFound(NotFoundKind::Game, detail) => {
                AppError::not_found(ErrorCode::GameNotFound, detail)
            }
            CatalogError::NotFound(NotFoundKind::Image, detail) => {
                AppError::not_found(ErrorCode::ImageNotFound, detail)
            }
            CatalogError::NotFound(_, detail) => AppError::not_found(ErrorCode::NotFound, detail),
            CatalogError::AlreadyExists(detail) => {
                AppError::conflict(ErrorCode::GameAlreadyExists, detail)
            }
            CatalogError::Internal(InternalKind::DbUnavailable, detail) => {
                AppError::DbUnavailable { detail }
            }
            CatalogError::Internal(InternalKind::Timeout, detail) => AppError::Timeout { detail },
            CatalogError::Internal(InternalKind::Cancelled, detail) => {
                AppError::internal(ErrorCode::Cancelled, detail)
            }
            CatalogError::Internal(InternalKind::NotImplemented, detail) => {
                AppError::internal(ErrorCode::NotImplemented, detail)
            }
            CatalogError::Internal(InternalKind::ObjectStore, detail) => {
                AppError::internal(ErrorCode::ObjectStoreError, detail)
            }
            CatalogError::Internal(_, detail) => AppError::internal(ErrorCode::Internal, detail),
            CatalogError::CompensationFailure(_, detail) => {
                AppError::internal(ErrorCode::ObjectStoreError, detail)
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = current_request_id();

        let problem_details = ProblemDetails {
            type_: format!("/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
