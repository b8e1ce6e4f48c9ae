//! Error codes for the catalog HTTP API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in problem+json responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Title missing or blank
    MissingTitle,
    /// Description missing or blank
    MissingDescription,
    /// Release date missing a component or not a calendar date
    InvalidReleaseDate,
    /// Status string is not one of DRAFT/PENDING/PUBLISH
    UnknownStatus,
    /// Status change not allowed from the current status
    IllegalStatusTransition,
    /// Invalid game id in the path
    InvalidGameId,
    /// One or more tag names do not exist
    TagNotFound,
    /// One or more genre names do not exist
    GenreNotFound,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Game not found
    GameNotFound,
    /// Game has no stored cover image
    ImageNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// A game with the same title and release year exists
    GameAlreadyExists,

    // System Errors
    /// Database unavailable
    DbUnavailable,
    /// Store call timed out
    Timeout,
    /// Request was cancelled before the store call finished
    Cancelled,
    /// Operation exists but is not implemented
    NotImplemented,
    /// Object store failure
    ObjectStoreError,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTitle => "MISSING_TITLE",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::InvalidReleaseDate => "INVALID_RELEASE_DATE",
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::IllegalStatusTransition => "ILLEGAL_STATUS_TRANSITION",
            Self::InvalidGameId => "INVALID_GAME_ID",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::GenreNotFound => "GENRE_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::ImageNotFound => "IMAGE_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::GameAlreadyExists => "GAME_ALREADY_EXISTS",

            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::ObjectStoreError => "OBJECT_STORE_ERROR",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
