//! Publication state machine for catalog games.
//!
//! Forward path is DRAFT -> PENDING -> PUBLISH. PUBLISH is terminal; the
//! only accepted "change" out of it is the no-op PUBLISH -> PUBLISH.

use std::str::FromStr;

use crate::errors::domain::{CatalogError, ValidationKind};

pub use crate::entities::games::GameStatus;

/// Whether `current -> proposed` is a legal status change.
///
/// Pure: no state, no side effects. Callers check this before any write.
pub fn is_allowed(current: GameStatus, proposed: GameStatus) -> bool {
    !matches!(
        (current, proposed),
        (GameStatus::Draft, GameStatus::Publish)
            | (GameStatus::Publish, GameStatus::Pending)
            | (GameStatus::Publish, GameStatus::Draft)
    )
}

/// `is_allowed` as a `Result`, with the rejected edge in the detail.
pub fn check_transition(current: GameStatus, proposed: GameStatus) -> Result<(), CatalogError> {
    if is_allowed(current, proposed) {
        Ok(())
    } else {
        Err(CatalogError::invalid(
            ValidationKind::IllegalTransition,
            format!(
                "status change {} -> {} is not allowed",
                current.as_str(),
                proposed.as_str()
            ),
        ))
    }
}

impl GameStatus {
    pub const ALL: [GameStatus; 3] = [GameStatus::Draft, GameStatus::Pending, GameStatus::Publish];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Draft => "DRAFT",
            GameStatus::Pending => "PENDING",
            GameStatus::Publish => "PUBLISH",
        }
    }
}

impl FromStr for GameStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(GameStatus::Draft),
            "PENDING" => Ok(GameStatus::Pending),
            "PUBLISH" => Ok(GameStatus::Publish),
            other => Err(CatalogError::invalid(
                ValidationKind::UnknownStatus,
                format!("unknown status '{other}'"),
            )),
        }
    }
}
