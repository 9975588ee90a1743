//! Failures of the user and history store.

use mapscout_core::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The file could not be opened or the pool could not start
    #[error("cannot open user store: {0}")]
    Open(String),

    #[error("schema upgrade failed: {0}")]
    Migration(String),

    #[error("no user with id {0}")]
    UserNotFound(UserId),

    /// A stored row no longer satisfies the domain types
    #[error("corrupt row: {0}")]
    Decode(String),

    /// The `establishments` JSON column
    #[error("establishment list: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<DatabaseError> for mapscout_core::MapscoutError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
