use mapscout_core::{MapscoutError, UserId};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Insufficient credits for user {user_id}")]
    InsufficientCredits { user_id: UserId },

    #[error("Results feed not ready after {timeout:?}")]
    SessionTimeout { timeout: Duration },

    #[error("No user matches the given token")]
    UserNotFound,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detail extraction failed: {0}")]
    Extraction(String),

    #[error("Browser error: {0}")]
    Browser(#[from] mapscout_browser::BrowserError),

    #[error("Store error: {0}")]
    Store(#[from] MapscoutError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
