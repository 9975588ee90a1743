//! Errors shared by every Mapscout crate.

use thiserror::Error;

/// Error surface of the core types and the `UserStore` boundary.
#[derive(Error, Debug)]
pub enum MapscoutError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A store backend failed; the message comes from the backend
    #[error("database error: {0}")]
    Database(String),

    /// Rejected input such as an empty search term or a malformed user id
    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A broken internal invariant, e.g. a pending history record that vanished
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory to derive XDG paths from
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value parsed but cannot drive a run
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, MapscoutError>;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
