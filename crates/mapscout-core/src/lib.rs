//! Mapscout Core - Foundation crate for the Mapscout listing pipeline.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the collaborator traits that the other Mapscout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`UserId`, `UserToken`, `SearchTerm`, `Timestamp`)
//! - [`model`] - Listing records, result sets, users and their search history
//! - [`store`] - The `UserStore` collaborator trait and an in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use mapscout_core::{AppConfig, SearchTerm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let term = SearchTerm::new("pizzaria salvador")?;
//! assert_eq!(config.pipeline.settle_interval().as_millis(), 1000);
//! assert_eq!(term.as_str(), "pizzaria salvador");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
#[allow(missing_docs)]
pub mod error;
pub mod model;
pub mod store;
pub mod types;

pub use config::{
    AppConfig, BrowserConfig, DatabaseConfig, PipelineConfig, SelectorConfig, SinkConfig,
};
pub use error::{ConfigError, ConfigResult, MapscoutError, Result};
pub use model::{
    CandidateStub, EnrichedEstablishment, SearchHistoryRecord, SearchResultSet, SearchStatus,
    User,
};
pub use store::{MemoryUserStore, UserStore};
pub use types::{SearchTerm, Timestamp, UserId, UserToken};
