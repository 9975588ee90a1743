//! `SQLite` user store: accounts, credit balances and search history.
//!
//! [`Database::open_migrated`] is the usual entry point; wrap the result in
//! [`SqliteUserStore`] to hand it to the search pipeline.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod store;
pub mod users;

pub use connection::DbPool;
pub use error::{DatabaseError, Result};
pub use store::SqliteUserStore;

use std::path::Path;

/// An open user store.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open without touching the schema; `:memory:` gives a throwaway store.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            pool: DbPool::new(path).await?,
        })
    }

    pub async fn open_migrated(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool()).await
    }

    #[must_use]
    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.pool.pool()
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
