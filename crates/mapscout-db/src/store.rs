//! `UserStore` backed by the `SQLite` database.

use crate::users;
use crate::Database;
use async_trait::async_trait;
use mapscout_core::{User, UserId, UserStore, UserToken};
use std::sync::Arc;

/// [`UserStore`] over a shared [`Database`].
///
/// Debits are single `UPDATE` statements and history rows are upserted per
/// record, so overlapping runs for one user neither lose credits nor each
/// other's history.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    db: Arc<Database>,
}

impl SqliteUserStore {
    /// Wrap an open, migrated database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get(&self, token: &UserToken) -> mapscout_core::Result<Option<User>> {
        Ok(users::get_by_token(self.db.pool(), token).await?)
    }

    async fn debit(&self, user_id: &UserId) -> mapscout_core::Result<Option<u32>> {
        Ok(users::try_debit(self.db.pool(), user_id).await?)
    }

    async fn save(&self, user: &User) -> mapscout_core::Result<()> {
        Ok(users::save_user(self.db.pool(), user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_round_trip() {
        let db = Database::new(":memory:").await.expect("create db");
        db.run_migrations().await.expect("migrations");
        let token = UserToken::new("tok").expect("token");
        users::create_user(db.pool(), "ana", &token, 1)
            .await
            .expect("create user");

        let store = SqliteUserStore::new(Arc::new(db));
        let mut user = store.get(&token).await.expect("get").expect("exists");
        assert_eq!(store.debit(&user.id).await.expect("debit"), Some(0));
        assert_eq!(store.debit(&user.id).await.expect("debit"), None);

        let term = mapscout_core::SearchTerm::new("pizzaria").expect("term");
        user.append_pending(term, mapscout_core::Timestamp::now());
        store.save(&user).await.expect("save");

        let reloaded = store.get(&token).await.expect("get").expect("exists");
        assert_eq!(reloaded.credits, 0);
        assert_eq!(reloaded.history, user.history);
    }

    #[tokio::test]
    async fn test_store_maps_errors() {
        let db = Database::new(":memory:").await.expect("create db");
        db.run_migrations().await.expect("migrations");
        let store = SqliteUserStore::new(Arc::new(db));

        let err = store.save(&User::new("ghost", 0)).await.unwrap_err();
        assert!(matches!(err, mapscout_core::MapscoutError::Database(_)));
    }
}
