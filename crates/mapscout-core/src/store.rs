//! The user store collaborator.
//!
//! A run holds its own copy of the user, but the store owns the balance:
//! credits move only through [`UserStore::debit`] and top-ups, and
//! [`UserStore::save`] persists history entries one key at a time. Runs for
//! the same user may overlap without losing each other's debits or records.

use crate::error::{MapscoutError, Result};
use crate::model::User;
use crate::types::{UserId, UserToken};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Persistence boundary for users, their credits and their history.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up the user a token belongs to.
    async fn get(&self, token: &UserToken) -> Result<Option<User>>;

    /// Take one credit as a single step. Returns the remaining balance, or
    /// `None` without touching anything when the balance is already zero.
    async fn debit(&self, user_id: &UserId) -> Result<Option<u32>>;

    /// Persist each of the user's history entries, keyed by search term and
    /// `requested_at`. The stored balance is left alone.
    async fn save(&self, user: &User) -> Result<()>;
}

/// Process-local store keyed by token.
///
/// Useful for tests and dry runs; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    saves: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` under `token`, replacing any previous holder.
    pub fn insert(&self, token: &UserToken, user: User) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(token.as_str().to_string(), user);
        }
    }

    /// The stored user after each [`UserStore::save`], in call order.
    #[must_use]
    pub fn saved_snapshots(&self) -> Vec<User> {
        self.saves.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<String, User>>> {
        self.users
            .lock()
            .map_err(|e| MapscoutError::Internal(format!("user store poisoned: {e}")))
    }
}

fn not_found(user_id: &UserId) -> MapscoutError {
    MapscoutError::Database(format!("user {user_id} not found"))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, token: &UserToken) -> Result<Option<User>> {
        Ok(self.users()?.get(token.as_str()).cloned())
    }

    async fn debit(&self, user_id: &UserId) -> Result<Option<u32>> {
        let mut users = self.users()?;
        let stored = users
            .values_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| not_found(user_id))?;

        let remaining = stored.credits.checked_sub(1);
        if let Some(credits) = remaining {
            stored.credits = credits;
        }
        Ok(remaining)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let mut users = self.users()?;
        let stored = users
            .values_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| not_found(&user.id))?;

        for record in &user.history {
            stored.upsert_record(record);
        }
        let snapshot = stored.clone();
        drop(users);

        if let Ok(mut saves) = self.saves.lock() {
            saves.push(snapshot);
        }
        Ok(())
    }
}
