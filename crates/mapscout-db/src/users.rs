//! Users, credit balances and search history.

use crate::error::{DatabaseError, Result};
use mapscout_core::{
    EnrichedEstablishment, SearchHistoryRecord, SearchStatus, SearchTerm, Timestamp, User, UserId,
    UserToken,
};
use sqlx::{SqliteExecutor, SqlitePool};

type HistoryRow = (String, String, String, String);

/// Create a user holding `token` with an initial credit balance.
///
/// # Errors
/// Returns an error if the username or token is already taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    token: &UserToken,
    credits: u32,
) -> Result<User> {
    let user = User::new(username, credits);
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, username, token, credits, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id.as_str())
    .bind(&user.username)
    .bind(token.as_str())
    .bind(i64::from(credits))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user.id, username, "User created");
    Ok(user)
}

/// Load the user owning `token`, with full history.
pub async fn get_by_token(pool: &SqlitePool, token: &UserToken) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, (String, String, i64)>(
        "SELECT id, username, credits FROM users WHERE token = ?",
    )
    .bind(token.as_str())
    .fetch_optional(pool)
    .await?;

    let Some((id, username, credits)) = row else {
        return Ok(None);
    };

    let id = UserId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?;
    let credits = u32::try_from(credits)
        .map_err(|_| DatabaseError::Decode(format!("credit balance out of range: {credits}")))?;
    let history = list_history(pool, &id).await?;

    Ok(Some(User {
        id,
        username,
        credits,
        history,
    }))
}

/// Add credits to a user's balance and return the new balance.
pub async fn add_credits(pool: &SqlitePool, user_id: &UserId, amount: u32) -> Result<u32> {
    let balance = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET credits = credits + ?, updated_at = ? WHERE id = ? RETURNING credits",
    )
    .bind(i64::from(amount))
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::UserNotFound(user_id.clone()))?;

    u32::try_from(balance)
        .map_err(|_| DatabaseError::Decode(format!("credit balance out of range: {balance}")))
}

/// A user's search history, oldest first.
pub async fn list_history(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<SearchHistoryRecord>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        "SELECT search_term, requested_at, status, establishments
         FROM search_history WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(decode_history_row).collect()
}

fn decode_history_row(
    (search_term, requested_at, status, establishments): HistoryRow,
) -> Result<SearchHistoryRecord> {
    let establishments: Vec<EnrichedEstablishment> = serde_json::from_str(&establishments)?;

    Ok(SearchHistoryRecord {
        search_term: SearchTerm::new(search_term).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        requested_at: Timestamp::from_rfc3339(&requested_at)
            .map_err(|e| DatabaseError::Decode(e.to_string()))?,
        establishments,
        status: status
            .parse::<SearchStatus>()
            .map_err(|e| DatabaseError::Decode(e.to_string()))?,
    })
}

/// Take one credit in a single statement. `Ok(None)` means the balance was
/// already zero and nothing changed.
pub async fn try_debit(pool: &SqlitePool, user_id: &UserId) -> Result<Option<u32>> {
    let remaining = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET credits = credits - 1, updated_at = ?
         WHERE id = ? AND credits > 0 RETURNING credits",
    )
    .bind(chrono::Utc::now().to_rfc3339())
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await?;

    match remaining {
        Some(balance) => u32::try_from(balance)
            .map(Some)
            .map_err(|_| DatabaseError::Decode(format!("credit balance out of range: {balance}"))),
        None if user_exists(pool, user_id).await? => Ok(None),
        None => Err(DatabaseError::UserNotFound(user_id.clone())),
    }
}

async fn user_exists<'e>(db: impl SqliteExecutor<'e>, user_id: &UserId) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
        .bind(user_id.as_str())
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

/// Write every entry of `user.history`, one row per (term, `requested_at`).
///
/// Entries already stored by other runs are left in place, and a complete
/// row is never overwritten by a pending one. The credit balance is not
/// touched; it changes only through [`try_debit`] and [`add_credits`].
pub async fn save_user(pool: &SqlitePool, user: &User) -> Result<()> {
    let mut tx = pool.begin().await?;

    if !user_exists(&mut *tx, &user.id).await? {
        return Err(DatabaseError::UserNotFound(user.id.clone()));
    }

    for record in &user.history {
        sqlx::query(
            "INSERT INTO search_history (user_id, search_term, requested_at, status, establishments)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (user_id, search_term, requested_at) DO UPDATE
             SET status = excluded.status, establishments = excluded.establishments
             WHERE search_history.status = 'Pending'",
        )
        .bind(user.id.as_str())
        .bind(record.search_term.as_str())
        .bind(record.requested_at.to_rfc3339())
        .bind(record.status.to_string())
        .bind(serde_json::to_string(&record.establishments)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(user_id = %user.id, history = user.history.len(), "History saved");
    Ok(())
}
