//! User, credit and history commands.

use anyhow::Context;
use mapscout_core::{AppConfig, UserToken};
use mapscout_db::{users, Database};

async fn open_db(config: &AppConfig) -> anyhow::Result<Database> {
    let path = config.database.resolve_path()?;
    Database::open_migrated(&path)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))
}

pub(crate) async fn add_user(
    config: &AppConfig,
    username: &str,
    token: &str,
    credits: u32,
) -> anyhow::Result<()> {
    let token = UserToken::new(token)?;
    let db = open_db(config).await?;
    let user = users::create_user(db.pool(), username, &token, credits).await?;
    println!("created user {} ({}) with {} credits", user.username, user.id, user.credits);
    db.close().await;
    Ok(())
}

pub(crate) async fn add_credits(config: &AppConfig, token: &str, amount: u32) -> anyhow::Result<()> {
    let token = UserToken::new(token)?;
    let db = open_db(config).await?;
    let user = users::get_by_token(db.pool(), &token)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user for the given token"))?;

    let balance = users::add_credits(db.pool(), &user.id, amount).await?;
    println!("{}: {} credits", user.username, balance);
    db.close().await;
    Ok(())
}

pub(crate) async fn show_history(config: &AppConfig, token: &str) -> anyhow::Result<()> {
    let token = UserToken::new(token)?;
    let db = open_db(config).await?;
    let user = users::get_by_token(db.pool(), &token)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user for the given token"))?;

    if user.history.is_empty() {
        println!("no searches yet");
    }
    for record in &user.history {
        println!(
            "{}  {:<8}  {:>3} results  {}",
            record.requested_at,
            record.status,
            record.establishments.len(),
            record.search_term.as_str(),
        );
    }
    db.close().await;
    Ok(())
}
