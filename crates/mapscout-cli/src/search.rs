//! Browser-driven commands.

use mapscout_browser::BrowserEngine;
use mapscout_core::{AppConfig, SearchTerm, UserToken};
use mapscout_db::{Database, SqliteUserStore};
use mapscout_scanner::{
    billable_user, scan_page_numbers, sinks_from_config, SearchOrchestrator, SearchOutcome,
};
use std::sync::Arc;

/// Run one search for the user holding `token` and print what it found.
pub(crate) async fn run_search(
    config: AppConfig,
    term: &str,
    target: Option<u32>,
    token: &str,
    json: bool,
) -> anyhow::Result<()> {
    let term = SearchTerm::new(term)?;
    let token = UserToken::new(token)?;
    let target = usize::try_from(target.unwrap_or(config.pipeline.default_target))?;

    let db = Arc::new(Database::open_migrated(config.database.resolve_path()?).await?);
    let store = Arc::new(SqliteUserStore::new(Arc::clone(&db)));
    let sinks = sinks_from_config(&config.sinks)?;

    // Refuse unknown or broke users before paying for a browser launch.
    let mut user = billable_user(store.as_ref(), &token).await?;
    let engine = Arc::new(BrowserEngine::launch(&config.browser).await?);

    let orchestrator =
        SearchOrchestrator::new(Arc::clone(&engine), store, config)?.with_sinks(sinks);
    let result = orchestrator.run_for_user(&term, target, &mut user).await;
    drop(orchestrator);

    shutdown(engine).await;
    let outcome = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.result_set)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

/// Scan a single page for phone numbers.
pub(crate) async fn run_numbers(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let engine = BrowserEngine::launch(&config.browser).await?;
    let numbers = scan_page_numbers(&engine, url).await;
    if let Err(e) = engine.shutdown().await {
        tracing::warn!(error = %e, "Browser did not shut down cleanly");
    }

    if numbers.is_empty() {
        println!("no numbers found");
    }
    for number in numbers {
        println!("{number}");
    }
    Ok(())
}

async fn shutdown(engine: Arc<BrowserEngine>) {
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.shutdown().await {
                tracing::warn!(error = %e, "Browser did not shut down cleanly");
            }
        }
        Err(_) => tracing::warn!("Browser still shared at exit; skipping shutdown"),
    }
}

fn print_outcome(outcome: &SearchOutcome) {
    let results = &outcome.result_set;
    println!(
        "{}: {} establishments, {} phones ({})",
        results.search_term.as_str(),
        results.establishments.len(),
        results.phone_numbers.len(),
        results.requested_at,
    );
    for (i, e) in results.establishments.iter().enumerate() {
        let phone = if e.phone.is_empty() { "-" } else { &e.phone };
        println!("{:>3}. {} | {} | {}", i + 1, e.name, phone, e.address);
    }
    println!("credits remaining: {}", outcome.credits);
}
