//! Search orchestrator for one listing discovery run.
//!
//! A run debits one credit, drives a single browser session through the
//! results feed and each candidate's detail page, then records the outcome in
//! the user's history in two phases (pending, then complete) and forwards it
//! to the configured sinks.

use crate::enricher::{DetailEnricher, Enrichment};
use crate::error::{Result, ScanError};
use crate::extractor::{MapsExtractor, PageExtractor};
use crate::pagination::{grow_feed_until, PaginationOutcome};
use crate::phone::PhonePatterns;
use crate::sink::{forward_all, ResultPayload, ResultSink};
use crate::url_builder::build_search_url;
use mapscout_browser::{NavigableSession, SessionProvider};
use mapscout_core::{
    AppConfig, EnrichedEstablishment, MapscoutError, SearchResultSet, SearchTerm, Timestamp, User,
    UserStore, UserToken,
};
use std::sync::Arc;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Establishments found, in feed order
    pub result_set: SearchResultSet,
    /// Credit balance after the run's debit
    pub credits: u32,
    /// Why pagination stopped
    pub pagination: PaginationOutcome,
}

/// Load the user holding `token` and check they can pay for a run.
///
/// Callers use this before starting a browser. The balance is checked again
/// when the run debits, since another run may spend the last credit between
/// the two.
pub async fn billable_user<U>(store: &U, token: &UserToken) -> Result<User>
where
    U: UserStore + ?Sized,
{
    let user = store.get(token).await?.ok_or(ScanError::UserNotFound)?;
    if user.credits == 0 {
        tracing::warn!(user_id = %user.id, "Search refused: no credits left");
        return Err(ScanError::InsufficientCredits { user_id: user.id });
    }
    Ok(user)
}

/// Runs the discovery and enrichment pipeline.
pub struct SearchOrchestrator<P, U> {
    /// Opens one browser session per run
    provider: Arc<P>,
    /// Holds credit balances and history
    store: Arc<U>,
    /// Reads stubs and detail fields from page HTML
    extractor: Box<dyn PageExtractor>,
    /// Fallback phone patterns for the configured area code
    patterns: PhonePatterns,
    /// Best-effort result destinations
    sinks: Vec<Box<dyn ResultSink>>,
    config: AppConfig,
}

impl<P, U> SearchOrchestrator<P, U>
where
    P: SessionProvider,
    U: UserStore,
{
    /// Create an orchestrator with the default extractor and no sinks.
    pub fn new(provider: Arc<P>, store: Arc<U>, config: AppConfig) -> Result<Self> {
        let extractor =
            MapsExtractor::new(&config.selectors, Some(config.browser.search_base_url.as_str()))?;
        let patterns = PhonePatterns::for_area_code(&config.pipeline.area_code)?;

        Ok(Self {
            provider,
            store,
            extractor: Box::new(extractor),
            patterns,
            sinks: Vec::new(),
            config,
        })
    }

    /// Forward finished result sets to these sinks.
    #[must_use]
    pub fn with_sinks(mut self, sinks: Vec<Box<dyn ResultSink>>) -> Self {
        self.sinks = sinks;
        self
    }

    /// Replace the page extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run a search for the user holding `token`.
    pub async fn run(
        &self,
        term: &SearchTerm,
        target: usize,
        token: &UserToken,
    ) -> Result<SearchOutcome> {
        let mut user = billable_user(self.store.as_ref(), token).await?;
        self.run_for_user(term, target, &mut user).await
    }

    /// Run a search on behalf of an already loaded user.
    ///
    /// The credit is taken through the store; `user` mirrors the resulting
    /// balance and its history is persisted after each phase.
    pub async fn run_for_user(
        &self,
        term: &SearchTerm,
        target: usize,
        user: &mut User,
    ) -> Result<SearchOutcome> {
        let search_url = build_search_url(
            &self.config.browser.search_base_url,
            term,
            &self.config.browser.locale,
        )?;

        let Some(remaining) = self.store.debit(&user.id).await? else {
            tracing::warn!(user_id = %user.id, term = %term.as_str(), "Search refused: no credits left");
            return Err(ScanError::InsufficientCredits {
                user_id: user.id.clone(),
            });
        };
        user.credits = remaining;

        tracing::info!(
            user_id = %user.id,
            term = %term.as_str(),
            target,
            credits = user.credits,
            "Starting search"
        );

        let session = self.provider.open().await?;
        let collected = self.collect(&session, &search_url, target).await;
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close browser session");
        }
        let (establishments, pagination) = collected?;

        let requested_at = Timestamp::now();
        let result_set = SearchResultSet::new(term.clone(), requested_at, establishments);

        let payload = ResultPayload {
            result_set: result_set.clone(),
            user_id: user.id.clone(),
        };
        forward_all(&self.sinks, &payload).await;

        user.append_pending(term.clone(), requested_at);
        self.store.save(user).await?;

        if !user.complete_pending(term, requested_at, result_set.establishments.clone()) {
            return Err(ScanError::Store(MapscoutError::Internal(format!(
                "pending history record for '{}' at {requested_at} disappeared",
                term.as_str()
            ))));
        }
        self.store.save(user).await?;

        tracing::info!(
            user_id = %user.id,
            term = %term.as_str(),
            establishments = result_set.establishments.len(),
            phones = result_set.phone_numbers.len(),
            "Search complete"
        );

        Ok(SearchOutcome {
            result_set,
            credits: user.credits,
            pagination,
        })
    }

    /// Steps that need the live session: feed readiness, pagination,
    /// extraction and enrichment.
    async fn collect(
        &self,
        session: &P::Session,
        search_url: &str,
        target: usize,
    ) -> Result<(Vec<EnrichedEstablishment>, PaginationOutcome)> {
        let pipeline = &self.config.pipeline;
        let selectors = &self.config.selectors;

        session.navigate(search_url).await?;

        let ready_timeout = pipeline.feed_ready_timeout();
        session
            .wait_for(&selectors.feed_ready, ready_timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::error!(url = %search_url, "Results feed never became ready");
                    ScanError::SessionTimeout {
                        timeout: ready_timeout,
                    }
                } else {
                    e.into()
                }
            })?;

        let pagination = grow_feed_until(session, target, selectors, pipeline).await?;
        tracing::debug!(?pagination, "Pagination finished");

        tokio::time::sleep(pipeline.settle_interval()).await;

        let html = session.content().await?;
        let stubs = self.extractor.extract_stubs(&html, target);
        tracing::info!(candidates = stubs.len(), target, "Candidates extracted");

        let enricher =
            DetailEnricher::new(self.extractor.as_ref(), &self.patterns, selectors, pipeline);

        let total = stubs.len();
        let mut establishments = Vec::with_capacity(total);
        for (index, stub) in stubs.into_iter().enumerate() {
            let fallback = EnrichedEstablishment::from(stub.clone());
            let enrichment = match enricher.enrich(session, stub).await {
                Ok(enrichment) => enrichment,
                Err(e) => {
                    tracing::warn!(index, name = %fallback.name, error = %e, "Candidate enrichment failed");
                    Enrichment::Fallback(fallback)
                }
            };

            let visited = enrichment.visited();
            establishments.push(enrichment.into_establishment());

            if visited && index + 1 < total {
                tokio::time::sleep(pipeline.pacing_interval()).await;
            }
        }

        Ok((establishments, pagination))
    }
}
