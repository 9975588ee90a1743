//! Per-candidate detail page visits.

use crate::error::Result;
use crate::extractor::{DetailFields, PageExtractor};
use crate::phone::PhonePatterns;
use mapscout_browser::NavigableSession;
use mapscout_core::{CandidateStub, EnrichedEstablishment, PipelineConfig, SelectorConfig};

/// Which path produced an enriched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// Detail fields were read from the page structure
    Primary(EnrichedEstablishment),
    /// Structure was unusable; only a phone scan of the body text was tried
    Fallback(EnrichedEstablishment),
    /// The stub had no detail reference, so no page was visited
    Skipped(EnrichedEstablishment),
}

impl Enrichment {
    /// The enriched record, whichever path produced it.
    #[must_use]
    pub fn into_establishment(self) -> EnrichedEstablishment {
        match self {
            Self::Primary(e) | Self::Fallback(e) | Self::Skipped(e) => e,
        }
    }

    /// Whether a detail page was actually visited.
    #[must_use]
    pub fn visited(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

/// Visits detail pages and merges what it finds onto candidate stubs.
pub struct DetailEnricher<'a> {
    extractor: &'a dyn PageExtractor,
    patterns: &'a PhonePatterns,
    selectors: &'a SelectorConfig,
    pipeline: &'a PipelineConfig,
}

impl<'a> DetailEnricher<'a> {
    /// Borrow the run's collaborators.
    pub fn new(
        extractor: &'a dyn PageExtractor,
        patterns: &'a PhonePatterns,
        selectors: &'a SelectorConfig,
        pipeline: &'a PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            patterns,
            selectors,
            pipeline,
        }
    }

    /// Enrich one candidate.
    ///
    /// Only a failed navigation is an error. Marker timeouts and extraction
    /// failures degrade to the body-text phone fallback, and a failed
    /// fallback leaves the record at stub fidelity.
    pub async fn enrich<S>(&self, session: &S, stub: CandidateStub) -> Result<Enrichment>
    where
        S: NavigableSession + ?Sized,
    {
        if stub.detail_ref.is_empty() {
            tracing::debug!(name = %stub.name, "No detail reference; keeping stub");
            return Ok(Enrichment::Skipped(stub.into()));
        }

        session.navigate(&stub.detail_ref).await?;
        self.wait_for_markers(session, &stub.detail_ref).await;
        tokio::time::sleep(self.pipeline.detail_settle()).await;

        let mut record = EnrichedEstablishment::from(stub);

        match self.read_primary(session).await {
            Ok(fields) if !fields.name.is_empty() => {
                merge_detail(&mut record, fields);
                tracing::debug!(name = %record.name, phone = %record.phone, "Detail extracted");
                return Ok(Enrichment::Primary(record));
            }
            Ok(_) => {
                tracing::warn!(detail_ref = %record.detail_ref, "Detail page has no name; using fallback");
            }
            Err(e) => {
                tracing::warn!(detail_ref = %record.detail_ref, error = %e, "Detail extraction failed; using fallback");
            }
        }

        tokio::time::sleep(self.pipeline.fallback_wait()).await;
        match session.body_text().await {
            Ok(text) => {
                if let Some(phone) = self.patterns.first_match(&text) {
                    tracing::info!(name = %record.name, phone = %phone, "Phone recovered from page text");
                    record.phone = phone;
                }
            }
            Err(e) => {
                tracing::warn!(detail_ref = %record.detail_ref, error = %e, "Fallback text read failed");
            }
        }

        Ok(Enrichment::Fallback(record))
    }

    async fn wait_for_markers<S>(&self, session: &S, detail_ref: &str)
    where
        S: NavigableSession + ?Sized,
    {
        let timeout = self.pipeline.marker_timeout();
        let (name, reviews) = futures::join!(
            session.wait_for(&self.selectors.detail_name, timeout),
            session.wait_for(&self.selectors.detail_review_block, timeout),
        );

        if let Err(e) = name.and(reviews) {
            tracing::warn!(detail_ref, error = %e, "Detail markers did not appear");
        }
    }

    async fn read_primary<S>(&self, session: &S) -> Result<DetailFields>
    where
        S: NavigableSession + ?Sized,
    {
        let html = session.content().await?;
        self.extractor.extract_detail(&html)
    }
}

/// Detail values overwrite the stub's, including with empty strings.
fn merge_detail(record: &mut EnrichedEstablishment, fields: DetailFields) {
    record.name = fields.name;
    record.phone = fields.phone;
    record.address = fields.address;
    record.website = fields.website;
    record.hours = fields.hours;
    record.rating = fields.rating;
    record.num_reviews = fields.num_reviews;
    record.category = fields.category;
}
