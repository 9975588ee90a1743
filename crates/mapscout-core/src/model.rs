//! Listing records, result sets, users and search history.

use crate::types::{SearchTerm, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Low-fidelity candidate read from the results feed.
///
/// Every field is a raw string; a field whose selector was absent is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStub {
    /// Listing name as shown in the feed
    pub name: String,
    /// Rating text, e.g. `4,7`
    pub rating: String,
    /// Review count text with parentheses stripped
    pub review_count: String,
    /// Address line
    pub address: String,
    /// Opening-hours text
    pub hours: String,
    /// Navigable reference to the listing's detail page
    pub detail_ref: String,
}

/// A candidate after its detail page has been visited.
///
/// Superset of [`CandidateStub`]. A candidate whose enrichment failed keeps
/// its stub values and leaves the detail-only fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEstablishment {
    /// Listing name
    pub name: String,
    /// Rating text
    pub rating: String,
    /// Review count text from the feed
    pub review_count: String,
    /// Address line
    pub address: String,
    /// Opening-hours text
    pub hours: String,
    /// Navigable reference to the detail page
    pub detail_ref: String,
    /// Phone number, possibly empty
    pub phone: String,
    /// Website URL
    pub website: String,
    /// Business category
    pub category: String,
    /// Numeric review count parsed from the detail page
    pub num_reviews: String,
}

impl From<CandidateStub> for EnrichedEstablishment {
    fn from(stub: CandidateStub) -> Self {
        Self {
            name: stub.name,
            rating: stub.rating,
            review_count: stub.review_count,
            address: stub.address,
            hours: stub.hours,
            detail_ref: stub.detail_ref,
            ..Self::default()
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// The term that was searched
    pub search_term: SearchTerm,
    /// When the run assembled its results
    pub requested_at: Timestamp,
    /// Establishments in feed order
    pub establishments: Vec<EnrichedEstablishment>,
    /// Non-empty phone numbers, in establishment order
    pub phone_numbers: Vec<String>,
}

impl SearchResultSet {
    /// Build a result set, deriving `phone_numbers` from the establishments.
    #[must_use]
    pub fn new(
        search_term: SearchTerm,
        requested_at: Timestamp,
        establishments: Vec<EnrichedEstablishment>,
    ) -> Self {
        let phone_numbers = establishments
            .iter()
            .filter(|e| !e.phone.is_empty())
            .map(|e| e.phone.clone())
            .collect();

        Self {
            search_term,
            requested_at,
            establishments,
            phone_numbers,
        }
    }
}

/// Lifecycle state of a search history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Run recorded but results not yet attached
    Pending,
    /// Results attached
    Complete,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.pad("Pending"),
            Self::Complete => f.pad("Complete"),
        }
    }
}

impl std::str::FromStr for SearchStatus {
    type Err = crate::MapscoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Complete" => Ok(Self::Complete),
            other => Err(crate::MapscoutError::Validation(format!(
                "unknown search status '{other}'"
            ))),
        }
    }
}

/// One entry of a user's search history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryRecord {
    /// The term that was searched
    pub search_term: SearchTerm,
    /// Timestamp shared with the run's result set
    pub requested_at: Timestamp,
    /// Establishments, empty while pending
    pub establishments: Vec<EnrichedEstablishment>,
    /// Record state
    pub status: SearchStatus,
}

impl SearchHistoryRecord {
    /// A pending record with no establishments.
    #[must_use]
    pub fn pending(search_term: SearchTerm, requested_at: Timestamp) -> Self {
        Self {
            search_term,
            requested_at,
            establishments: Vec::new(),
            status: SearchStatus::Pending,
        }
    }

    fn is_pending_for(&self, search_term: &SearchTerm, requested_at: Timestamp) -> bool {
        self.status == SearchStatus::Pending
            && &self.search_term == search_term
            && self.requested_at == requested_at
    }
}

/// A caller of the pipeline, as held by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier
    pub id: UserId,
    /// Display name
    pub username: String,
    /// Remaining search credits
    pub credits: u32,
    /// Search history, oldest first
    pub history: Vec<SearchHistoryRecord>,
}

impl User {
    /// Create a user with a fresh id and empty history.
    #[must_use]
    pub fn new(username: impl Into<String>, credits: u32) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            credits,
            history: Vec::new(),
        }
    }

    /// Insert `record`, or update the entry with the same search term and
    /// `requested_at`. A complete entry is never turned back into a pending
    /// one.
    pub fn upsert_record(&mut self, record: &SearchHistoryRecord) {
        let existing = self.history.iter_mut().find(|r| {
            r.search_term == record.search_term && r.requested_at == record.requested_at
        });
        match existing {
            Some(r) if r.status == SearchStatus::Complete => {}
            Some(r) => *r = record.clone(),
            None => self.history.push(record.clone()),
        }
    }

    /// Append a pending record for a run.
    pub fn append_pending(&mut self, search_term: SearchTerm, requested_at: Timestamp) {
        self.history
            .push(SearchHistoryRecord::pending(search_term, requested_at));
    }

    /// Replace the pending record keyed by (`search_term`, `requested_at`)
    /// with a complete one holding `establishments`.
    ///
    /// Returns `false` if no such pending record exists.
    pub fn complete_pending(
        &mut self,
        search_term: &SearchTerm,
        requested_at: Timestamp,
        establishments: Vec<EnrichedEstablishment>,
    ) -> bool {
        let Some(record) = self
            .history
            .iter_mut()
            .find(|r| r.is_pending_for(search_term, requested_at))
        else {
            return false;
        };

        *record = SearchHistoryRecord {
            search_term: search_term.clone(),
            requested_at,
            establishments,
            status: SearchStatus::Complete,
        };
        true
    }
}
