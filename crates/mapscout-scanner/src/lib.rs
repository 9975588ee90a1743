//! Mapscout Scanner - listing discovery and enrichment.
//!
//! Drives one browser session through a map results feed: grows the feed until
//! enough candidates load, extracts them, visits each detail page for richer
//! fields (falling back to a phone scan of the page text), and records the
//! run against the user's credits and history.
//!
//! # Example
//!
//! ```rust,ignore
//! use mapscout_scanner::SearchOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = SearchOrchestrator::new(
//!     Arc::new(browser_engine),
//!     Arc::new(user_store),
//!     config,
//! )?;
//!
//! let outcome = orchestrator.run(&term, 20, &token).await?;
//! println!("{} phones", outcome.result_set.phone_numbers.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod enricher;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
pub mod orchestrator;
pub mod page_scan;
pub mod pagination;
pub mod phone;
#[allow(missing_docs)]
pub mod sink;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use enricher::{DetailEnricher, Enrichment};
pub use error::{Result, ScanError};
pub use extractor::{DetailFields, MapsExtractor, PageExtractor};
pub use orchestrator::{billable_user, SearchOrchestrator, SearchOutcome};
pub use page_scan::scan_page_numbers;
pub use pagination::{grow_feed_until, PaginationOutcome};
pub use phone::{find_contact_numbers, PhonePatterns};
pub use sink::{
    forward_all, sinks_from_config, IngestionSink, ResultPayload, ResultSink, SinkError,
    SnapshotSink,
};
pub use url_builder::build_search_url;
