//! Browser sessions for the Mapscout pipeline.
//!
//! Defines the [`NavigableSession`] contract the pipeline drives and a
//! chromium-backed implementation that opens one page per session.

pub mod actions;
pub mod engine;
pub mod error;
pub mod identity;

pub use actions::{FeedMetrics, NavigableSession, SessionProvider};
pub use engine::{BrowserEngine, ChromeSession};
pub use identity::SessionIdentity;
pub use error::{BrowserError, Result};
