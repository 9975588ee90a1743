use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size of the results feed at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetrics {
    /// Number of candidate nodes currently loaded
    pub item_count: usize,
    /// Scrollable content height of the feed container
    pub scroll_height: u64,
}

/// A single controllable page owned by one pipeline run.
///
/// Implementations provide the four primitives; the feed and content helpers
/// have default implementations built on [`NavigableSession::evaluate`].
#[async_trait::async_trait]
pub trait NavigableSession: Send + Sync {
    /// Navigate to a URL and wait for the load event
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait for a selector to appear, failing with [`BrowserError::Timeout`]
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Release the page. Calling it twice is harmless.
    async fn close(&self) -> Result<()>;

    /// Serialized HTML of the whole document
    async fn content(&self) -> Result<String> {
        let value = self
            .evaluate("document.documentElement.outerHTML")
            .await?;
        expect_string(value, "document HTML")
    }

    /// Full text content of the page body
    async fn body_text(&self) -> Result<String> {
        let value = self
            .evaluate("document.body ? document.body.textContent : ''")
            .await?;
        expect_string(value, "body text")
    }

    /// Scroll the feed container to its current extent
    async fn scroll_feed(&self, feed_selector: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; el.scrollTop = el.scrollHeight; return true; }})()",
            sel = js_string(feed_selector),
        );
        match self.evaluate(&script).await? {
            serde_json::Value::Bool(true) => Ok(()),
            _ => Err(BrowserError::SelectorNotFound(feed_selector.to_string())),
        }
    }

    /// Count loaded candidates and read the feed's scroll height
    async fn feed_metrics(&self, feed_selector: &str, item_selector: &str) -> Result<FeedMetrics> {
        let script = format!(
            "(() => {{ const el = document.querySelector({feed}); \
             return {{ item_count: document.querySelectorAll({item}).length, \
             scroll_height: el ? el.scrollHeight : 0 }}; }})()",
            feed = js_string(feed_selector),
            item = js_string(item_selector),
        );
        let value = self.evaluate(&script).await?;
        serde_json::from_value(value)
            .map_err(|e| BrowserError::Evaluation(format!("feed metrics: {e}")))
    }
}

/// Opens sessions. Each run opens its own and never shares it.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Session type handed out
    type Session: NavigableSession;

    /// Open a fresh page
    async fn open(&self) -> Result<Self::Session>;
}

/// Quote a value as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn expect_string(value: serde_json::Value, what: &str) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Err(BrowserError::Evaluation(format!(
            "expected {what} as a string, got {other}"
        ))),
    }
}

/// Check that a navigation target is an absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::Navigation(format!("Invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        scheme => Err(BrowserError::Navigation(format!(
            "unsupported URL '{url}' (scheme {scheme})"
        ))),
    }
}
