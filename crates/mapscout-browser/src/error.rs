use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chromium could not start, open a page or apply session settings
    #[error("browser unavailable: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The results feed (or another required element) is absent from the page
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("session already closed")]
    Closed,
}

impl BrowserError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
