//! One-off scan of a page for contact numbers.

use crate::phone::find_contact_numbers;
use mapscout_browser::{NavigableSession, SessionProvider};

/// Visit `url` in a fresh session and return every distinct phone number in
/// its text. Any failure is logged and yields an empty list.
pub async fn scan_page_numbers<P>(provider: &P, url: &str) -> Vec<String>
where
    P: SessionProvider + ?Sized,
{
    let session = match provider.open().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(url, error = %e, "Could not open session for number scan");
            return Vec::new();
        }
    };

    let text = match session.navigate(url).await {
        Ok(()) => session.body_text().await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close browser session");
    }

    match text {
        Ok(text) => {
            let numbers = find_contact_numbers(&text);
            tracing::info!(url, found = numbers.len(), "Page scanned for numbers");
            numbers
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "Number scan failed");
            Vec::new()
        }
    }
}
