use crate::error::{Result, ScanError};
use mapscout_core::SearchTerm;
use url::Url;

/// Build the results-feed URL for a term: the term becomes the last path
/// segment (percent-encoded) and the locale goes in `hl`.
pub fn build_search_url(base_url: &str, term: &SearchTerm, locale: &str) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ScanError::InvalidConfig(format!("search base URL '{base_url}': {e}")))?;

    url.path_segments_mut()
        .map_err(|()| ScanError::InvalidConfig(format!("search base URL '{base_url}' cannot have a path")))?
        .pop_if_empty()
        .push(term.as_str());

    if !locale.is_empty() {
        url.query_pairs_mut().append_pair("hl", locale);
    }

    Ok(url.into())
}
