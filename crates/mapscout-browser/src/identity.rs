//! What each session presents to the site.

use rand::seq::SliceRandom;

const DESKTOP_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// User agent and language header for one session.
///
/// The agent is drawn fresh for every session; the language follows the
/// configured search locale so listings come back in the same language the
/// selectors and phone patterns expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_agent: &'static str,
    pub accept_language: String,
}

impl SessionIdentity {
    pub fn for_locale(locale: &str) -> Self {
        let user_agent = DESKTOP_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DESKTOP_AGENTS[0]);

        Self {
            user_agent,
            accept_language: accept_language(locale),
        }
    }
}

/// `pt-BR` becomes `pt-BR,pt;q=0.9`; a bare or empty locale passes through.
fn accept_language(locale: &str) -> String {
    match locale.split_once('-') {
        Some((lang, _)) if !lang.is_empty() => format!("{locale},{lang};q=0.9"),
        _ => locale.to_string(),
    }
}
