//! Scripted in-memory browser for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mapscout_browser::{BrowserError, FeedMetrics, NavigableSession, SessionProvider};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const FEED_ITEM_HEIGHT: u64 = 100;

/// A detail page the fake browser can serve.
#[derive(Debug, Clone)]
pub struct FakeDetail {
    pub html: String,
    pub text: String,
    pub markers_ready: bool,
    pub navigation_fails: bool,
}

impl FakeDetail {
    /// A well-formed detail page.
    pub fn full(name: &str, phone_label: &str) -> Self {
        Self {
            html: detail_html(name, phone_label),
            text: format!("{name} {phone_label}"),
            markers_ready: true,
            navigation_fails: false,
        }
    }

    /// A page whose structure never renders; only body text is available.
    pub fn text_only(text: &str) -> Self {
        Self {
            html: "<html><body><div>Carregando...</div></body></html>".to_string(),
            text: text.to_string(),
            markers_ready: false,
            navigation_fails: false,
        }
    }

    /// A rendered page whose review count carries no number, with `text` as
    /// the visible body.
    pub fn unrated(name: &str, phone_label: &str, text: &str) -> Self {
        Self {
            html: detail_html(name, phone_label).replace(
                r#"aria-label="87 avaliações">(87)"#,
                r#"aria-label="sem avaliações">"#,
            ),
            text: text.to_string(),
            markers_ready: true,
            navigation_fails: false,
        }
    }

    /// A page that cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            html: String::new(),
            text: String::new(),
            markers_ready: false,
            navigation_fails: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub feed_ready: bool,
    pub feed_missing: bool,
    /// Feed metric scripts fail to evaluate
    pub metrics_broken: bool,
    pub fail_open: bool,
    /// Candidates the feed can ever show
    pub total: usize,
    /// Candidates currently loaded
    pub loaded: usize,
    /// Candidates added per scroll
    pub page_size: usize,
    /// Indexes of feed items rendered without a link
    pub linkless: HashSet<usize>,
    pub details: HashMap<String, FakeDetail>,
    pub current: Option<String>,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub opened: usize,
    pub closed: usize,
}

impl FakeState {
    fn current_detail(&self) -> Option<&FakeDetail> {
        self.current.as_ref().and_then(|url| self.details.get(url))
    }
}

/// Provider handing out sessions over one shared scripted state.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    /// A ready feed of `total` candidates with `loaded` visible up front.
    pub fn with_feed(total: usize, loaded: usize, page_size: usize) -> Self {
        let browser = Self::default();
        {
            let mut state = browser.state();
            state.feed_ready = true;
            state.total = total;
            state.loaded = loaded.min(total);
            state.page_size = page_size;
        }
        browser
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    pub fn add_detail(&self, index: usize, detail: FakeDetail) {
        self.state().details.insert(place_url(index), detail);
    }
}

#[async_trait]
impl SessionProvider for FakeBrowser {
    type Session = FakeSession;

    async fn open(&self) -> mapscout_browser::Result<FakeSession> {
        let mut state = self.state();
        if state.fail_open {
            return Err(BrowserError::Launch("launch failed".to_string()));
        }
        state.opened += 1;
        Ok(FakeSession {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }
}

#[async_trait]
impl NavigableSession for FakeSession {
    async fn navigate(&self, url: &str) -> mapscout_browser::Result<()> {
        let mut state = self.state();
        state.navigations.push(url.to_string());
        if state.details.get(url).is_some_and(|d| d.navigation_fails) {
            return Err(BrowserError::Navigation(format!("{url} unreachable")));
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> mapscout_browser::Result<()> {
        let ready = {
            let state = self.state();
            match state.current_detail() {
                Some(detail) => detail.markers_ready,
                None => state.feed_ready,
            }
        };
        if ready {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(BrowserError::Timeout(selector.to_string()))
    }

    async fn evaluate(&self, script: &str) -> mapscout_browser::Result<serde_json::Value> {
        Err(BrowserError::Evaluation(format!("unscripted: {script}")))
    }

    async fn close(&self) -> mapscout_browser::Result<()> {
        self.state().closed += 1;
        Ok(())
    }

    async fn content(&self) -> mapscout_browser::Result<String> {
        let state = self.state();
        Ok(match state.current_detail() {
            Some(detail) => detail.html.clone(),
            None => feed_html(state.loaded, &state.linkless),
        })
    }

    async fn body_text(&self) -> mapscout_browser::Result<String> {
        let state = self.state();
        Ok(state
            .current_detail()
            .map(|d| d.text.clone())
            .unwrap_or_default())
    }

    async fn scroll_feed(&self, feed_selector: &str) -> mapscout_browser::Result<()> {
        let mut state = self.state();
        if state.feed_missing {
            return Err(BrowserError::SelectorNotFound(feed_selector.to_string()));
        }
        state.scrolls += 1;
        state.loaded = (state.loaded + state.page_size).min(state.total);
        Ok(())
    }

    async fn feed_metrics(
        &self,
        _feed_selector: &str,
        _item_selector: &str,
    ) -> mapscout_browser::Result<FeedMetrics> {
        let state = self.state();
        if state.metrics_broken {
            return Err(BrowserError::Evaluation("feed metrics".to_string()));
        }
        let height = if state.feed_missing {
            0
        } else {
            state.loaded as u64 * FEED_ITEM_HEIGHT
        };
        Ok(FeedMetrics {
            item_count: state.loaded,
            scroll_height: height,
        })
    }
}

pub fn place_url(index: usize) -> String {
    format!("https://maps.test/place/{index}")
}

pub fn feed_html(count: usize, linkless: &HashSet<usize>) -> String {
    let items: String = (0..count)
        .map(|i| {
            let link = if linkless.contains(&i) {
                String::new()
            } else {
                format!(r#"<a class="hfpxzc" href="{}"></a>"#, place_url(i))
            };
            format!(
                r#"<div class="Nv2PK THOPZb CpccDe">{link}
                    <div class="qBF1Pd">Lugar {i}</div>
                    <span class="MW4etd">4,{i}</span>
                    <span class="UY7F9">({i}0)</span>
                    <div class="W4Efsd"><span>Restaurante</span><span>Rua {i}</span></div>
                </div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div role="feed" class="m6QErb DxyBCb kA9KIf dS8AEf XiKgde ecceSd">{items}</div></body></html>"#
    )
}

pub fn detail_html(name: &str, phone_label: &str) -> String {
    format!(
        r#"<html><body>
            <h1 class="DUwDvf lfPIob">{name}</h1>
            <div class="Io6YTe fontBodyMedium kR99db fdkmkc">Avaliações</div>
            <button class="DkEaL">Restaurante</button>
            <div class="F7nice"><span aria-hidden="true">4,8</span>
                <span aria-label="87 avaliações">(87)</span></div>
            <button class="CsEnBe" data-item-id="address" aria-label="Endereço: Av. Sete, 100"></button>
            <button class="CsEnBe" data-item-id="phone:tel:x" aria-label="Telefone: {phone_label}"></button>
            <a class="CsEnBe" data-item-id="authority" href="https://example.com/site"></a>
        </body></html>"#
    )
}
