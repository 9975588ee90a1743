use crate::actions::{validate_url, NavigableSession, SessionProvider};
use crate::error::{BrowserError, Result};
use crate::identity::SessionIdentity;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::stream::StreamExt;
use mapscout_core::BrowserConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Poll interval while waiting for a selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chromium instance that hands out one page per session.
pub struct BrowserEngine {
    browser: Browser,
    handler_task: JoinHandle<()>,
    locale: String,
    navigation_timeout: Duration,
}

impl BrowserEngine {
    /// Launch a browser with default settings
    pub async fn new() -> Result<Self> {
        Self::launch(&BrowserConfig::default()).await
    }

    /// Launch a browser configured from `config`
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let viewport = Viewport {
            width: config.window_width,
            height: config.window_height,
            ..Viewport::default()
        };

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .viewport(viewport);
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        let chrome_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // Drive the CDP connection until the browser goes away
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        tracing::info!(
            headless = config.headless,
            width = config.window_width,
            height = config.window_height,
            "Browser launched"
        );

        Ok(Self {
            browser,
            handler_task,
            locale: config.locale.clone(),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        })
    }

    /// Close the browser process and stop the event handler
    pub async fn shutdown(mut self) -> Result<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Launch(e.to_string()));
        self.handler_task.abort();
        tracing::info!("Browser shut down");
        result
    }
}

#[async_trait::async_trait]
impl SessionProvider for BrowserEngine {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let identity = SessionIdentity::for_locale(&self.locale);
        let overrides = SetUserAgentOverrideParams::builder()
            .user_agent(identity.user_agent)
            .accept_language(identity.accept_language.clone())
            .build()
            .map_err(BrowserError::Launch)?;
        page.set_user_agent(overrides)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tracing::debug!(
            user_agent = identity.user_agent,
            accept_language = %identity.accept_language,
            "Session opened"
        );

        Ok(ChromeSession {
            page,
            navigation_timeout: self.navigation_timeout,
            closed: AtomicBool::new(false),
        })
    }
}

/// A chromium page implementing [`NavigableSession`].
pub struct ChromeSession {
    page: Page,
    navigation_timeout: Duration,
    closed: AtomicBool,
}

impl ChromeSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrowserError::Closed);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NavigableSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        let target = validate_url(url)?;

        match tokio::time::timeout(self.navigation_timeout, self.page.goto(target.as_str())).await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "navigation to {url} exceeded {:?}",
                self.navigation_timeout
            ))),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.ensure_open()?;
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            BrowserError::Timeout(format!("selector '{selector}' not present after {timeout:?}"))
        })
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.ensure_open()?;
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn content(&self) -> Result<String> {
        self.ensure_open()?;
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))
    }
}
