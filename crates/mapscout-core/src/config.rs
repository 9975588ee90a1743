//! Configuration management for Mapscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wait after scrolling the feed or after pagination settles.
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(1000);
/// Extra wait before declaring a non-growing feed exhausted.
pub const EXHAUSTION_BACKOFF: Duration = Duration::from_millis(2000);
/// Delay between consecutive detail-page visits.
pub const PACING_INTERVAL: Duration = Duration::from_millis(1000);
/// Wait on a detail page before structured extraction.
pub const DETAIL_SETTLE_INTERVAL: Duration = Duration::from_millis(1000);
/// Wait before the phone-pattern fallback scans page text.
pub const FALLBACK_WAIT: Duration = Duration::from_millis(8000);
/// Timeout for each detail-page readiness marker.
pub const MARKER_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the results feed to become ready.
pub const FEED_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Main application configuration.
///
/// This is loaded from `~/.config/mapscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pipeline timing and limits
    pub pipeline: PipelineConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// CSS selectors for the results feed and detail pages
    pub selectors: SelectorConfig,
    /// Result forwarding settings
    pub sinks: SinkConfig,
    /// User store settings
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config: Self = if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!("Config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAPSCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `MAPSCOUT_INGEST_URL`: Override the ingestion endpoint
    /// - `MAPSCOUT_DATABASE_PATH`: Override the user database path
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("MAPSCOUT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(url) = lookup("MAPSCOUT_INGEST_URL") {
            tracing::debug!("Override sinks.ingest_url from env");
            self.sinks.ingest_url = if url.is_empty() { None } else { Some(url) };
        }

        if let Some(path) = lookup("MAPSCOUT_DATABASE_PATH") {
            tracing::debug!("Override database.path from env: {}", path);
            self.database.path = Some(PathBuf::from(path));
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pipeline.max_scroll_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_scroll_iterations".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.pipeline.area_code.is_empty()
            || !self.pipeline.area_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.area_code".to_string(),
                reason: format!("expected digits, got '{}'", self.pipeline.area_code),
            });
        }
        Ok(())
    }

    /// Save configuration to the default path.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mapscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mapscout", "mapscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/mapscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "mapscout", "mapscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Pipeline timing and limits.
///
/// Durations are in milliseconds so the TOML stays flat; use the accessor
/// methods to get `Duration`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wait after each feed scroll and after pagination settles
    pub settle_interval_ms: u64,
    /// Extra wait before declaring the feed exhausted
    pub exhaustion_backoff_ms: u64,
    /// Delay between detail-page visits
    pub pacing_interval_ms: u64,
    /// Wait on a detail page before extraction
    pub detail_settle_ms: u64,
    /// Wait before the phone-pattern fallback
    pub fallback_wait_ms: u64,
    /// Timeout for each detail-page marker
    pub marker_timeout_ms: u64,
    /// Timeout for the results feed marker
    pub feed_ready_timeout_ms: u64,
    /// Safety ceiling on scroll iterations
    pub max_scroll_iterations: u32,
    /// Candidate count used when the caller gives none
    pub default_target: u32,
    /// Area code the fallback phone patterns are qualified with
    pub area_code: String,
}

impl PipelineConfig {
    /// Wait after scrolling.
    #[must_use]
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    /// Wait before declaring exhaustion.
    #[must_use]
    pub fn exhaustion_backoff(&self) -> Duration {
        Duration::from_millis(self.exhaustion_backoff_ms)
    }

    /// Delay between candidates.
    #[must_use]
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    /// Wait before detail extraction.
    #[must_use]
    pub fn detail_settle(&self) -> Duration {
        Duration::from_millis(self.detail_settle_ms)
    }

    /// Wait before the fallback scan.
    #[must_use]
    pub fn fallback_wait(&self) -> Duration {
        Duration::from_millis(self.fallback_wait_ms)
    }

    /// Detail marker timeout.
    #[must_use]
    pub fn marker_timeout(&self) -> Duration {
        Duration::from_millis(self.marker_timeout_ms)
    }

    /// Feed marker timeout.
    #[must_use]
    pub fn feed_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_ready_timeout_ms)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: millis(SETTLE_INTERVAL),
            exhaustion_backoff_ms: millis(EXHAUSTION_BACKOFF),
            pacing_interval_ms: millis(PACING_INTERVAL),
            detail_settle_ms: millis(DETAIL_SETTLE_INTERVAL),
            fallback_wait_ms: millis(FALLBACK_WAIT),
            marker_timeout_ms: millis(MARKER_TIMEOUT),
            feed_ready_timeout_ms: millis(FEED_READY_TIMEOUT),
            max_scroll_iterations: 200,
            default_target: 50,
            area_code: "71".to_string(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser viewport width
    pub window_width: u32,
    /// Browser viewport height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// `hl` locale passed to the search page
    pub locale: String,
    /// Base URL of the maps search page
    pub search_base_url: String,
    /// Explicit Chrome/Chromium executable, otherwise auto-detected
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1366,
            window_height: 768,
            navigation_timeout_secs: 30,
            locale: "pt-BR".to_string(),
            search_base_url: "https://www.google.com/maps/search/".to_string(),
            executable: None,
        }
    }
}

/// CSS selectors for the results feed and listing detail pages.
///
/// Defaults match the current Google Maps markup; they are expected to need
/// updating whenever that markup changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Marker that the results feed has rendered
    pub feed_ready: String,
    /// Scrollable feed container
    pub feed_container: String,
    /// One candidate node in the feed
    pub feed_item: String,
    /// Name inside a candidate node
    pub item_name: String,
    /// Rating inside a candidate node
    pub item_rating: String,
    /// Review count inside a candidate node
    pub item_reviews: String,
    /// Address span inside a candidate node
    pub item_address: String,
    /// Open-status span inside a candidate node
    pub item_hours: String,
    /// Anchor linking to the detail page
    pub item_link: String,
    /// Detail page name heading
    pub detail_name: String,
    /// Detail page review block marker
    pub detail_review_block: String,
    /// Phone button carrying an aria-label
    pub detail_phone: String,
    /// Prefix stripped from the phone aria-label
    pub detail_phone_prefix: String,
    /// Address button carrying an aria-label
    pub detail_address: String,
    /// Prefix stripped from the address aria-label
    pub detail_address_prefix: String,
    /// Website anchor
    pub detail_website: String,
    /// Opening-hours text
    pub detail_hours: String,
    /// Rating text
    pub detail_rating: String,
    /// Element whose aria-label holds the review count
    pub detail_review_count: String,
    /// Category button
    pub detail_category: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            feed_ready: ".m6QErb.DxyBCb.kA9KIf.dS8AEf.XiKgde.ecceSd".to_string(),
            feed_container: r#"div[role="feed"]"#.to_string(),
            feed_item: ".Nv2PK.THOPZb.CpccDe".to_string(),
            item_name: ".qBF1Pd".to_string(),
            item_rating: ".MW4etd".to_string(),
            item_reviews: ".UY7F9".to_string(),
            item_address: ".W4Efsd span:last-child".to_string(),
            item_hours: r#".W4Efsd span span[style*="color: rgba(25,134,57,1.00)"]"#.to_string(),
            item_link: "a.hfpxzc".to_string(),
            detail_name: "h1.DUwDvf.lfPIob".to_string(),
            detail_review_block: ".Io6YTe.fontBodyMedium.kR99db.fdkmkc".to_string(),
            detail_phone: r#"button.CsEnBe[data-item-id^="phone:tel"]"#.to_string(),
            detail_phone_prefix: "Telefone: ".to_string(),
            detail_address: r#"button.CsEnBe[data-item-id="address"]"#.to_string(),
            detail_address_prefix: "Endereço: ".to_string(),
            detail_website: r#"a.CsEnBe[data-item-id="authority"]"#.to_string(),
            detail_hours: ".o0Svhf .ZDu9vd span".to_string(),
            detail_rating: r#".F7nice span[aria-hidden="true"]"#.to_string(),
            detail_review_count: r#".F7nice span[aria-label*="avaliações"]"#.to_string(),
            detail_category: "button.DkEaL".to_string(),
        }
    }
}

/// Result forwarding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Endpoint that receives each result set as JSON; disabled when unset
    pub ingest_url: Option<String>,
    /// HTTP timeout for the ingestion request in seconds
    pub ingest_timeout_secs: u64,
    /// File the latest result set is written to; disabled when unset
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            ingest_url: None,
            ingest_timeout_secs: 30,
            snapshot_path: Some(PathBuf::from("last_search.json")),
        }
    }
}

/// User store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` file; defaults to `mapscout.db` in the data directory
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path.
    pub fn resolve_path(&self) -> ConfigResult<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(AppConfig::data_dir()?.join("mapscout.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.settle_interval(), SETTLE_INTERVAL);
        assert_eq!(config.pipeline.exhaustion_backoff(), EXHAUSTION_BACKOFF);
        assert_eq!(config.pipeline.pacing_interval(), PACING_INTERVAL);
        assert_eq!(config.pipeline.fallback_wait(), Duration::from_secs(8));
        assert_eq!(config.pipeline.feed_ready_timeout(), Duration::from_secs(60));
        assert_eq!(config.pipeline.area_code, "71");
        assert!(config.browser.headless);
        assert_eq!(config.browser.window_width, 1366);
        assert!(config.sinks.ingest_url.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[pipeline]"));
        assert!(toml_str.contains("[selectors]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.selectors.feed_item, config.selectors.feed_item);
        assert_eq!(parsed.pipeline.max_scroll_iterations, 200);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[pipeline]
pacing_interval_ms = 250

[selectors]
feed_item = ".result"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.pipeline.pacing_interval(), Duration::from_millis(250));
        assert_eq!(config.selectors.feed_item, ".result");
        // These should be defaults
        assert_eq!(config.pipeline.settle_interval_ms, 1000);
        assert_eq!(config.selectors.item_link, "a.hfpxzc");
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let missing = AppConfig::load_from(&config_path).expect("defaults when missing");
        assert_eq!(missing.pipeline.default_target, 50);

        fs::write(&config_path, "[pipeline]\ndefault_target = 20\n").expect("write config");
        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.pipeline.default_target, 20);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        fs::write(&config_path, "[pipeline]\nmax_scroll_iterations = 0\n").expect("write");
        assert!(matches!(
            AppConfig::load_from(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));

        fs::write(&config_path, "[pipeline]\narea_code = \"7a\"\n").expect("write");
        assert!(AppConfig::load_from(&config_path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("MAPSCOUT_HEADLESS", "false"),
            ("MAPSCOUT_INGEST_URL", "https://ingest.example/results"),
            ("MAPSCOUT_DATABASE_PATH", "/tmp/users.db"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(ToString::to_string));

        assert!(!config.browser.headless);
        assert_eq!(
            config.sinks.ingest_url.as_deref(),
            Some("https://ingest.example/results")
        );
        assert_eq!(
            config.database.resolve_path().expect("path"),
            PathBuf::from("/tmp/users.db")
        );
    }

    #[test]
    fn test_empty_ingest_override_disables_sink() {
        let mut config = AppConfig::default();
        config.sinks.ingest_url = Some("https://x.example".to_string());
        config.apply_env(|key| (key == "MAPSCOUT_INGEST_URL").then(String::new));
        assert!(config.sinks.ingest_url.is_none());
    }
}
