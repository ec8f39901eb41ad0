//! Configuration structures and loading logic.

use crate::config::modes::CollisionPolicy;
use crate::error::{Error, Result};
use crate::http::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output directory name, resolved against the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "Output";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    /// Cookies injected into the session before the first request.
    #[serde(default)]
    pub cookies: Vec<CookieConfig>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Whether to place files in per-kind subdirectories (Images, Videos, ...).
    #[serde(default)]
    pub separate_content: bool,

    /// Whether to append each item's source URL to `urls.txt`.
    #[serde(default)]
    pub save_urls: bool,

    /// Album directory name used for every item, overriding extracted titles.
    #[serde(default)]
    pub album_name: Option<String>,

    /// Behaviour when the target file already exists.
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    /// Number of items downloaded at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Whether to show download progress bars.
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Random pause before each item, as `[min, max]` milliseconds.
    #[serde(default)]
    pub item_delay_ms: [u64; 2],
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            separate_content: false,
            save_urls: false,
            album_name: None,
            collision_policy: CollisionPolicy::default(),
            concurrency: default_concurrency(),
            show_progress: true,
            item_delay_ms: [0, 0],
        }
    }
}

/// HTTP and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout. Zero disables it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Attempts made for a single request before giving up.
    #[serde(default = "default_attempts")]
    pub request_attempts: u32,

    #[serde(default = "default_request_retry_delay")]
    pub request_retry_delay_ms: u64,

    /// Pause after an HTTP 429 response.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,

    /// Attempts made for a whole fetch-and-save of one item.
    #[serde(default = "default_attempts")]
    pub download_attempts: u32,

    #[serde(default = "default_download_retry_delay")]
    pub download_retry_delay_ms: u64,

    /// Wall-clock cap shared by the layered retry loops. Zero disables it.
    #[serde(default = "default_max_retry_secs")]
    pub max_retry_secs: u64,

    /// Headers sent with every request unless the caller overrides them.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            request_attempts: default_attempts(),
            request_retry_delay_ms: default_request_retry_delay(),
            rate_limit_delay_ms: default_rate_limit_delay(),
            download_attempts: default_attempts(),
            download_retry_delay_ms: default_download_retry_delay(),
            max_retry_secs: default_max_retry_secs(),
            headers: default_headers(),
        }
    }
}

impl NetworkConfig {
    /// Retry policy for individual requests.
    pub fn request_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.request_attempts,
            Duration::from_millis(self.request_retry_delay_ms),
        )
        .with_rate_limit_delay(Duration::from_millis(self.rate_limit_delay_ms))
        .with_max_elapsed(self.max_elapsed())
    }

    /// Retry policy wrapping a whole item download.
    pub fn download_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.download_attempts,
            Duration::from_millis(self.download_retry_delay_ms),
        )
        .with_rate_limit_delay(Duration::from_millis(self.rate_limit_delay_ms))
        .with_max_elapsed(self.max_elapsed())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    fn max_elapsed(&self) -> Option<Duration> {
        (self.max_retry_secs > 0).then(|| Duration::from_secs(self.max_retry_secs))
    }
}

/// A pre-obtained cookie scoped to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieConfig {
    pub name: String,
    pub value: String,
    pub domain: String,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0".to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
    ])
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_connect_timeout() -> u64 {
    30_000
}

fn default_request_timeout() -> u64 {
    300_000
}

fn default_attempts() -> u32 {
    3
}

fn default_request_retry_delay() -> u64 {
    3_000
}

fn default_rate_limit_delay() -> u64 {
    10_000
}

fn default_download_retry_delay() -> u64 {
    5_000
}

fn default_max_retry_secs() -> u64 {
    120
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective output directory.
    ///
    /// Relative paths are resolved against the current working directory.
    pub fn output_directory(&self) -> PathBuf {
        let dir = &self.options.output_directory;
        if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(dir)
        }
    }
}
