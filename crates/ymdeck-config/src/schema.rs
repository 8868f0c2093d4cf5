//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cdp: CdpConfig,

    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-chain selector overrides, keyed by chain name (`like`, `scope`, ...).
    #[serde(default)]
    pub selectors: BTreeMap<String, Vec<String>>,
}

/// DevTools endpoint of the desktop client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdpConfig {
    #[serde(default = "default_cdp_endpoint")]
    pub endpoint: String,

    /// A page matches when its URL or title contains any of these.
    #[serde(default = "default_page_match")]
    pub page_match: Vec<String>,

    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_cdp_endpoint(),
            page_match: default_page_match(),
            reconnect_interval_ms: default_reconnect_interval(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl CdpConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Point the endpoint at another local port, keeping the host part.
    pub fn with_port(mut self, port: u16) -> Self {
        if let Ok(mut url) = url::Url::parse(&self.endpoint) {
            if url.set_port(Some(port)).is_ok() {
                self.endpoint = url.as_str().trim_end_matches('/').to_string();
            }
        }
        self
    }
}

fn default_cdp_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_page_match() -> Vec<String> {
    vec![
        "music.yandex".to_string(),
        "Music".to_string(),
        "Музыка".to_string(),
    ]
}

fn default_reconnect_interval() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    5000
}

/// Change notifier polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_observer_interval")]
    pub interval_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_observer_interval(),
        }
    }
}

impl ObserverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_observer_interval() -> u64 {
    100
}

/// Connection to the Stream Deck host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Consecutive connection failures tolerated before shutting down.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl HostConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    3000
}

/// Remote token validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_check_url")]
    pub check_url: String,

    #[serde(default = "default_token_timeout")]
    pub timeout_ms: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            check_url: default_check_url(),
            timeout_ms: default_token_timeout(),
        }
    }
}

impl TokenConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_check_url() -> String {
    "http://localhost:8000/check_token".to_string()
}

fn default_token_timeout() -> u64 {
    5000
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotated files kept on disk.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".ymdeck").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".ymdeck/logs"))
}

fn default_file_prefix() -> String {
    "ymdeck".to_string()
}

fn default_max_files() -> usize {
    7
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
