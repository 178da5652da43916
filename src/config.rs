use crate::error::ConfigError;
use crate::http_client::{HttpClientConfig, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILE: &str = "config.toml";

/// Accepted range for `[http] timeout_secs`
pub const MIN_TIMEOUT_SECS: u64 = 20;
pub const MAX_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Per-source overrides keyed by source id
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Timeout for a single request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Redirects followed before giving up
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Retries on rate limiting, 5xx and connection failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,

    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept self-signed or otherwise invalid certificates
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_true")]
    pub enable_cookies: bool,

    /// Enable gzip/brotli compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Upper bound on adapter operations running at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    pub base_url: Option<String>,
}

fn default_true() -> bool { true }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_max_redirects() -> usize { 5 }
fn default_max_retries() -> usize { 2 }
fn default_initial_retry_delay() -> u64 { 500 }
fn default_max_retry_delay() -> u64 { 4000 }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_max_concurrent() -> usize { 16 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
            user_agent: default_user_agent(),
            accept_invalid_certs: true,
            enable_cookies: true,
            enable_compression: true,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults
    /// when the file is missing or malformed.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{}, using default configuration", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Base URL override for a source, if one is configured
    pub fn base_url_for(&self, source_id: &str) -> Option<&str> {
        self.sources
            .get(source_id)
            .and_then(|s| s.base_url.as_deref())
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }
}

impl HttpConfig {
    /// Request timeout, clamped to 20-30 seconds
    pub fn timeout(&self) -> Duration {
        let secs = self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        if secs != self.timeout_secs {
            log::warn!(
                "timeout_secs = {} is outside {}-{}, using {}",
                self.timeout_secs,
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS,
                secs
            );
        }
        Duration::from_secs(secs)
    }

    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.timeout(),
            max_redirects: self.max_redirects,
            max_retries: self.max_retries,
            initial_retry_delay_ms: self.initial_retry_delay_ms,
            max_retry_delay_ms: self.max_retry_delay_ms,
            user_agent: self.user_agent.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            enable_cookies: self.enable_cookies,
            enable_gzip: self.enable_compression,
        }
    }
}
