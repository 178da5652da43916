use crate::error::FetchError;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{redirect, Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;

/// Desktop Chrome identity; several sources reject requests without one
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the markup fetcher
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_redirects: 5,
            max_retries: 2,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 4000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
            enable_cookies: true,
            enable_gzip: true,
        }
    }
}

/// Fetches raw markup with a fixed browser-like configuration.
///
/// Every failure (timeout, DNS, connection reset, non-2xx final status) comes
/// back as a [`FetchError`]; nothing past this boundary panics.
pub struct HttpFetcher {
    client: Client,
    config: HttpClientConfig,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .default_headers(headers)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Exponential backoff with ±25% jitter, capped at `max_retry_delay_ms`
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let factor = 2u64.saturating_pow(attempt.min(16) as u32);
        let delay_ms = base_delay
            .saturating_mul(factor)
            .min(self.config.max_retry_delay_ms);

        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis((delay_ms as f64 * jitter) as u64)
    }

    /// Fetch `url` and return its body, retrying transient failures.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.calculate_retry_delay(attempt);
                    log::warn!(
                        "{}, retrying in {}ms (attempt {}/{})",
                        e,
                        delay.as_millis(),
                        attempt + 1,
                        self.config.max_retries + 1
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
