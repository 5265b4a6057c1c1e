use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER};
use thiserror::Error;

use crate::types::{FetchOutcome, FetchReport};

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/126.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Attempts per fetch, counting the first one.
    pub max_retries: u32,
    /// First backoff step after a rate-limit response, in seconds.
    pub backoff_base: f64,
    /// Ceiling for the exponential backoff, in seconds.
    pub backoff_cap: f64,
    /// Uniform jitter added on top of each backoff wait, in seconds.
    pub backoff_jitter_min: f64,
    pub backoff_jitter_max: f64,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub referer: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_retries: 7,
            backoff_base: 4.0,
            backoff_cap: 90.0,
            backoff_jitter_min: 1.0,
            backoff_jitter_max: 4.0,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(40),
            referer: "https://www.liverpool.com.mx/".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("http client setup failed: {0}")]
    Client(String),
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one URL to a terminal outcome. Network and HTTP-level
    /// trouble is absorbed by the retry loop; only setup-class problems
    /// surface as errors.
    async fn fetch(&self, url: &str) -> Result<FetchReport, FetchError>;
}

/// Seconds to wait after a network-level failure on `attempt` (0-based).
pub fn network_retry_wait(attempt: u32) -> f64 {
    2.0 + attempt as f64 * 1.25
}

/// Seconds to wait after an unexpected HTTP status on `attempt` (0-based).
pub fn transient_retry_wait(attempt: u32) -> f64 {
    1.5 + attempt as f64 * 0.5
}

/// Exponential backoff after a rate-limit response, before jitter.
pub fn pushback_backoff(attempt: u32, base: f64, cap: f64) -> f64 {
    (base * 2f64.powi(attempt as i32)).min(cap)
}

/// Fetcher over one configured `reqwest` client, with bounded retries:
/// 200/404 are terminal, 429/403 back off exponentially and mark pushback,
/// anything else retries on a short fixed schedule.
pub struct PdpFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl PdpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-MX,es;q=0.9,en;q=0.8"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Ok(value) = HeaderValue::from_str(&settings.referer) {
            headers.insert(REFERER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;

        Ok(Self { client, settings })
    }

    fn backoff_jitter(&self) -> f64 {
        let mut rng = rand::rng();
        rng.random_range(self.settings.backoff_jitter_min..=self.settings.backoff_jitter_max)
    }

    async fn wait(&self, seconds: f64) {
        if seconds > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for PdpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchReport, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|err| FetchError::InvalidUrl {
            url: url.to_string(),
            message: err.to_string(),
        })?;

        let max_retries = self.settings.max_retries;
        let mut pushback = false;
        let mut last_status: Option<u16> = None;
        let mut attempts = 0u32;

        for attempt in 0..max_retries {
            attempts = attempt + 1;
            let retries_left = attempts < max_retries;

            let response = match self.client.get(parsed.clone()).send().await {
                Ok(response) => response,
                Err(err) => {
                    let wait = network_retry_wait(attempt);
                    log::warn!(
                        "network error on {url}: {err}; waiting {wait:.1}s (retry {attempts}/{max_retries})"
                    );
                    if retries_left {
                        self.wait(wait).await;
                    }
                    continue;
                }
            };

            let status = response.status().as_u16();
            last_status = Some(status);

            match status {
                200 => match response.text().await {
                    Ok(body) => {
                        return Ok(FetchReport {
                            outcome: FetchOutcome::Success { body },
                            pushback,
                            attempts,
                        })
                    }
                    // The connection dropped mid-body; same handling as a
                    // failed send.
                    Err(err) => {
                        let wait = network_retry_wait(attempt);
                        log::warn!(
                            "body read failed on {url}: {err}; waiting {wait:.1}s (retry {attempts}/{max_retries})"
                        );
                        if retries_left {
                            self.wait(wait).await;
                        }
                    }
                },
                404 => {
                    return Ok(FetchReport {
                        outcome: FetchOutcome::NotFound,
                        pushback,
                        attempts,
                    })
                }
                429 | 403 => {
                    pushback = true;
                    let wait = pushback_backoff(
                        attempt,
                        self.settings.backoff_base,
                        self.settings.backoff_cap,
                    ) + self.backoff_jitter();
                    log::warn!(
                        "HTTP {status} on {url} -> backoff {wait:.1}s (retry {attempts}/{max_retries})"
                    );
                    if retries_left {
                        self.wait(wait).await;
                    }
                }
                _ => {
                    let wait = transient_retry_wait(attempt);
                    log::warn!(
                        "HTTP {status} on {url}; waiting {wait:.1}s (retry {attempts}/{max_retries})"
                    );
                    if retries_left {
                        self.wait(wait).await;
                    }
                }
            }
        }

        log::error!("giving up on {url} after {attempts} attempts (last status {last_status:?})");
        Ok(FetchReport {
            outcome: FetchOutcome::Failed { last_status },
            pushback,
            attempts,
        })
    }
}
