//! Administrative-body listing service client
//!
//! One GET per administration kind, rate limited, with linear-backoff
//! retries on network errors and 5xx responses.

use crate::error::{OrganoError, Result};
use crate::listing::{parse_listing, AdminKind, ListingEntry};
use bdns_common::config::ListingConfig;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("bdns-organos/", env!("CARGO_PKG_VERSION"));

/// Minimum spacing between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Outcome of a single attempt
enum Attempt {
    Done(Vec<ListingEntry>),
    Retry(String),
}

pub struct ListingClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl ListingClient {
    pub fn from_config(config: &ListingConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OrganoError::Fetch(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(config.min_interval_ms)),
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Listing URL for one administration kind
    pub fn listing_url(&self, kind: AdminKind) -> String {
        listing_url(&self.base_url, kind)
    }

    /// Fetch the listing tree of one administration kind
    pub async fn fetch(&self, kind: AdminKind) -> Result<Vec<ListingEntry>> {
        let url = self.listing_url(kind);
        let mut attempt = 0;

        loop {
            self.rate_limiter.wait().await;
            debug!(kind = %kind, url = %url, attempt, "Requesting listing");

            match self.try_fetch(&url).await? {
                Attempt::Done(entries) => {
                    let total: usize = entries.iter().map(ListingEntry::subtree_len).sum();
                    info!(kind = %kind, top_level = entries.len(), total, "Fetched listing");
                    return Ok(entries);
                }
                Attempt::Retry(reason) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_delay * attempt;
                    warn!(
                        kind = %kind,
                        attempt,
                        max_retries = self.max_retries,
                        "Listing request failed ({}), retrying in {:?}",
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Attempt::Retry(reason) => {
                    return Err(OrganoError::Fetch(format!(
                        "{} listing failed after {} attempts: {}",
                        kind,
                        attempt + 1,
                        reason
                    )));
                }
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Attempt> {
        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Retry(e.to_string())),
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Attempt::Done(Vec::new()));
        }
        if status.is_server_error() {
            return Ok(Attempt::Retry(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrganoError::Fetch(format!("HTTP {} from {}: {}", status, url, body)));
        }

        match response.text().await {
            Ok(body) => Ok(Attempt::Done(parse_listing(&body)?)),
            Err(e) => Ok(Attempt::Retry(e.to_string())),
        }
    }
}

/// `{base_url}?vpd=GE&idAdmon={code}`
pub fn listing_url(base_url: &str, kind: AdminKind) -> String {
    format!("{}?vpd=GE&idAdmon={}", base_url.trim_end_matches('?'), kind.code())
}
