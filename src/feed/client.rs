//! Yield feed REST client.

use crate::config::FeedConfig;
use crate::feed::types::{PoolsResponse, RawPool};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Client for the public yield feed. No authentication.
#[derive(Debug, Clone)]
pub struct YieldFeedClient {
    http: Client,
    url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl YieldFeedClient {
    /// Create a new feed client from configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            url: config.url.clone(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Fetch every pool the feed serves, retrying transient failures.
    ///
    /// Attempt `n` that fails waits `n * retry_delay` before the next one.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_pools(&self) -> Result<Vec<RawPool>> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.fetch_once().await {
                Ok(pools) => {
                    info!(attempt, pools = pools.len(), "Fetched yield feed");
                    return Ok(pools);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Yield feed fetch failed"
                    );
                    last_error = Some(e);

                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Unknown error"))
            .context(format!(
                "Yield feed unavailable after {} attempts",
                self.max_attempts
            )))
    }

    async fn fetch_once(&self) -> Result<Vec<RawPool>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch yield feed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yield feed error {}: {}", status, body);
        }

        let data: PoolsResponse = response
            .json()
            .await
            .context("Failed to parse yield feed response")?;

        let pools = data.into_pools();
        debug!("Parsed {} pool records", pools.len());
        Ok(pools)
    }
}
