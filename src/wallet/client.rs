//! Wallet-management REST API client.

use crate::config::WalletConfig;
use crate::wallet::traits::WalletApi;
use crate::wallet::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, RequestBuilder};
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, instrument};

/// Signed client for the wallet-management service.
pub struct WalletApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl WalletApiClient {
    /// Create a new wallet client from configuration.
    pub fn new(config: &WalletConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Generate HMAC-SHA256 signature over `timestamp + method + path + body`.
    fn sign(&self, timestamp: i64, method: &Method, path: &str, body: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(method.as_str().as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Build a signed request for `path` (relative to the base URL).
    fn request(&self, method: Method, path: &str, body: Option<String>) -> RequestBuilder {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let payload = body.unwrap_or_default();
        let signature = self.sign(timestamp, &method, path, &payload);

        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-API-KEY", &self.api_key)
            .header("X-TIMESTAMP", timestamp.to_string())
            .header("X-SIGNATURE", signature);

        if payload.is_empty() {
            builder
        } else {
            builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload)
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Wallet API error on {} {}: {}", what, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl WalletApi for WalletApiClient {
    #[instrument(skip(self))]
    async fn list_holdings(&self, chain_id: u64) -> Result<Vec<AccountHoldings>> {
        let path = format!("/accounts/holdings?chainId={}", chain_id);
        let response: HoldingsResponse = self
            .send(self.request(Method::GET, &path, None), "holdings")
            .await?;

        debug!("Fetched holdings for {} accounts", response.accounts.len());
        Ok(response.accounts)
    }

    #[instrument(skip(self), fields(sell = %request.sell_token, buy = %request.buy_token))]
    async fn preview_swap(&self, request: &SwapRequest) -> Result<SwapPreview> {
        let body = serde_json::to_string(request).context("Failed to encode swap request")?;
        self.send(
            self.request(Method::POST, "/swaps/preview", Some(body)),
            "swap preview",
        )
        .await
    }

    #[instrument(skip(self), fields(sell = %request.sell_token, buy = %request.buy_token))]
    async fn execute_swap(&self, request: &SwapRequest) -> Result<SwapSubmission> {
        let body = serde_json::to_string(request).context("Failed to encode swap request")?;
        self.send(self.request(Method::POST, "/swaps", Some(body)), "swap execute")
            .await
    }

    #[instrument(skip(self))]
    async fn transaction_status(&self, transaction_id: &str) -> Result<TransactionStatus> {
        let path = format!("/transactions/{}", urlencoding::encode(transaction_id));
        self.send(self.request(Method::GET, &path, None), "transaction status")
            .await
    }
}
