//! Type definitions for yield feed responses.

use serde::Deserialize;

/// One pool record as served by the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    /// Opaque pool identifier
    pub pool: String,
    /// Network name (e.g., "Base", "Ethereum")
    pub chain: String,
    /// Protocol identifier (e.g., "aave-v3")
    pub project: String,
    /// Display symbol, sometimes a pair like "USDC-DAI"
    pub symbol: String,
    /// Liquidity depth in USD
    #[serde(default)]
    pub tvl_usd: Option<f64>,
    /// Annualized yield in percent (null for some pools)
    #[serde(default)]
    pub apy: Option<f64>,
    /// Whether the source flags the asset as a stablecoin
    #[serde(default)]
    pub stablecoin: bool,
    /// Underlying token addresses, when reported
    #[serde(default)]
    pub underlying_tokens: Option<Vec<String>>,
}

/// The feed serves either a bare array or a `{status, data}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PoolsResponse {
    Envelope {
        #[serde(default)]
        status: Option<String>,
        data: Vec<RawPool>,
    },
    Bare(Vec<RawPool>),
}

impl PoolsResponse {
    pub fn into_pools(self) -> Vec<RawPool> {
        match self {
            PoolsResponse::Envelope { data, .. } => data,
            PoolsResponse::Bare(pools) => pools,
        }
    }
}
