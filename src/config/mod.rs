//! Configuration management for the yield rotator.
//!
//! Loads settings from an optional config file and `ROTATOR_*` environment
//! variables. Every field has a default so an empty environment is valid.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Yield feed source and catalog filters
    #[serde(default)]
    pub feed: FeedConfig,
    /// Rotation decision thresholds
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Wallet-management API access
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Endpoint returning the list of pool records
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Network name as reported by the feed (e.g., "Base")
    #[serde(default = "default_network")]
    pub network: String,
    /// Numeric chain id passed to the wallet API
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Minimum pool liquidity in USD
    #[serde(default = "default_min_tvl_usd")]
    pub min_tvl_usd: Decimal,
    /// APY ceiling in percent; anything above is treated as incentivized noise
    #[serde(default = "default_max_apy")]
    pub max_apy: Decimal,
    /// Total fetch attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay unit between attempts; attempt n waits n * retry_delay_ms
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// HTTP timeout in seconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Minimum APY gain (percentage points) to justify a swap
    #[serde(default = "default_min_apy_improvement")]
    pub min_apy_improvement: Decimal,
    /// Holdings worth less than this (USD) are never rotated
    #[serde(default = "default_min_balance_usd")]
    pub min_balance_usd: Decimal,
    /// Maximum slippage tolerance in percent
    #[serde(default = "default_max_slippage_pct")]
    pub max_slippage_pct: Decimal,
    /// Share of the source holding to sell, in percent
    #[serde(default = "default_sell_percentage")]
    pub sell_percentage: Decimal,
    /// Preview swaps without executing them
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Base URL of the wallet-management API
    #[serde(default = "default_wallet_base_url")]
    pub base_url: String,
    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,
    /// Secret used to sign requests
    #[serde(default)]
    pub api_secret: String,
    /// Transaction status poll interval
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Give up waiting for a transaction after this many seconds
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// HTTP timeout in seconds
    #[serde(default = "default_wallet_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default verbosity (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
    /// Directory for the rolling log file
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

// Default value functions
fn default_feed_url() -> String {
    "https://yields.llama.fi/pools".to_string()
}

fn default_network() -> String {
    "Base".to_string()
}

fn default_chain_id() -> u64 {
    8453
}

fn default_min_tvl_usd() -> Decimal {
    Decimal::new(100_000, 0) // $100k
}

fn default_max_apy() -> Decimal {
    Decimal::new(250, 1) // 25.0%
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_feed_timeout() -> u64 {
    30
}

fn default_min_apy_improvement() -> Decimal {
    Decimal::new(5, 1) // 0.5 percentage points
}

fn default_min_balance_usd() -> Decimal {
    Decimal::new(10, 0) // $10
}

fn default_max_slippage_pct() -> Decimal {
    Decimal::new(10, 1) // 1.0%
}

fn default_sell_percentage() -> Decimal {
    Decimal::new(100, 0)
}

fn default_wallet_base_url() -> String {
    "https://api.wallet-service.example/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_poll_timeout_secs() -> u64 {
    120
}

fn default_wallet_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

impl Config {
    /// Load configuration from environment variables and config files.
    ///
    /// `path` overrides the default `rotator` config file name.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("rotator").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::default()
                    .prefix("ROTATOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.feed.network.is_empty(), "feed.network must not be empty");

        anyhow::ensure!(
            self.feed.max_apy > Decimal::ZERO,
            "feed.max_apy must be positive"
        );

        anyhow::ensure!(
            self.feed.min_tvl_usd >= Decimal::ZERO,
            "feed.min_tvl_usd must not be negative"
        );

        anyhow::ensure!(self.feed.max_attempts >= 1, "feed.max_attempts must be >= 1");

        anyhow::ensure!(
            self.rotation.min_apy_improvement >= Decimal::ZERO
                && self.rotation.min_balance_usd >= Decimal::ZERO,
            "rotation thresholds must not be negative"
        );

        anyhow::ensure!(
            self.rotation.max_slippage_pct > Decimal::ZERO
                && self.rotation.max_slippage_pct <= Decimal::ONE_HUNDRED,
            "max_slippage_pct must be between 0 and 100"
        );

        anyhow::ensure!(
            self.rotation.sell_percentage > Decimal::ZERO
                && self.rotation.sell_percentage <= Decimal::ONE_HUNDRED,
            "sell_percentage must be between 0 and 100"
        );

        anyhow::ensure!(
            self.rotation.dry_run
                || (!self.wallet.api_key.is_empty() && !self.wallet.api_secret.is_empty()),
            "wallet.api_key and wallet.api_secret are required unless dry_run is set"
        );

        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            network: default_network(),
            chain_id: default_chain_id(),
            min_tvl_usd: default_min_tvl_usd(),
            max_apy: default_max_apy(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_feed_timeout(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            min_apy_improvement: default_min_apy_improvement(),
            min_balance_usd: default_min_balance_usd(),
            max_slippage_pct: default_max_slippage_pct(),
            sell_percentage: default_sell_percentage(),
            dry_run: false,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            base_url: default_wallet_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
            timeout_secs: default_wallet_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: default_log_directory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dry_run_config() -> Config {
        let mut config = Config::default();
        config.rotation.dry_run = true;
        config
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.feed.network, "Base");
        assert_eq!(config.feed.min_tvl_usd, dec!(100000));
        assert_eq!(config.feed.max_apy, dec!(25.0));
        assert_eq!(config.rotation.min_apy_improvement, dec!(0.5));
        assert_eq!(config.rotation.min_balance_usd, dec!(10));
        assert_eq!(config.rotation.max_slippage_pct, dec!(1.0));
        assert!(!config.rotation.dry_run);
    }

    #[test]
    fn test_dry_run_config_is_valid_without_credentials() {
        assert!(dry_run_config().validate().is_ok());
    }

    #[test]
    fn test_live_config_requires_credentials() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.wallet.api_key = "key".to_string();
        config.wallet.api_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_slippage() {
        let mut config = dry_run_config();
        config.rotation.max_slippage_pct = dec!(0);
        assert!(config.validate().is_err());

        config.rotation.max_slippage_pct = dec!(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut config = dry_run_config();
        config.feed.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_prefixed_environment() {
        std::env::set_var("ROTATOR_ROTATION__MIN_APY_IMPROVEMENT", "0.75");
        std::env::set_var("ROTATOR_ROTATION__DRY_RUN", "true");

        let config = Config::load(None).unwrap();

        std::env::remove_var("ROTATOR_ROTATION__MIN_APY_IMPROVEMENT");
        std::env::remove_var("ROTATOR_ROTATION__DRY_RUN");

        assert_eq!(config.rotation.min_apy_improvement, dec!(0.75));
        assert!(config.rotation.dry_run);
        assert_eq!(config.rotation.min_balance_usd, dec!(10));
    }

    #[test]
    fn test_empty_sections_deserialize_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"rotation": {"dry_run": true}}"#).unwrap();
        assert!(config.rotation.dry_run);
        assert_eq!(config.rotation.min_balance_usd, dec!(10));
        assert_eq!(config.feed.chain_id, 8453);
    }
}
