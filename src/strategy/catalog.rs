//! Yield catalog builder: filters raw feed records down to ranked candidates.

use crate::config::FeedConfig;
use crate::feed::RawPool;
use crate::strategy::classifier::TokenClassifier;
use crate::strategy::types::YieldRecord;
use crate::tokens::resolve_token_address;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{info, instrument, trace, warn};

/// Reasons for rejecting a pool during catalog building.
#[derive(Debug, Clone, Copy)]
enum RejectReason {
    WrongNetwork,
    NotStable,
    UnrecognizedSymbol,
    LowTvl,
    ApyAboveCeiling,
    MissingData,
}

/// Builds the ranked yield catalog for one network.
pub struct CatalogBuilder {
    network: String,
    min_tvl_usd: Decimal,
    max_apy: Decimal,
    classifier: TokenClassifier,
}

impl CatalogBuilder {
    pub fn new(network: &str, min_tvl_usd: Decimal, max_apy: Decimal) -> Self {
        Self {
            network: network.to_string(),
            min_tvl_usd,
            max_apy,
            classifier: TokenClassifier::default(),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(&config.network, config.min_tvl_usd, config.max_apy)
    }

    /// Use a custom symbol allow-list.
    pub fn with_classifier(mut self, classifier: TokenClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Filter raw pools to stable USD lending records on the target network.
    ///
    /// Output keeps feed order. Records whose receipt token address cannot be
    /// resolved are kept: they rank normally but cannot be swap targets.
    #[instrument(skip_all, fields(network = %self.network))]
    pub fn build_catalog(&self, pools: &[RawPool]) -> Vec<YieldRecord> {
        let mut rejected_network = 0usize;
        let mut rejected_not_stable = 0usize;
        let mut rejected_symbol = 0usize;
        let mut rejected_low_tvl = 0usize;
        let mut rejected_high_apy = 0usize;
        let mut rejected_missing_data = 0usize;

        let catalog: Vec<YieldRecord> = pools
            .iter()
            .filter_map(|pool| match self.qualify_pool(pool) {
                Ok(record) => Some(record),
                Err(reason) => {
                    match reason {
                        RejectReason::WrongNetwork => rejected_network += 1,
                        RejectReason::NotStable => rejected_not_stable += 1,
                        RejectReason::UnrecognizedSymbol => rejected_symbol += 1,
                        RejectReason::LowTvl => rejected_low_tvl += 1,
                        RejectReason::ApyAboveCeiling => rejected_high_apy += 1,
                        RejectReason::MissingData => rejected_missing_data += 1,
                    }
                    None
                }
            })
            .collect();

        let unresolved = catalog.iter().filter(|r| !r.is_tradeable()).count();
        info!(
            total_scanned = pools.len(),
            qualified = catalog.len(),
            unresolved_addresses = unresolved,
            rejected_network,
            rejected_not_stable,
            rejected_symbol,
            rejected_low_tvl,
            rejected_high_apy,
            rejected_missing_data,
            "Yield catalog built"
        );

        catalog
    }

    fn qualify_pool(&self, pool: &RawPool) -> Result<YieldRecord, RejectReason> {
        if !pool.chain.eq_ignore_ascii_case(&self.network) {
            return Err(RejectReason::WrongNetwork);
        }

        if !pool.stablecoin {
            return Err(RejectReason::NotStable);
        }

        // Stable-flagged EUR and other non-USD assets fall out here
        if !self.classifier.contains_stable_symbol(&pool.symbol) {
            trace!(pool = %pool.pool, symbol = %pool.symbol, "Symbol not in USD-stable set");
            return Err(RejectReason::UnrecognizedSymbol);
        }

        let tvl_usd = finite_decimal(pool.tvl_usd).ok_or(RejectReason::MissingData)?;
        let apy = finite_decimal(pool.apy).ok_or(RejectReason::MissingData)?;

        if tvl_usd < self.min_tvl_usd {
            trace!(pool = %pool.pool, %tvl_usd, "TVL below threshold");
            return Err(RejectReason::LowTvl);
        }

        if apy > self.max_apy {
            trace!(pool = %pool.pool, %apy, "APY above ceiling");
            return Err(RejectReason::ApyAboveCeiling);
        }

        let token_address = resolve_token_address(&pool.project, &pool.symbol).map(String::from);

        Ok(YieldRecord {
            pool_id: pool.pool.clone(),
            token_symbol: pool.symbol.clone(),
            protocol_id: pool.project.clone(),
            apy,
            tvl_usd,
            token_address,
        })
    }
}

fn finite_decimal(value: Option<f64>) -> Option<Decimal> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .and_then(Decimal::from_f64)
}

/// Sort records by APY, highest first.
///
/// Stable: equal APYs keep their catalog order, with no
/// secondary key.
pub fn rank_by_apy(records: &[YieldRecord]) -> Vec<YieldRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.apy.cmp(&a.apy));
    ranked
}

/// First record in `ranked` with a resolved token address.
///
/// When nothing is tradeable the top-ranked record is returned anyway with
/// its address unset, so the run reports the best yield it could not reach.
pub fn select_top_tradeable(ranked: &[YieldRecord]) -> Option<YieldRecord> {
    if let Some(record) = ranked.iter().find(|r| r.is_tradeable()) {
        return Some(record.clone());
    }

    let fallback = ranked.first()?.clone();
    warn!(
        pool = %fallback.pool_id,
        protocol = %fallback.protocol_id,
        symbol = %fallback.token_symbol,
        apy = %fallback.apy,
        "No tradeable record in catalog; best yield has no known token address"
    );
    Some(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool(chain: &str, project: &str, symbol: &str, tvl: f64, apy: f64) -> RawPool {
        RawPool {
            pool: format!("{}-{}-{}", chain, project, symbol),
            chain: chain.to_string(),
            project: project.to_string(),
            symbol: symbol.to_string(),
            tvl_usd: Some(tvl),
            apy: Some(apy),
            stablecoin: true,
            underlying_tokens: None,
        }
    }

    fn builder() -> CatalogBuilder {
        CatalogBuilder::new("Base", dec!(100000), dec!(25.0))
    }

    fn record(pool_id: &str, apy: Decimal, address: Option<&str>) -> YieldRecord {
        YieldRecord {
            pool_id: pool_id.to_string(),
            token_symbol: "USDC".to_string(),
            protocol_id: "p".to_string(),
            apy,
            tvl_usd: dec!(1_000_000),
            token_address: address.map(String::from),
        }
    }

    #[test]
    fn test_keeps_qualifying_pool() {
        let catalog = builder().build_catalog(&[pool("Base", "moonwell", "USDC", 7_500_000.0, 6.5)]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].apy, dec!(6.5));
        assert_eq!(catalog[0].tvl_usd, dec!(7500000));
        assert_eq!(
            catalog[0].token_address.as_deref(),
            Some("0xEdc817A28E8B93B03976FBd4a3dDBc9f7D176c22")
        );
    }

    #[test]
    fn test_filters_each_condition() {
        let mut not_stable = pool("Base", "aave-v3", "USDC", 1e7, 5.0);
        not_stable.stablecoin = false;
        let mut missing_apy = pool("Base", "aave-v3", "USDC", 1e7, 5.0);
        missing_apy.apy = None;

        let pools = vec![
            pool("Ethereum", "aave-v3", "USDC", 1e7, 5.0),
            not_stable,
            pool("Base", "aave-v3", "EURC", 1e7, 5.0),
            pool("Base", "aave-v3", "USDC", 99_999.0, 5.0),
            pool("Base", "aave-v3", "USDC", 1e7, 25.01),
            missing_apy,
            pool("Base", "aave-v3", "USDC", 1e7, f64::NAN),
        ];

        assert!(builder().build_catalog(&pools).is_empty());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let catalog = builder().build_catalog(&[
            pool("Base", "aave-v3", "USDC", 100_000.0, 5.0),
            pool("Base", "aave-v3", "USDC", 1e7, 25.0),
        ]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_catalog_invariants() {
        let pools = vec![
            pool("Base", "aave-v3", "USDC", 1e7, 5.5),
            pool("base", "compound-v3", "USDbC", 2e6, 4.0),
            pool("Base", "morpho-blue", "USDC-DAI", 5e5, 8.0),
            pool("Arbitrum", "aave-v3", "USDT", 1e8, 7.0),
            pool("Base", "aave-v3", "GHO", 1e7, 9.0),
            pool("Base", "seamless", "USDC", 3e4, 12.0),
            pool("Base", "extra-finance", "USDC", 1e6, 80.0),
        ];
        let builder = builder();
        let classifier = TokenClassifier::default();

        let catalog = builder.build_catalog(&pools);
        assert_eq!(catalog.len(), 3);
        for record in &catalog {
            assert!(record.tvl_usd >= dec!(100000));
            assert!(record.apy <= dec!(25.0));
            assert!(classifier.contains_stable_symbol(&record.token_symbol));
        }
    }

    #[test]
    fn test_unresolvable_address_is_retained() {
        let catalog = builder().build_catalog(&[pool("Base", "morpho-blue", "USDC", 1e7, 9.0)]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog[0].token_address.is_none());
    }

    #[test]
    fn test_rank_by_apy_descending_and_stable() {
        let records = vec![
            record("a", dec!(4.0), None),
            record("b", dec!(6.0), None),
            record("c", dec!(4.0), None),
            record("d", dec!(6.0), None),
        ];

        let ranked = rank_by_apy(&records);
        let ids: Vec<&str> = ranked.iter().map(|r| r.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].apy >= pair[1].apy);
        }
        assert_eq!(records[0].pool_id, "a");
    }

    #[test]
    fn test_select_top_tradeable_skips_unresolved() {
        let ranked = vec![
            record("untradeable", dec!(9.0), None),
            record("tradeable", dec!(6.0), Some("0xA")),
        ];
        let top = select_top_tradeable(&ranked).unwrap();
        assert_eq!(top.pool_id, "tradeable");
    }

    #[test]
    fn test_select_top_tradeable_falls_back_to_best() {
        let ranked = vec![record("best", dec!(9.0), None), record("next", dec!(6.0), None)];
        let top = select_top_tradeable(&ranked).unwrap();
        assert_eq!(top.pool_id, "best");
        assert!(top.token_address.is_none());
    }

    #[test]
    fn test_select_top_tradeable_empty() {
        assert!(select_top_tradeable(&[]).is_none());
    }
}
