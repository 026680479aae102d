//! Domain types flowing through catalog building, matching and planning.

use crate::strategy::classifier::TokenClassifier;
use crate::utils::decimal::{annual_gain, from_base_units};
use crate::wallet::AccountHoldings;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// One lending opportunity on the target network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldRecord {
    /// Opaque source identifier, unique per record
    pub pool_id: String,
    /// Display symbol, not unique across protocols
    pub token_symbol: String,
    pub protocol_id: String,
    /// Annualized yield in percent
    pub apy: Decimal,
    pub tvl_usd: Decimal,
    /// Receipt token address; `None` means the record cannot be a swap target
    pub token_address: Option<String>,
}

impl YieldRecord {
    pub fn is_tradeable(&self) -> bool {
        self.token_address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// One account's balance in one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub token_symbol: String,
    pub token_address: Option<String>,
    /// Balance in smallest units
    pub raw_balance: u128,
    pub decimals: u8,
    /// Estimated USD value. Equal to the human balance for recognized
    /// stable tokens, zero otherwise.
    pub usd_value: Decimal,
}

impl Holding {
    /// Build a holding, valuing recognized stable tokens at par.
    pub fn new(
        token_symbol: &str,
        token_address: Option<String>,
        raw_balance: u128,
        decimals: u8,
        classifier: &TokenClassifier,
    ) -> Self {
        let usd_value = if classifier.is_stable(token_symbol) {
            from_base_units(raw_balance, decimals).unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        Self {
            token_symbol: token_symbol.to_string(),
            token_address: token_address.filter(|a| !a.is_empty()),
            raw_balance,
            decimals,
            usd_value,
        }
    }

    /// Human-readable balance.
    pub fn balance(&self) -> Decimal {
        from_base_units(self.raw_balance, self.decimals).unwrap_or(Decimal::ZERO)
    }
}

/// A holding with its current yield resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedHolding {
    pub holding: Holding,
    /// Current APY in percent; zero when unmatched
    pub current_apy: Decimal,
    pub matched_record: Option<YieldRecord>,
}

impl MatchedHolding {
    pub fn unmatched(holding: Holding) -> Self {
        Self {
            holding,
            current_apy: Decimal::ZERO,
            matched_record: None,
        }
    }

    pub fn matched(holding: Holding, record: YieldRecord) -> Self {
        Self {
            holding,
            current_apy: record.apy,
            matched_record: Some(record),
        }
    }

    pub fn has_yield_match(&self) -> bool {
        self.matched_record.is_some()
    }

    /// Protocol of the matched record, if any.
    pub fn protocol_id(&self) -> Option<&str> {
        self.matched_record.as_ref().map(|r| r.protocol_id.as_str())
    }
}

/// One managed wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub account_id: String,
    pub wallet_address: String,
    pub holdings: Vec<Holding>,
}

impl Account {
    /// Convert a wallet API response, skipping balances that do not parse.
    pub fn from_wallet(wire: AccountHoldings, classifier: &TokenClassifier) -> Self {
        let account_id = wire.account_id;
        let holdings = wire
            .tokens
            .into_iter()
            .filter_map(|token| match token.balance.trim().parse::<u128>() {
                Ok(raw) => Some(Holding::new(
                    &token.symbol,
                    token.address,
                    raw,
                    token.decimals,
                    classifier,
                )),
                Err(e) => {
                    warn!(
                        account = %account_id,
                        symbol = %token.symbol,
                        balance = %token.balance,
                        error = %e,
                        "Skipping unparseable balance"
                    );
                    None
                }
            })
            .collect();

        Self {
            account_id,
            wallet_address: wire.address,
            holdings,
        }
    }

    /// Holdings that can take part in a rotation: recognized stable tokens,
    /// plain or yield-bearing.
    pub fn eligible_holdings<'a>(
        &'a self,
        classifier: &'a TokenClassifier,
    ) -> impl Iterator<Item = &'a Holding> + 'a {
        self.holdings
            .iter()
            .filter(move |h| classifier.is_stable(&h.token_symbol))
    }
}

/// An account whose holdings have been matched against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedAccount {
    pub account_id: String,
    pub wallet_address: String,
    pub holdings: Vec<MatchedHolding>,
}

/// A proposed swap of one holding into the top-ranked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationRecommendation {
    pub account_id: String,
    pub source: MatchedHolding,
    pub target: YieldRecord,
    /// `target.apy - source.current_apy`
    pub apy_improvement: Decimal,
}

impl RotationRecommendation {
    pub fn new(account_id: &str, source: MatchedHolding, target: YieldRecord) -> Self {
        let apy_improvement = target.apy - source.current_apy;
        Self {
            account_id: account_id.to_string(),
            source,
            target,
            apy_improvement,
        }
    }

    /// Expected extra yield per year, in USD.
    pub fn estimated_annual_gain_usd(&self) -> Decimal {
        annual_gain(self.source.holding.usd_value, self.apy_improvement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::TokenBalance;
    use rust_decimal_macros::dec;

    fn record(apy: Decimal) -> YieldRecord {
        YieldRecord {
            pool_id: "pool".to_string(),
            token_symbol: "USDC".to_string(),
            protocol_id: "moonwell".to_string(),
            apy,
            tvl_usd: dec!(7_500_000),
            token_address: Some("0xA".to_string()),
        }
    }

    #[test]
    fn test_stable_holding_valued_at_par() {
        let classifier = TokenClassifier::default();
        let usdc = Holding::new("USDC", None, 1_234_560_000, 6, &classifier);
        assert_eq!(usdc.usd_value, dec!(1234.56));

        let weth = Holding::new("WETH", None, 1_000_000_000_000_000_000, 18, &classifier);
        assert_eq!(weth.usd_value, Decimal::ZERO);
        assert_eq!(weth.balance(), dec!(1));
    }

    #[test]
    fn test_empty_address_is_absent() {
        let holding = Holding::new("USDC", Some(String::new()), 1, 6, &TokenClassifier::default());
        assert!(holding.token_address.is_none());
    }

    #[test]
    fn test_account_from_wallet_skips_bad_balances() {
        let wire = AccountHoldings {
            account_id: "acct-1".to_string(),
            address: "0xabc".to_string(),
            tokens: vec![
                TokenBalance {
                    symbol: "USDC".to_string(),
                    address: Some("0xusdc".to_string()),
                    balance: "1000000".to_string(),
                    decimals: 6,
                },
                TokenBalance {
                    symbol: "DAI".to_string(),
                    address: None,
                    balance: "12.5".to_string(),
                    decimals: 18,
                },
            ],
        };

        let account = Account::from_wallet(wire, &TokenClassifier::default());
        assert_eq!(account.holdings.len(), 1);
        assert_eq!(account.holdings[0].usd_value, dec!(1));
        assert_eq!(account.wallet_address, "0xabc");
    }

    #[test]
    fn test_eligible_holdings() {
        let classifier = TokenClassifier::default();
        let account = Account {
            account_id: "acct-1".to_string(),
            wallet_address: "0xabc".to_string(),
            holdings: vec![
                Holding::new("USDC", None, 1, 6, &classifier),
                Holding::new("mUSDC", None, 1, 8, &classifier),
                Holding::new("WETH", None, 1, 18, &classifier),
                Holding::new("EURC", None, 1, 6, &classifier),
            ],
        };

        let symbols: Vec<&str> = account
            .eligible_holdings(&classifier)
            .map(|h| h.token_symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["USDC", "mUSDC"]);
    }

    #[test]
    fn test_recommendation_gain_is_derived() {
        let classifier = TokenClassifier::default();
        let source = MatchedHolding::matched(
            Holding::new("aBasUSDC", None, 1_000_000_000, 6, &classifier),
            YieldRecord {
                apy: dec!(5.0),
                ..record(dec!(5.0))
            },
        );

        let rec = RotationRecommendation::new("acct-1", source, record(dec!(6.5)));
        assert_eq!(rec.apy_improvement, dec!(1.5));
        assert_eq!(rec.estimated_annual_gain_usd(), dec!(15));
    }

    #[test]
    fn test_tradeable_requires_address() {
        assert!(record(dec!(1)).is_tradeable());
        let untradeable = YieldRecord {
            token_address: None,
            ..record(dec!(1))
        };
        assert!(!untradeable.is_tradeable());
    }
}
