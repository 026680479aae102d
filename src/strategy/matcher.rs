//! Holding matcher: resolves the APY each holding currently earns.
//!
//! Matching priority per holding:
//! 1. Token address found in the catalog (authoritative)
//! 2. Yield-bearing symbol (prefix + stable base) found in the catalog,
//!    taking the highest-APY candidate
//! 3. No match: the holding earns 0%
//!
//! Plain base symbols never match by symbol. An idle USDC balance is not
//! deposited anywhere regardless of what the catalog offers for USDC.

use crate::strategy::classifier::TokenClassifier;
use crate::strategy::types::{Account, Holding, MatchedAccount, MatchedHolding, YieldRecord};
use std::collections::HashMap;
use tracing::{debug, trace};

/// How a holding was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Address,
    Symbol,
    None,
}

/// Lookup indexes over one catalog.
pub struct HoldingMatcher<'a> {
    by_address: HashMap<String, &'a YieldRecord>,
    by_symbol: HashMap<String, Vec<&'a YieldRecord>>,
    classifier: &'a TokenClassifier,
}

impl<'a> HoldingMatcher<'a> {
    /// Index `catalog` by lowercase address (last write wins) and lowercase
    /// symbol (all records kept, in catalog order).
    pub fn new(catalog: &'a [YieldRecord], classifier: &'a TokenClassifier) -> Self {
        let mut by_address = HashMap::new();
        let mut by_symbol: HashMap<String, Vec<&'a YieldRecord>> = HashMap::new();

        for record in catalog {
            if let Some(address) = record.token_address.as_deref().filter(|a| !a.is_empty()) {
                by_address.insert(address.to_lowercase(), record);
            }
            by_symbol
                .entry(record.token_symbol.to_lowercase())
                .or_default()
                .push(record);
        }

        Self {
            by_address,
            by_symbol,
            classifier,
        }
    }

    /// Resolve one holding.
    pub fn match_holding(&self, holding: &Holding) -> (MatchedHolding, MatchKind) {
        if let Some(record) = self.match_by_address(holding) {
            return (
                MatchedHolding::matched(holding.clone(), record.clone()),
                MatchKind::Address,
            );
        }

        if let Some(record) = self.match_by_symbol(holding) {
            return (
                MatchedHolding::matched(holding.clone(), record.clone()),
                MatchKind::Symbol,
            );
        }

        (MatchedHolding::unmatched(holding.clone()), MatchKind::None)
    }

    /// Resolve every holding, returning new values in input order.
    pub fn match_holdings(&self, holdings: &[Holding]) -> Vec<MatchedHolding> {
        holdings
            .iter()
            .map(|h| {
                let (matched, kind) = self.match_holding(h);
                trace!(
                    symbol = %h.token_symbol,
                    kind = ?kind,
                    current_apy = %matched.current_apy,
                    "Holding matched"
                );
                matched
            })
            .collect()
    }

    /// Resolve an account's rotation-eligible holdings.
    pub fn match_account(&self, account: &Account) -> MatchedAccount {
        let eligible: Vec<Holding> = account
            .eligible_holdings(self.classifier)
            .cloned()
            .collect();
        let holdings = self.match_holdings(&eligible);

        debug!(
            account = %account.account_id,
            total_holdings = account.holdings.len(),
            eligible = holdings.len(),
            matched = holdings.iter().filter(|h| h.has_yield_match()).count(),
            "Account holdings matched"
        );

        MatchedAccount {
            account_id: account.account_id.clone(),
            wallet_address: account.wallet_address.clone(),
            holdings,
        }
    }

    fn match_by_address(&self, holding: &Holding) -> Option<&'a YieldRecord> {
        let address = holding.token_address.as_deref().filter(|a| !a.is_empty())?;
        self.by_address.get(&address.to_lowercase()).copied()
    }

    fn match_by_symbol(&self, holding: &Holding) -> Option<&'a YieldRecord> {
        let base = self.classifier.yield_bearing_base(&holding.token_symbol)?;

        // Feeds usually list the base symbol; a few list the receipt symbol
        let candidates = self
            .by_symbol
            .get(&holding.token_symbol.to_lowercase())
            .or_else(|| self.by_symbol.get(&base.to_lowercase()))?;

        candidates
            .iter()
            .copied()
            .reduce(|best, r| if r.apy > best.apy { r } else { best })
    }
}

/// Match holdings against a catalog with the default classifier.
pub fn match_holdings(holdings: &[Holding], catalog: &[YieldRecord]) -> Vec<MatchedHolding> {
    let classifier = TokenClassifier::default();
    HoldingMatcher::new(catalog, &classifier).match_holdings(holdings)
}
