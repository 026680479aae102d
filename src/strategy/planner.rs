//! Rotation planning: decides which holdings to move into the top record.

use crate::config::RotationConfig;
use crate::strategy::types::{MatchedAccount, RotationRecommendation, YieldRecord};
use crate::utils::decimal::mean;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// APY distance under which a holding on the target's protocol is
/// considered to already be in the target position.
const SAME_POSITION_APY_EPSILON: Decimal = dec!(0.1);

/// Produces rotation recommendations from matched accounts.
pub struct RotationPlanner {
    min_apy_improvement: Decimal,
    min_balance_usd: Decimal,
}

/// Aggregate view over a set of recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RotationSummary {
    pub count: usize,
    pub distinct_accounts: usize,
    pub total_source_usd: Decimal,
    pub total_estimated_annual_gain_usd: Decimal,
    pub average_apy_improvement: Decimal,
}

impl RotationPlanner {
    pub fn new(min_apy_improvement: Decimal, min_balance_usd: Decimal) -> Self {
        Self {
            min_apy_improvement,
            min_balance_usd,
        }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(config.min_apy_improvement, config.min_balance_usd)
    }

    /// Whether moving from `current_apy` to `best_apy` clears the threshold.
    /// The threshold itself qualifies.
    pub fn should_rotate(&self, current_apy: Decimal, best_apy: Decimal) -> bool {
        best_apy - current_apy >= self.min_apy_improvement
    }

    /// Recommend swaps into `top` for every qualifying holding.
    ///
    /// Accounts are expected to carry only rotation-eligible holdings (see
    /// `HoldingMatcher::match_account`). Output follows account and holding
    /// order; use [`prioritize`] to order by gain.
    pub fn plan_rotations(
        &self,
        accounts: &[MatchedAccount],
        top: Option<&YieldRecord>,
    ) -> Vec<RotationRecommendation> {
        let Some(top) = top else {
            debug!("No top record; nothing to rotate into");
            return Vec::new();
        };

        let mut recommendations = Vec::new();

        for account in accounts {
            for holding in &account.holdings {
                let symbol = &holding.holding.token_symbol;

                let already_in_target = holding.protocol_id() == Some(top.protocol_id.as_str())
                    && (holding.current_apy - top.apy).abs() < SAME_POSITION_APY_EPSILON;
                if already_in_target {
                    debug!(
                        account = %account.account_id,
                        %symbol,
                        protocol = %top.protocol_id,
                        "Holding already in target position"
                    );
                    continue;
                }

                if !self.should_rotate(holding.current_apy, top.apy) {
                    debug!(
                        account = %account.account_id,
                        %symbol,
                        current_apy = %holding.current_apy,
                        best_apy = %top.apy,
                        "Improvement below threshold"
                    );
                    continue;
                }

                if holding.holding.usd_value < self.min_balance_usd {
                    debug!(
                        account = %account.account_id,
                        %symbol,
                        usd_value = %holding.holding.usd_value,
                        "Balance below minimum"
                    );
                    continue;
                }

                let recommendation =
                    RotationRecommendation::new(&account.account_id, holding.clone(), top.clone());
                info!(
                    account = %account.account_id,
                    from = %symbol,
                    to_protocol = %top.protocol_id,
                    to_symbol = %top.token_symbol,
                    usd_value = %holding.holding.usd_value,
                    apy_improvement = %recommendation.apy_improvement,
                    annual_gain_usd = %recommendation.estimated_annual_gain_usd().round_dp(2),
                    "Rotation recommended"
                );
                recommendations.push(recommendation);
            }
        }

        recommendations
    }
}

/// New sequence ordered by estimated annual gain, highest first.
pub fn prioritize(recommendations: &[RotationRecommendation]) -> Vec<RotationRecommendation> {
    let mut ordered = recommendations.to_vec();
    ordered.sort_by(|a, b| {
        b.estimated_annual_gain_usd()
            .cmp(&a.estimated_annual_gain_usd())
    });
    ordered
}

/// Summary statistics; all zero for an empty set.
pub fn summarize(recommendations: &[RotationRecommendation]) -> RotationSummary {
    let accounts: HashSet<&str> = recommendations
        .iter()
        .map(|r| r.account_id.as_str())
        .collect();
    let improvements: Vec<Decimal> = recommendations.iter().map(|r| r.apy_improvement).collect();

    RotationSummary {
        count: recommendations.len(),
        distinct_accounts: accounts.len(),
        total_source_usd: recommendations
            .iter()
            .map(|r| r.source.holding.usd_value)
            .sum(),
        total_estimated_annual_gain_usd: recommendations
            .iter()
            .map(|r| r.estimated_annual_gain_usd())
            .sum(),
        average_apy_improvement: mean(&improvements),
    }
}
