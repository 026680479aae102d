//! One end-to-end rotation run.

use crate::config::Config;
use crate::feed::YieldFeedClient;
use crate::strategy::{
    prioritize, rank_by_apy, select_top_tradeable, summarize, Account, CatalogBuilder,
    DispatchConfig, DispatchStatus, HoldingMatcher, MatchedAccount, RotationPlanner,
    RotationSummary, SwapDispatcher, TokenClassifier, YieldRecord,
};
use crate::wallet::{PollSettings, WalletApi};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Result of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub accounts_checked: usize,
    pub holdings_checked: usize,
    pub holdings_matched: usize,
    pub recommendations: usize,
    pub executed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub top_record: Option<YieldRecord>,
    pub summary: RotationSummary,
    /// One line per failed swap, or the reason the run aborted
    pub errors: Vec<String>,
}

/// A run that stopped before dispatch. Carries the summary logged at the
/// point of failure.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct RunAborted {
    pub reason: String,
    pub summary: RunSummary,
}

impl RunSummary {
    /// Process exit code: zero when nothing failed.
    pub fn exit_code(&self) -> u8 {
        if self.failed == 0 && self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// Record a fatal error, log the partial summary and wrap both.
    fn abort(mut self, error: anyhow::Error) -> anyhow::Error {
        let reason = format!("{:#}", error);
        self.errors.push(reason.clone());
        self.log();
        RunAborted {
            reason,
            summary: self,
        }
        .into()
    }

    fn log(&self) {
        info!(
            accounts_checked = self.accounts_checked,
            holdings_checked = self.holdings_checked,
            holdings_matched = self.holdings_matched,
            recommendations = self.recommendations,
            executed = self.executed,
            failed = self.failed,
            skipped = self.skipped,
            dry_run = self.dry_run,
            top_protocol = self.top_record.as_ref().map(|r| r.protocol_id.as_str()).unwrap_or("-"),
            total_source_usd = %self.summary.total_source_usd.round_dp(2),
            estimated_annual_gain_usd = %self.summary.total_estimated_annual_gain_usd.round_dp(2),
            "Rotation run complete"
        );
        for error in &self.errors {
            warn!(error = %error, "Rotation error");
        }
    }
}

/// Wires the feed, catalog, matcher, planner and dispatcher together.
pub struct RotationRunner {
    config: Config,
    feed: YieldFeedClient,
    wallet: Arc<dyn WalletApi>,
    classifier: TokenClassifier,
}

impl RotationRunner {
    pub fn new(config: Config, feed: YieldFeedClient, wallet: Arc<dyn WalletApi>) -> Self {
        Self {
            config,
            feed,
            wallet,
            classifier: TokenClassifier::default(),
        }
    }

    /// Execute one full run.
    ///
    /// Feed exhaustion and holdings-query failures abort with a
    /// [`RunAborted`] error after the partial summary is logged.
    /// Individual swap failures are reported in the summary.
    #[instrument(skip(self), fields(dry_run = self.config.rotation.dry_run))]
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary {
            dry_run: self.config.rotation.dry_run,
            ..RunSummary::default()
        };

        let pools = match self
            .feed
            .fetch_pools()
            .await
            .context("Failed to fetch yield feed")
        {
            Ok(pools) => pools,
            Err(e) => return Err(summary.abort(e)),
        };

        let catalog = CatalogBuilder::from_config(&self.config.feed)
            .with_classifier(self.classifier.clone())
            .build_catalog(&pools);
        let ranked = rank_by_apy(&catalog);
        for (rank, record) in ranked.iter().take(5).enumerate() {
            debug!(
                rank = rank + 1,
                protocol = %record.protocol_id,
                symbol = %record.token_symbol,
                apy = %record.apy,
                tvl_usd = %record.tvl_usd.round_dp(0),
                tradeable = record.is_tradeable(),
                "Catalog entry"
            );
        }

        let Some(top) = select_top_tradeable(&ranked) else {
            warn!(network = %self.config.feed.network, "No qualifying yield records; nothing to do");
            summary.log();
            return Ok(summary);
        };
        info!(
            protocol = %top.protocol_id,
            symbol = %top.token_symbol,
            apy = %top.apy,
            "Top yield selected"
        );
        summary.top_record = Some(top.clone());

        let wire_accounts = match self
            .wallet
            .list_holdings(self.config.feed.chain_id)
            .await
            .context("Failed to list wallet holdings")
        {
            Ok(accounts) => accounts,
            Err(e) => return Err(summary.abort(e)),
        };

        let matcher = HoldingMatcher::new(&catalog, &self.classifier);
        let matched: Vec<MatchedAccount> = wire_accounts
            .into_iter()
            .map(|wire| {
                let account = Account::from_wallet(wire, &self.classifier);
                summary.holdings_checked += account.holdings.len();
                matcher.match_account(&account)
            })
            .collect();

        summary.accounts_checked = matched.len();
        summary.holdings_matched = matched
            .iter()
            .flat_map(|a| &a.holdings)
            .filter(|h| h.has_yield_match())
            .count();
        for account in &matched {
            for holding in &account.holdings {
                info!(
                    account = %account.account_id,
                    symbol = %holding.holding.token_symbol,
                    balance = %holding.holding.balance(),
                    usd_value = %holding.holding.usd_value.round_dp(2),
                    current_apy = %holding.current_apy,
                    protocol = holding.protocol_id().unwrap_or("-"),
                    "Holding"
                );
            }
        }

        let planner = RotationPlanner::from_config(&self.config.rotation);
        let recommendations = prioritize(&planner.plan_rotations(&matched, Some(&top)));
        summary.recommendations = recommendations.len();
        summary.summary = summarize(&recommendations);

        if recommendations.is_empty() {
            info!("All holdings already earn within threshold of the best yield");
            summary.log();
            return Ok(summary);
        }

        let dispatcher = SwapDispatcher::new(
            self.wallet.clone(),
            DispatchConfig::new(
                self.config.feed.chain_id,
                &self.config.rotation,
                PollSettings::new(
                    self.config.wallet.poll_interval_ms,
                    self.config.wallet.poll_timeout_secs,
                ),
            ),
        );
        let report = dispatcher.dispatch(&recommendations).await;

        summary.executed = report.executed();
        summary.failed = report.failed();
        summary.skipped = report.skipped();
        summary.errors = report
            .outcomes
            .iter()
            .filter_map(|o| match &o.status {
                DispatchStatus::Failed(failure) => Some(format!(
                    "{} {} -> {}: {}",
                    o.recommendation.account_id,
                    o.recommendation.source.holding.token_symbol,
                    o.recommendation.target.protocol_id,
                    failure
                )),
                _ => None,
            })
            .collect();

        summary.log();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        let mut summary = RunSummary {
            executed: 2,
            skipped: 1,
            ..RunSummary::default()
        };
        assert_eq!(summary.exit_code(), 0);

        summary.failed = 1;
        summary.errors.push("acct-1 USDC -> moonwell: preview failed".to_string());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_abort_keeps_partial_summary() {
        let summary = RunSummary {
            dry_run: true,
            ..RunSummary::default()
        };

        let err = summary.abort(anyhow::anyhow!("gateway down").context("Failed to list wallet holdings"));

        let aborted = err.downcast_ref::<RunAborted>().unwrap();
        assert_eq!(aborted.summary.errors, vec![aborted.reason.clone()]);
        assert!(aborted.reason.contains("gateway down"));
        assert!(aborted.summary.dry_run);
        assert_eq!(aborted.summary.exit_code(), 1);
    }
}
