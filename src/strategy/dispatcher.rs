//! Swap dispatch: validates recommendations and submits them one at a time.

use crate::config::RotationConfig;
use crate::strategy::types::RotationRecommendation;
use crate::wallet::{wait_for_completion, PollError, PollSettings, SwapRequest, WalletApi};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a recommendation was excluded before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing account id")]
    MissingAccount,
    #[error("missing source token symbol")]
    MissingSourceSymbol,
    #[error("missing target token symbol")]
    MissingTargetSymbol,
    #[error("target {protocol} {symbol} has no known token address")]
    UntradeableTarget { protocol: String, symbol: String },
    #[error("source balance is not positive")]
    EmptyBalance,
    #[error("source value ${value} below minimum ${minimum}")]
    BelowMinimumBalance { value: Decimal, minimum: Decimal },
}

/// Why a submitted swap did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapFailure {
    #[error("preview failed: {0}")]
    Preview(String),
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("transaction {transaction_id} failed: {reasons}")]
    Reverted {
        transaction_id: String,
        reasons: String,
    },
    #[error("{0}")]
    Timeout(String),
}

impl From<PollError> for SwapFailure {
    fn from(e: PollError) -> Self {
        SwapFailure::Timeout(e.to_string())
    }
}

/// Classification of one recommendation after dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchStatus {
    /// Swap confirmed, or previewed successfully in dry-run
    Executed { transaction_id: Option<String> },
    Failed(SwapFailure),
    Skipped(ValidationError),
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub recommendation: RotationRecommendation,
    pub status: DispatchStatus,
}

/// Outcomes of one dispatch batch, in submission order.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
    pub dry_run: bool,
}

impl DispatchReport {
    fn count(&self, pred: impl Fn(&DispatchStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn executed(&self) -> usize {
        self.count(|s| matches!(s, DispatchStatus::Executed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DispatchStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DispatchStatus::Skipped(_)))
    }
}

/// Dispatch parameters.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub chain_id: u64,
    pub min_balance_usd: Decimal,
    pub slippage_pct: Decimal,
    pub sell_percentage: Decimal,
    pub dry_run: bool,
    pub poll: PollSettings,
}

impl DispatchConfig {
    pub fn new(chain_id: u64, rotation: &RotationConfig, poll: PollSettings) -> Self {
        Self {
            chain_id,
            min_balance_usd: rotation.min_balance_usd,
            slippage_pct: rotation.max_slippage_pct,
            sell_percentage: rotation.sell_percentage,
            dry_run: rotation.dry_run,
            poll,
        }
    }
}

/// Submits validated recommendations to the wallet service.
pub struct SwapDispatcher {
    wallet: Arc<dyn WalletApi>,
    config: DispatchConfig,
}

impl SwapDispatcher {
    pub fn new(wallet: Arc<dyn WalletApi>, config: DispatchConfig) -> Self {
        Self { wallet, config }
    }

    /// Check a recommendation against the submission rules.
    pub fn validate(&self, rec: &RotationRecommendation) -> Result<(), ValidationError> {
        if rec.account_id.trim().is_empty() {
            return Err(ValidationError::MissingAccount);
        }
        if rec.source.holding.token_symbol.trim().is_empty() {
            return Err(ValidationError::MissingSourceSymbol);
        }
        if rec.target.token_symbol.trim().is_empty() {
            return Err(ValidationError::MissingTargetSymbol);
        }
        if !rec.target.is_tradeable() {
            return Err(ValidationError::UntradeableTarget {
                protocol: rec.target.protocol_id.clone(),
                symbol: rec.target.token_symbol.clone(),
            });
        }
        if rec.source.holding.raw_balance == 0 {
            return Err(ValidationError::EmptyBalance);
        }
        if rec.source.holding.usd_value < self.config.min_balance_usd {
            return Err(ValidationError::BelowMinimumBalance {
                value: rec.source.holding.usd_value,
                minimum: self.config.min_balance_usd,
            });
        }
        Ok(())
    }

    /// Build the wallet API request for a validated recommendation.
    pub fn swap_request(&self, rec: &RotationRecommendation) -> SwapRequest {
        let source = &rec.source.holding;
        SwapRequest {
            chain_id: self.config.chain_id,
            sell_token: source
                .token_address
                .clone()
                .unwrap_or_else(|| source.token_symbol.clone()),
            buy_token: rec
                .target
                .token_address
                .clone()
                .unwrap_or_else(|| rec.target.token_symbol.clone()),
            sell_percentage: self.config.sell_percentage,
            slippage_percentage: self.config.slippage_pct,
            account_ids: Some(vec![rec.account_id.clone()]),
        }
    }

    /// Validate and submit each recommendation in order.
    ///
    /// Never fails as a whole: every recommendation ends up executed,
    /// failed or skipped.
    pub async fn dispatch(&self, recommendations: &[RotationRecommendation]) -> DispatchReport {
        let mut report = DispatchReport {
            outcomes: Vec::with_capacity(recommendations.len()),
            dry_run: self.config.dry_run,
        };

        for (idx, rec) in recommendations.iter().enumerate() {
            let status = match self.validate(rec) {
                Err(reason) => {
                    warn!(
                        account = %rec.account_id,
                        from = %rec.source.holding.token_symbol,
                        reason = %reason,
                        "Skipping rotation"
                    );
                    DispatchStatus::Skipped(reason)
                }
                Ok(()) => {
                    info!(
                        priority = idx + 1,
                        account = %rec.account_id,
                        from = %rec.source.holding.token_symbol,
                        to_protocol = %rec.target.protocol_id,
                        usd_value = %rec.source.holding.usd_value,
                        dry_run = self.config.dry_run,
                        "Dispatching rotation"
                    );
                    match self.submit(rec).await {
                        Ok(transaction_id) => DispatchStatus::Executed { transaction_id },
                        Err(failure) => {
                            error!(account = %rec.account_id, error = %failure, "Rotation failed");
                            DispatchStatus::Failed(failure)
                        }
                    }
                }
            };

            report.outcomes.push(DispatchOutcome {
                recommendation: rec.clone(),
                status,
            });
        }

        info!(
            executed = report.executed(),
            failed = report.failed(),
            skipped = report.skipped(),
            dry_run = report.dry_run,
            "Dispatch complete"
        );
        report
    }

    /// Preview, then (unless dry-run) execute and wait for completion.
    async fn submit(&self, rec: &RotationRecommendation) -> Result<Option<String>, SwapFailure> {
        let request = self.swap_request(rec);

        let preview = self
            .wallet
            .preview_swap(&request)
            .await
            .map_err(|e| SwapFailure::Preview(format!("{:#}", e)))?;
        debug!(
            account = %rec.account_id,
            quote = ?preview.quote_id,
            estimated_buy_amount = ?preview.estimated_buy_amount,
            "Swap previewed"
        );

        if self.config.dry_run {
            info!(
                account = %rec.account_id,
                sell = %request.sell_token,
                buy = %request.buy_token,
                "Dry run: swap not executed"
            );
            return Ok(None);
        }

        let submission = self
            .wallet
            .execute_swap(&request)
            .await
            .map_err(|e| SwapFailure::Execution(format!("{:#}", e)))?;
        let transaction_id = submission.transaction_id;

        let account = rec.account_id.clone();
        let status = wait_for_completion(
            self.wallet.as_ref(),
            &transaction_id,
            self.config.poll,
            |s| {
                debug!(
                    account = %account,
                    transaction_id = %s.transaction_id,
                    completed = s.completed_targets(),
                    total = s.targets.len(),
                    "Waiting for swap"
                )
            },
        )
        .await?;

        if !status.is_success() {
            return Err(SwapFailure::Reverted {
                transaction_id,
                reasons: status.failure_reasons().join("; "),
            });
        }

        info!(account = %rec.account_id, %transaction_id, "Rotation confirmed");
        Ok(Some(transaction_id))
    }
}
