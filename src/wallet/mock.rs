//! In-memory wallet service for tests.

use crate::wallet::traits::WalletApi;
use crate::wallet::types::*;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletCall {
    ListHoldings { chain_id: u64 },
    Preview(SwapRequest),
    Execute(SwapRequest),
    Status { transaction_id: String },
}

#[derive(Debug, Default)]
struct MockWalletState {
    calls: Vec<WalletCall>,
    transactions: HashMap<String, TransactionStatus>,
}

/// Mock wallet-management service with seeded holdings.
///
/// Swaps confirm immediately unless the buy token was registered with
/// [`MockWalletClient::revert_swaps_into`]; previews fail for tokens
/// registered with [`MockWalletClient::fail_previews_for`].
pub struct MockWalletClient {
    accounts: Vec<AccountHoldings>,
    preview_failures: HashSet<String>,
    reverting_tokens: HashSet<String>,
    holdings_error: Option<String>,
    state: RwLock<MockWalletState>,
    tx_counter: AtomicU64,
}

impl MockWalletClient {
    pub fn new(accounts: Vec<AccountHoldings>) -> Self {
        Self {
            accounts,
            preview_failures: HashSet::new(),
            reverting_tokens: HashSet::new(),
            holdings_error: None,
            state: RwLock::new(MockWalletState::default()),
            tx_counter: AtomicU64::new(1),
        }
    }

    /// Make previews that buy or sell `token` fail.
    pub fn fail_previews_for(mut self, token: &str) -> Self {
        self.preview_failures.insert(token.to_lowercase());
        self
    }

    /// Make executed swaps into `token` end in a failed target state.
    pub fn revert_swaps_into(mut self, token: &str) -> Self {
        self.reverting_tokens.insert(token.to_lowercase());
        self
    }

    /// Make the holdings query fail, as if the service were unreachable.
    pub fn with_holdings_error(mut self, message: &str) -> Self {
        self.holdings_error = Some(message.to_string());
        self
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<WalletCall> {
        self.state.read().await.calls.clone()
    }

    /// Number of execute calls received.
    pub async fn executed_count(&self) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, WalletCall::Execute(_)))
            .count()
    }

    async fn record(&self, call: WalletCall) {
        self.state.write().await.calls.push(call);
    }

    fn target_accounts(&self, request: &SwapRequest) -> Vec<String> {
        match &request.account_ids {
            Some(ids) => ids.clone(),
            None => self.accounts.iter().map(|a| a.account_id.clone()).collect(),
        }
    }
}

#[async_trait]
impl WalletApi for MockWalletClient {
    async fn list_holdings(&self, chain_id: u64) -> Result<Vec<AccountHoldings>> {
        self.record(WalletCall::ListHoldings { chain_id }).await;

        if let Some(message) = &self.holdings_error {
            anyhow::bail!("Wallet API error on holdings: {}", message);
        }
        Ok(self.accounts.clone())
    }

    async fn preview_swap(&self, request: &SwapRequest) -> Result<SwapPreview> {
        self.record(WalletCall::Preview(request.clone())).await;

        let sell = request.sell_token.to_lowercase();
        let buy = request.buy_token.to_lowercase();
        if self.preview_failures.contains(&sell) || self.preview_failures.contains(&buy) {
            anyhow::bail!("no swap route from {} to {}", request.sell_token, request.buy_token);
        }

        Ok(SwapPreview {
            quote_id: Some(format!("quote-{}", self.tx_counter.load(Ordering::SeqCst))),
            estimated_buy_amount: None,
            account_ids: self.target_accounts(request),
        })
    }

    async fn execute_swap(&self, request: &SwapRequest) -> Result<SwapSubmission> {
        self.record(WalletCall::Execute(request.clone())).await;

        let transaction_id = format!("mock-tx-{}", self.tx_counter.fetch_add(1, Ordering::SeqCst));
        let reverts = self
            .reverting_tokens
            .contains(&request.buy_token.to_lowercase());

        let targets = self
            .target_accounts(request)
            .into_iter()
            .map(|account_id| TargetStatus {
                account_id,
                state: if reverts {
                    TargetState::Failed
                } else {
                    TargetState::Confirmed
                },
                tx_hash: (!reverts).then(|| format!("0x{:064x}", 0xfeed_u64)),
                error: reverts.then(|| "execution reverted".to_string()),
            })
            .collect();

        debug!(%transaction_id, reverts, "Mock swap submitted");
        self.state.write().await.transactions.insert(
            transaction_id.clone(),
            TransactionStatus {
                transaction_id: transaction_id.clone(),
                targets,
            },
        );

        Ok(SwapSubmission { transaction_id })
    }

    async fn transaction_status(&self, transaction_id: &str) -> Result<TransactionStatus> {
        self.record(WalletCall::Status {
            transaction_id: transaction_id.to_string(),
        })
        .await;

        self.state
            .read()
            .await
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown transaction {}", transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(id: &str) -> AccountHoldings {
        AccountHoldings {
            account_id: id.to_string(),
            address: format!("0x{}", id),
            tokens: vec![TokenBalance {
                symbol: "USDC".to_string(),
                address: None,
                balance: "5000000".to_string(),
                decimals: 6,
            }],
        }
    }

    fn request(buy: &str, accounts: Option<Vec<String>>) -> SwapRequest {
        SwapRequest {
            chain_id: 8453,
            sell_token: "USDC".to_string(),
            buy_token: buy.to_string(),
            sell_percentage: dec!(100),
            slippage_percentage: dec!(1),
            account_ids: accounts,
        }
    }

    #[tokio::test]
    async fn test_swap_confirms_for_filtered_account() {
        let client = MockWalletClient::new(vec![account("a1"), account("a2")]);

        let submission = client
            .execute_swap(&request("0xBUY", Some(vec!["a2".to_string()])))
            .await
            .unwrap();
        let status = client
            .transaction_status(&submission.transaction_id)
            .await
            .unwrap();

        assert!(status.is_success());
        assert_eq!(status.targets.len(), 1);
        assert_eq!(status.targets[0].account_id, "a2");
        assert_eq!(client.executed_count().await, 1);
    }

    #[tokio::test]
    async fn test_reverting_token_fails_every_target() {
        let client = MockWalletClient::new(vec![account("a1"), account("a2")])
            .revert_swaps_into("0xbad");

        let submission = client.execute_swap(&request("0xBAD", None)).await.unwrap();
        let status = client
            .transaction_status(&submission.transaction_id)
            .await
            .unwrap();

        assert!(status.is_terminal());
        assert_eq!(status.failure_reasons().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_failure_and_call_log() {
        let client = MockWalletClient::new(vec![account("a1")]).fail_previews_for("0xnoroute");

        assert!(client.preview_swap(&request("0xNoRoute", None)).await.is_err());
        assert!(client.preview_swap(&request("0xok", None)).await.is_ok());

        let calls = client.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], WalletCall::Preview(_)));
    }

    #[tokio::test]
    async fn test_holdings_error() {
        let client = MockWalletClient::new(vec![]).with_holdings_error("connection refused");
        assert!(client.list_holdings(8453).await.is_err());
    }
}
