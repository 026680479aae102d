//! Service-agnostic trait for the wallet-management API.

use crate::wallet::types::{
    AccountHoldings, SwapPreview, SwapRequest, SwapSubmission, TransactionStatus,
};
use async_trait::async_trait;

/// Operations the rotator needs from the wallet-management service.
///
/// The service owns keys, signing and broadcast. Implementations are
/// injected into the runner and dispatcher for the lifetime of one run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Raw token balances of every managed account on the given chain.
    async fn list_holdings(&self, chain_id: u64) -> anyhow::Result<Vec<AccountHoldings>>;

    /// Quote a swap without submitting it.
    async fn preview_swap(&self, request: &SwapRequest) -> anyhow::Result<SwapPreview>;

    /// Submit a swap and return its transaction id.
    async fn execute_swap(&self, request: &SwapRequest) -> anyhow::Result<SwapSubmission>;

    /// Current per-target state of a submitted transaction.
    async fn transaction_status(&self, transaction_id: &str)
        -> anyhow::Result<TransactionStatus>;
}
