//! Type definitions for wallet-management API requests and responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response from the holdings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsResponse {
    pub accounts: Vec<AccountHoldings>,
}

/// Token balances of one managed account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHoldings {
    pub account_id: String,
    /// On-chain wallet address
    pub address: String,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

/// Raw balance of a single token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub symbol: String,
    /// Contract address (absent for some indexer entries)
    #[serde(default)]
    pub address: Option<String>,
    /// Balance in the token's smallest unit, as a decimal integer string
    pub balance: String,
    pub decimals: u8,
}

/// Swap instruction accepted by both the preview and execute endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub chain_id: u64,
    /// Token to sell: contract address, or symbol when the address is unknown
    pub sell_token: String,
    /// Token to buy: contract address or symbol
    pub buy_token: String,
    /// Share of the balance to sell (0-100)
    #[serde(with = "rust_decimal::serde::str")]
    pub sell_percentage: Decimal,
    /// Slippage tolerance in percent
    #[serde(with = "rust_decimal::serde::str")]
    pub slippage_percentage: Decimal,
    /// Restrict the swap to these accounts; all accounts when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_ids: Option<Vec<String>>,
}

/// Quote returned by the preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPreview {
    #[serde(default)]
    pub quote_id: Option<String>,
    /// Expected amount of the buy token, in human units
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub estimated_buy_amount: Option<Decimal>,
    /// Accounts the swap would touch
    #[serde(default)]
    pub account_ids: Vec<String>,
}

/// Acknowledgement from the execute endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSubmission {
    pub transaction_id: String,
}

/// Current state of a submitted transaction across its target accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    pub transaction_id: String,
    #[serde(default)]
    pub targets: Vec<TargetStatus>,
}

/// Per-account progress of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub account_id: String,
    pub state: TargetState,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Lifecycle state of a transaction for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    Pending,
    Submitted,
    Confirmed,
    Failed,
}

impl TargetState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TargetState::Confirmed | TargetState::Failed)
    }
}

impl TransactionStatus {
    /// All targets reached confirmed or failed.
    pub fn is_terminal(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|t| t.state.is_terminal())
    }

    /// Terminal with every target confirmed.
    pub fn is_success(&self) -> bool {
        self.is_terminal()
            && self
                .targets
                .iter()
                .all(|t| t.state == TargetState::Confirmed)
    }

    /// Number of targets in a terminal state.
    pub fn completed_targets(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state.is_terminal())
            .count()
    }

    /// Error messages reported by failed targets.
    pub fn failure_reasons(&self) -> Vec<String> {
        self.targets
            .iter()
            .filter(|t| t.state == TargetState::Failed)
            .map(|t| {
                format!(
                    "{}: {}",
                    t.account_id,
                    t.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn status(states: &[TargetState]) -> TransactionStatus {
        TransactionStatus {
            transaction_id: "tx-1".to_string(),
            targets: states
                .iter()
                .enumerate()
                .map(|(i, state)| TargetStatus {
                    account_id: format!("acct-{}", i),
                    state: *state,
                    tx_hash: None,
                    error: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_swap_request_serialization() {
        let request = SwapRequest {
            chain_id: 8453,
            sell_token: "USDC".to_string(),
            buy_token: "0xEdc817A28E8B93B03976FBd4a3dDBc9f7D176c22".to_string(),
            sell_percentage: dec!(100),
            slippage_percentage: dec!(1.0),
            account_ids: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chainId"], 8453);
        assert_eq!(json["sellPercentage"], "100");
        assert_eq!(json["slippagePercentage"], "1.0");
        assert!(json.get("accountIds").is_none());
    }

    #[test]
    fn test_parses_holdings() {
        let json = r#"{"accounts": [{"accountId": "a1", "address": "0xabc",
            "tokens": [{"symbol": "USDC", "balance": "1000000", "decimals": 6}]}]}"#;
        let response: HoldingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.accounts[0].tokens[0].address, None);
        assert_eq!(response.accounts[0].tokens[0].balance, "1000000");
    }

    #[test]
    fn test_transaction_terminal_states() {
        assert!(!status(&[]).is_terminal());
        assert!(!status(&[TargetState::Confirmed, TargetState::Pending]).is_terminal());
        assert!(status(&[TargetState::Confirmed, TargetState::Confirmed]).is_success());

        let mixed = status(&[TargetState::Confirmed, TargetState::Failed]);
        assert!(mixed.is_terminal());
        assert!(!mixed.is_success());
        assert_eq!(mixed.failure_reasons(), vec!["acct-1: unknown error".to_string()]);
    }

    #[test]
    fn test_parses_target_state() {
        let json = r#"{"transactionId": "tx", "targets": [{"accountId": "a", "state": "submitted"}]}"#;
        let status: TransactionStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.targets[0].state, TargetState::Submitted);
        assert_eq!(status.completed_targets(), 0);
    }
}
