//! Transaction completion polling.

use crate::wallet::traits::WalletApi;
use crate::wallet::types::TransactionStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How often and how long to poll a submitted transaction.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval_ms: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("transaction {transaction_id} not final after {waited:?} ({completed}/{total} targets done)")]
    Timeout {
        transaction_id: String,
        waited: Duration,
        completed: usize,
        total: usize,
    },
}

/// Poll `transaction_status` until every target is confirmed or failed.
///
/// `on_progress` sees every successfully fetched status. Status lookup
/// errors are logged and polling continues until the timeout.
pub async fn wait_for_completion<F>(
    api: &dyn WalletApi,
    transaction_id: &str,
    settings: PollSettings,
    mut on_progress: F,
) -> Result<TransactionStatus, PollError>
where
    F: FnMut(&TransactionStatus) + Send,
{
    let started = Instant::now();
    let deadline = started + settings.timeout;
    let mut last_seen: Option<TransactionStatus> = None;

    loop {
        match api.transaction_status(transaction_id).await {
            Ok(status) => {
                on_progress(&status);
                if status.is_terminal() {
                    debug!(
                        transaction_id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Transaction reached terminal state"
                    );
                    return Ok(status);
                }
                last_seen = Some(status);
            }
            Err(e) => {
                warn!(transaction_id, error = %e, "Transaction status lookup failed");
            }
        }

        if Instant::now() + settings.interval > deadline {
            let (completed, total) = last_seen
                .as_ref()
                .map(|s| (s.completed_targets(), s.targets.len()))
                .unwrap_or((0, 0));
            return Err(PollError::Timeout {
                transaction_id: transaction_id.to_string(),
                waited: started.elapsed(),
                completed,
                total,
            });
        }

        tokio::time::sleep(settings.interval).await;
    }
}
