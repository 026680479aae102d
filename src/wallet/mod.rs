//! Wallet-management API integration.
//!
//! Custody and transaction submission are delegated to an external service.
//! This module provides:
//! - The `WalletApi` seam (holdings, swap preview/execute, transaction status)
//! - A signed REST client for the live service
//! - Completion polling with a progress callback
//! - An in-memory mock for tests

mod client;
pub mod mock;
mod poll;
mod traits;
mod types;

pub use client::WalletApiClient;
pub use mock::MockWalletClient;
pub use poll::{wait_for_completion, PollError, PollSettings};
pub use traits::WalletApi;
#[cfg(test)]
pub use traits::MockWalletApi;
pub use types::*;
