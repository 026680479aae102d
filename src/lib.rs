//! # Stable Yield Rotator
//!
//! Moves idle and underperforming stablecoin holdings of managed wallets
//! into the best-paying lending position on a single network.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `feed`: Public yield feed client
//! - `wallet`: Wallet-management API client, polling and mock
//! - `tokens`: Static token tables (stable symbols, receipt-token addresses)
//! - `strategy`: Catalog building, holding matching, rotation planning and dispatch
//! - `runner`: One end-to-end rotation run
//! - `utils`: Shared decimal arithmetic

pub mod config;
pub mod feed;
pub mod runner;
pub mod strategy;
pub mod tokens;
pub mod utils;
pub mod wallet;

pub use config::Config;
pub use runner::{RotationRunner, RunAborted, RunSummary};
