//! Public yield feed integration.
//!
//! Read-only access to the pool list served by the yield data API:
//! - Lending APY and TVL per pool across all networks
//! - Stablecoin flag and protocol identifier
//! - Fixed-count retry with linearly increasing delay

mod client;
mod types;

pub use client::YieldFeedClient;
pub use types::*;
