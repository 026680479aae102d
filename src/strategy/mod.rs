//! Rotation strategy implementation.
//!
//! Contains the core logic for:
//! - Building and ranking the yield catalog from the raw feed
//! - Matching wallet holdings to the yield they currently earn
//! - Planning rotations into the top-ranked record
//! - Dispatching swaps through the wallet API

mod catalog;
pub mod classifier;
mod dispatcher;
mod matcher;
mod planner;
pub mod types;

pub use catalog::{rank_by_apy, select_top_tradeable, CatalogBuilder};
pub use classifier::{TokenClass, TokenClassifier};
pub use dispatcher::{
    DispatchConfig, DispatchOutcome, DispatchReport, DispatchStatus, SwapDispatcher, SwapFailure,
    ValidationError,
};
pub use matcher::{match_holdings, HoldingMatcher, MatchKind};
pub use planner::{prioritize, summarize, RotationPlanner, RotationSummary};
pub use types::{
    Account, Holding, MatchedAccount, MatchedHolding, RotationRecommendation, YieldRecord,
};
