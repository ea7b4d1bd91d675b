//! Token-data aggregation pipeline: per-wallet balances, per-token
//! aggregation with stale fallback and retries, the live result cache,
//! swap simulation, and the portfolio valuation reducer.

pub mod balances;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod query_cache;
pub mod quotes;
pub mod refresh;
pub mod retry;
pub mod stale_cache;
pub mod tracked;
pub mod valuation;

#[cfg(test)]
mod testing;

pub use balances::BalanceAggregator;
pub use error::AggregationError;
pub use orchestrator::TokenAggregator;
pub use provider::{
    is_valid_address, SwapQuoteProvider, TokenMetadataProvider, WalletBalanceProvider, NATIVE_MINT,
    USDC_MINT,
};
pub use query_cache::AggregationCache;
pub use quotes::{SwapQuoteCache, SwapSimulator};
pub use refresh::{QueryInvalidator, RefreshCoordinator, RefreshOutcome};
pub use retry::RetryPolicy;
pub use stale_cache::StaleCache;
pub use tracked::{TrackedTokenSet, TrackedTokens};
pub use valuation::{PortfolioReducer, StableAssets};
