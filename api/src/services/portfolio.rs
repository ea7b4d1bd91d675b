use std::sync::Arc;

use aggregator::{
    is_valid_address, AggregationCache, AggregationError, PortfolioReducer, RefreshCoordinator,
    RefreshOutcome, SwapSimulator, TrackedTokens,
};
use chrono::{DateTime, Utc};
use domain::{
    NewPortfolioSnapshot, PortfolioValuation, SwapSimulationResult, TokenAggregationResult,
    TokenLoadState,
};
use tracing::info;

/// Everything the HTTP layer and the background jobs need from the
/// aggregation pipeline, bound to one fixed wallet list.
pub struct PortfolioTracker {
    wallets: Vec<String>,
    tracked: Arc<TrackedTokens>,
    cache: Arc<AggregationCache>,
    simulator: SwapSimulator,
    reducer: PortfolioReducer,
    refresher: RefreshCoordinator,
}

impl PortfolioTracker {
    pub fn new(
        wallets: Vec<String>,
        tracked: Arc<TrackedTokens>,
        cache: Arc<AggregationCache>,
        simulator: SwapSimulator,
        reducer: PortfolioReducer,
    ) -> Self {
        let refresher = RefreshCoordinator::new(cache.clone(), tracked.clone());
        Self {
            wallets,
            tracked,
            cache,
            simulator,
            reducer,
            refresher,
        }
    }

    pub fn wallets(&self) -> &[String] {
        &self.wallets
    }

    pub async fn tracked_tokens(&self) -> Vec<String> {
        self.tracked.list().await
    }

    pub async fn is_tracked(&self, mint: &str) -> bool {
        self.tracked.contains(mint).await
    }

    /// Returns whether the mint was newly added.
    pub async fn add_token(&self, mint: &str) -> Result<bool, AggregationError> {
        let mint = mint.trim();
        if !is_valid_address(mint) {
            return Err(AggregationError::InvalidMint(mint.to_string()));
        }
        let added = self.tracked.add(mint).await;
        if added {
            info!(mint, "token tracked");
        }
        Ok(added)
    }

    pub async fn remove_token(&self, mint: &str) -> bool {
        let removed = self.tracked.remove(mint).await;
        if removed {
            info!(mint, "token untracked");
        }
        removed
    }

    pub async fn clear_tokens(&self) {
        self.tracked.clear().await;
        info!("tracked tokens cleared");
    }

    pub async fn load_token(
        &self,
        mint: &str,
    ) -> Result<TokenAggregationResult, AggregationError> {
        if !is_valid_address(mint) {
            return Err(AggregationError::InvalidMint(mint.to_string()));
        }
        let outcome = self.cache.get_or_fetch(mint, &self.wallets).await;
        let label = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!("token_aggregations_total", "outcome" => label).increment(1);
        outcome
    }

    pub async fn token_state(&self, mint: &str) -> TokenLoadState {
        self.cache.state(mint).await
    }

    /// Loads the token (through the cache) and quotes selling the whole holding.
    pub async fn simulate_token(
        &self,
        mint: &str,
    ) -> Result<Option<SwapSimulationResult>, AggregationError> {
        let result = self.load_token(mint).await?;
        Ok(self.simulator.simulate(&result).await)
    }

    /// Quotes from cached data only; used after a sync pass.
    pub async fn simulate_cached(&self, mint: &str) -> Option<SwapSimulationResult> {
        let result = self.cache.peek(mint).await?;
        self.simulator.simulate(&result).await
    }

    pub async fn valuation(&self) -> PortfolioValuation {
        let tracked = self.tracked.list().await;
        self.reducer.total_portfolio_value(&tracked).await
    }

    pub async fn refresh_all(&self) -> RefreshOutcome {
        let outcome = self.refresher.refresh_all().await;
        let label = match outcome {
            RefreshOutcome::Completed { .. } => "completed",
            RefreshOutcome::AlreadyRunning => "skipped",
        };
        metrics::counter!("portfolio_refresh_cycles_total", "outcome" => label).increment(1);
        outcome
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_refreshing()
    }

    /// True once at least one tracked token has loaded data.
    pub async fn has_data(&self) -> bool {
        for mint in self.tracked.list().await {
            if self.cache.peek(&mint).await.is_some() {
                return true;
            }
        }
        false
    }

    pub async fn snapshot_at(&self, timestamp: DateTime<Utc>) -> NewPortfolioSnapshot {
        let valuation = self.valuation().await;
        NewPortfolioSnapshot::from_valuation(&valuation, self.wallets.len(), timestamp)
    }
}
