use std::sync::Arc;

use domain::{TokenAggregationResult, TokenMetadata};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    balances::BalanceAggregator,
    error::AggregationError,
    provider::{is_valid_address, TokenMetadataProvider},
    retry::RetryPolicy,
    stale_cache::StaleCache,
};

/// Per-token entry point: metadata, balances, totals, then the stale/retry
/// fallback when the whole sequence fails.
pub struct TokenAggregator {
    metadata: Arc<dyn TokenMetadataProvider>,
    balances: BalanceAggregator,
    stale: Arc<StaleCache>,
    retry: RetryPolicy,
}

impl TokenAggregator {
    pub fn new(
        metadata: Arc<dyn TokenMetadataProvider>,
        balances: BalanceAggregator,
        stale: Arc<StaleCache>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            metadata,
            balances,
            stale,
            retry,
        }
    }

    pub fn stale_cache(&self) -> &Arc<StaleCache> {
        &self.stale
    }

    pub async fn aggregate(
        &self,
        mint: &str,
        wallets: &[String],
    ) -> Result<TokenAggregationResult, AggregationError> {
        let first_err = match self.aggregate_once(mint, wallets).await {
            Ok(result) => return Ok(result),
            Err(err) => err,
        };
        warn!(error = %first_err, mint, "token aggregation failed");

        if let Some(stale) = self.stale.get(mint).await {
            info!(mint, "serving stale token data");
            return Ok(stale);
        }

        for retry in 1..self.retry.max_attempts {
            let delay = self.retry.delay_for(retry);
            info!(
                mint,
                attempt = retry + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying token aggregation"
            );
            sleep(delay).await;
            match self.aggregate_once(mint, wallets).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    warn!(
                        error = %err,
                        mint,
                        attempt = retry + 1,
                        "token aggregation retry failed"
                    );
                    if let Some(stale) = self.stale.get(mint).await {
                        return Ok(stale);
                    }
                }
            }
        }

        Err(first_err)
    }

    async fn aggregate_once(
        &self,
        mint: &str,
        wallets: &[String],
    ) -> Result<TokenAggregationResult, AggregationError> {
        if !is_valid_address(mint) {
            return Err(AggregationError::InvalidMint(mint.to_string()));
        }
        let metadata = self.fetch_metadata(mint).await;
        let balances = self
            .balances
            .collect(mint, wallets, metadata.price_usd)
            .await?;
        let result = TokenAggregationResult::new(mint, metadata, balances);
        info!(
            mint,
            holders = result.balances.len(),
            total_usd_value = result.total_usd_value,
            "token aggregated"
        );
        self.stale.put(mint, result.clone()).await;
        Ok(result)
    }

    async fn fetch_metadata(&self, mint: &str) -> TokenMetadata {
        match self.metadata.token_metadata(mint).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => TokenMetadata::placeholder(mint),
            Err(err) => {
                warn!(error = %err, mint, "metadata lookup failed, using placeholder");
                TokenMetadata::placeholder(mint)
            }
        }
    }
}
