use std::{collections::HashMap, sync::Arc};

use domain::{SwapSimulationResult, TokenAggregationResult};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{provider::SwapQuoteProvider, valuation::StableAssets};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QuoteKey {
    mint: String,
    amount_bits: u64,
}

impl QuoteKey {
    fn new(mint: &str, amount: f64) -> Self {
        Self {
            mint: mint.to_string(),
            amount_bits: amount.to_bits(),
        }
    }
}

/// Swap quotes keyed by (mint, amount). Independent of the aggregation cache:
/// an entry may be missing or outdated while balances are fresh.
#[derive(Default)]
pub struct SwapQuoteCache {
    entries: RwLock<HashMap<QuoteKey, SwapSimulationResult>>,
}

impl SwapQuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, mint: &str, amount: f64) -> Option<SwapSimulationResult> {
        self.entries
            .read()
            .await
            .get(&QuoteKey::new(mint, amount))
            .copied()
    }

    pub async fn put(&self, mint: &str, amount: f64, quote: SwapSimulationResult) {
        self.entries
            .write()
            .await
            .insert(QuoteKey::new(mint, amount), quote);
    }
}

pub struct SwapSimulator {
    provider: Arc<dyn SwapQuoteProvider>,
    quotes: Arc<SwapQuoteCache>,
    stable: StableAssets,
}

impl SwapSimulator {
    pub fn new(
        provider: Arc<dyn SwapQuoteProvider>,
        quotes: Arc<SwapQuoteCache>,
        stable: StableAssets,
    ) -> Self {
        Self {
            provider,
            quotes,
            stable,
        }
    }

    /// Quotes selling the full holding of `result` into USD and caches it.
    /// Stable assets and empty holdings are never quoted.
    pub async fn simulate(&self, result: &TokenAggregationResult) -> Option<SwapSimulationResult> {
        let amount = result.total_amount();
        if amount.is_nan() || amount <= 0.0 {
            return None;
        }
        if self
            .stable
            .is_stable(&result.mint, Some(&result.metadata.symbol))
        {
            return None;
        }
        match self.provider.quote(&result.mint, amount).await {
            Ok(quote) => {
                debug!(
                    mint = %result.mint,
                    amount,
                    output_usd_amount = quote.output_usd_amount,
                    "swap quote cached"
                );
                self.quotes.put(&result.mint, amount, quote).await;
                Some(quote)
            }
            Err(err) => {
                warn!(error = %err, mint = %result.mint, amount, "swap quote failed");
                None
            }
        }
    }
}
