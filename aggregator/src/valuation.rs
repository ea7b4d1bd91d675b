use std::{collections::HashSet, sync::Arc};

use domain::PortfolioValuation;

use crate::{provider::USDC_MINT, query_cache::AggregationCache, quotes::SwapQuoteCache};

/// Assets valued 1:1 in USD without a swap simulation.
#[derive(Debug, Clone)]
pub struct StableAssets {
    mints: HashSet<String>,
    symbols: HashSet<String>,
}

impl Default for StableAssets {
    fn default() -> Self {
        Self::new([USDC_MINT.to_string()], ["USDC".to_string()])
    }
}

impl StableAssets {
    pub fn new(
        mints: impl IntoIterator<Item = String>,
        symbols: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            mints: mints.into_iter().collect(),
            symbols: symbols.into_iter().map(|s| s.to_uppercase()).collect(),
        }
    }

    pub fn is_stable(&self, mint: &str, symbol: Option<&str>) -> bool {
        self.mints.contains(mint)
            || symbol
                .map(|s| self.symbols.contains(&s.to_uppercase()))
                .unwrap_or(false)
    }
}

/// Folds whatever is already cached for the tracked tokens into portfolio
/// totals. Missing data counts as zero; nothing is fetched here.
pub struct PortfolioReducer {
    cache: Arc<AggregationCache>,
    quotes: Arc<SwapQuoteCache>,
    stable: StableAssets,
}

impl PortfolioReducer {
    pub fn new(
        cache: Arc<AggregationCache>,
        quotes: Arc<SwapQuoteCache>,
        stable: StableAssets,
    ) -> Self {
        Self {
            cache,
            quotes,
            stable,
        }
    }

    pub async fn total_portfolio_value(&self, tracked: &[String]) -> PortfolioValuation {
        let mut valuation = PortfolioValuation {
            total_tokens: tracked.len(),
            ..PortfolioValuation::default()
        };

        for mint in tracked {
            let Some(result) = self.cache.peek(mint).await else {
                continue;
            };
            valuation.total_value_usd += result.total_usd_value;

            if self.stable.is_stable(mint, Some(&result.metadata.symbol)) {
                valuation.sell_simulation_value_usd += result.total_usd_value;
            } else if let Some(quote) = self.quotes.get(mint, result.total_amount()).await {
                valuation.sell_simulation_value_usd += quote.output_usd_amount;
            }
        }

        valuation
    }
}
