use std::{sync::Arc, time::Duration};

use domain::WalletBalanceRecord;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    error::AggregationError,
    provider::{WalletBalanceProvider, NATIVE_MINT},
};

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Fetches per-wallet balances for one mint in small paced batches so the
/// RPC endpoint is not hammered with one request per wallet at once.
#[derive(Clone)]
pub struct BalanceAggregator {
    provider: Arc<dyn WalletBalanceProvider>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BalanceAggregator {
    pub fn new(
        provider: Arc<dyn WalletBalanceProvider>,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    pub fn with_defaults(provider: Arc<dyn WalletBalanceProvider>) -> Self {
        Self::new(provider, DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns records for wallets holding a positive amount, in input order.
    pub async fn collect(
        &self,
        mint: &str,
        wallets: &[String],
        price_usd: f64,
    ) -> Result<Vec<WalletBalanceRecord>, AggregationError> {
        let mut records = Vec::with_capacity(wallets.len());
        let batch_count = wallets.len().div_ceil(self.batch_size);

        for (index, batch) in wallets.chunks(self.batch_size).enumerate() {
            let handles: Vec<_> = batch
                .iter()
                .map(|wallet| {
                    let provider = self.provider.clone();
                    let wallet = wallet.clone();
                    let mint = mint.to_string();
                    tokio::spawn(async move { lookup(provider.as_ref(), &wallet, &mint).await })
                })
                .collect();

            for (wallet, handle) in batch.iter().zip(handles) {
                let amount = handle.await.map_err(|err| AggregationError::LookupTask {
                    wallet: wallet.clone(),
                    message: err.to_string(),
                })?;
                if amount > 0.0 {
                    records.push(WalletBalanceRecord::valued(wallet, mint, amount, price_usd));
                }
            }

            debug!(mint, batch = index + 1, batch_count, "balance batch resolved");
            if index + 1 < batch_count && !self.batch_delay.is_zero() {
                sleep(self.batch_delay).await;
            }
        }

        Ok(records)
    }
}

async fn lookup(provider: &dyn WalletBalanceProvider, wallet: &str, mint: &str) -> f64 {
    let result = if mint == NATIVE_MINT {
        provider.native_balance(wallet).await
    } else {
        provider.token_balance(wallet, mint).await
    };
    match result {
        Ok(amount) => amount,
        Err(err) => {
            warn!(error = %err, wallet, mint, "balance lookup failed, counting as zero");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBalances, WALLET_A, WALLET_B, WALLET_C, WALLET_D, MINT_X};

    fn wallets(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn drops_zero_and_failed_wallets_in_input_order() {
        let provider = Arc::new(
            ScriptedBalances::default()
                .with(WALLET_A, MINT_X, Err("rpc timeout"))
                .with(WALLET_B, MINT_X, Ok(4.0))
                .with(WALLET_C, MINT_X, Ok(0.0))
                .with(WALLET_D, MINT_X, Ok(1.5)),
        );
        let aggregator = BalanceAggregator::new(provider, 2, Duration::from_millis(100));

        let records = aggregator
            .collect(MINT_X, &wallets(&[WALLET_A, WALLET_B, WALLET_C, WALLET_D]), 2.0)
            .await
            .expect("aggregation succeeds");

        let holders: Vec<_> = records.iter().map(|r| r.wallet_address.as_str()).collect();
        assert_eq!(holders, vec![WALLET_B, WALLET_D]);
        assert_eq!(records[0].usd_value, 8.0);
        assert_eq!(records[1].usd_value, 3.0);
        assert!(records.iter().all(|r| r.token_amount > 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn negative_and_nan_amounts_are_filtered() {
        let provider = Arc::new(
            ScriptedBalances::default()
                .with(WALLET_A, MINT_X, Ok(-3.0))
                .with(WALLET_B, MINT_X, Ok(f64::NAN)),
        );
        let aggregator = BalanceAggregator::with_defaults(provider);
        let records = aggregator
            .collect(MINT_X, &wallets(&[WALLET_A, WALLET_B]), 1.0)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn batches_never_overlap() {
        let provider = Arc::new(
            ScriptedBalances::default()
                .with(WALLET_A, MINT_X, Ok(1.0))
                .with(WALLET_B, MINT_X, Ok(1.0))
                .with(WALLET_C, MINT_X, Ok(1.0))
                .with(WALLET_D, MINT_X, Ok(1.0))
                .with_latency(WALLET_A, Duration::from_millis(300))
                .with_latency(WALLET_B, Duration::from_millis(50)),
        );
        let aggregator =
            BalanceAggregator::new(provider.clone(), 2, Duration::from_millis(100));

        aggregator
            .collect(MINT_X, &wallets(&[WALLET_A, WALLET_B, WALLET_C, WALLET_D]), 1.0)
            .await
            .unwrap();

        let events = provider.events();
        let last_end_of_first = events
            .iter()
            .filter(|e| e.finished && (e.wallet == WALLET_A || e.wallet == WALLET_B))
            .map(|e| e.at)
            .max()
            .unwrap();
        let first_start_of_second = events
            .iter()
            .filter(|e| !e.finished && (e.wallet == WALLET_C || e.wallet == WALLET_D))
            .map(|e| e.at)
            .min()
            .unwrap();
        assert!(first_start_of_second >= last_end_of_first + Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn native_mint_uses_native_lookup() {
        let provider = Arc::new(ScriptedBalances::default().with_native(WALLET_A, 2.5));
        let aggregator = BalanceAggregator::with_defaults(provider.clone());
        let records = aggregator
            .collect(NATIVE_MINT, &wallets(&[WALLET_A]), 100.0)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].usd_value, 250.0);
        assert_eq!(provider.token_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_lookup_aborts_aggregation() {
        let provider = Arc::new(ScriptedBalances::default().with(WALLET_A, MINT_X, Ok(1.0)));
        provider.set_panicking(true);
        let aggregator = BalanceAggregator::with_defaults(provider);
        let err = aggregator
            .collect(MINT_X, &wallets(&[WALLET_A]), 1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AggregationError::LookupTask { .. }));
    }
}
