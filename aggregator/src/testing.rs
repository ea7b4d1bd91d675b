//! In-memory provider doubles shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use domain::{SwapSimulationResult, TokenMetadata};
use tokio::time::{sleep, Instant};

use crate::provider::{SwapQuoteProvider, TokenMetadataProvider, WalletBalanceProvider};

pub const MINT_X: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const MINT_Y: &str = "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So";
pub const WALLET_A: &str = "wallet-a";
pub const WALLET_B: &str = "wallet-b";
pub const WALLET_C: &str = "wallet-c";
pub const WALLET_D: &str = "wallet-d";

pub fn metadata(symbol: &str, price_usd: f64) -> TokenMetadata {
    TokenMetadata {
        name: format!("{symbol} token"),
        symbol: symbol.to_string(),
        price_usd,
        market_cap_usd: 1_000_000.0,
        liquidity_usd: 50_000.0,
        volume_24h_usd: 10_000.0,
        price_change_24h_pct: 1.5,
    }
}

#[derive(Default)]
pub struct StaticMetadata {
    records: HashMap<String, TokenMetadata>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl StaticMetadata {
    pub fn with(mut self, mint: &str, meta: TokenMetadata) -> Self {
        self.records.insert(mint.to_string(), meta);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenMetadataProvider for StaticMetadata {
    async fn token_metadata(&self, mint: &str) -> Result<Option<TokenMetadata>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("metadata provider returned 429"));
        }
        Ok(self.records.get(mint).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct LookupEvent {
    pub wallet: String,
    pub finished: bool,
    pub at: Instant,
}

#[derive(Default)]
pub struct ScriptedBalances {
    amounts: HashMap<(String, String), Result<f64, String>>,
    native: HashMap<String, f64>,
    latency: HashMap<String, Duration>,
    events: Mutex<Vec<LookupEvent>>,
    panicking: AtomicBool,
    token_calls: AtomicUsize,
}

impl ScriptedBalances {
    pub fn with(mut self, wallet: &str, mint: &str, amount: Result<f64, &str>) -> Self {
        self.amounts.insert(
            (wallet.to_string(), mint.to_string()),
            amount.map_err(str::to_string),
        );
        self
    }

    pub fn with_native(mut self, wallet: &str, amount: f64) -> Self {
        self.native.insert(wallet.to_string(), amount);
        self
    }

    pub fn with_latency(mut self, wallet: &str, latency: Duration) -> Self {
        self.latency.insert(wallet.to_string(), latency);
        self
    }

    pub fn set_panicking(&self, panicking: bool) {
        self.panicking.store(panicking, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<LookupEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    async fn record(&self, wallet: &str) {
        self.push(wallet, false);
        if let Some(latency) = self.latency.get(wallet) {
            sleep(*latency).await;
        }
        self.push(wallet, true);
        if self.panicking.load(Ordering::SeqCst) {
            panic!("balance lookup blew up for {wallet}");
        }
    }

    fn push(&self, wallet: &str, finished: bool) {
        self.events.lock().unwrap().push(LookupEvent {
            wallet: wallet.to_string(),
            finished,
            at: Instant::now(),
        });
    }
}

#[async_trait]
impl WalletBalanceProvider for ScriptedBalances {
    async fn native_balance(&self, wallet: &str) -> Result<f64> {
        self.record(wallet).await;
        Ok(self.native.get(wallet).copied().unwrap_or(0.0))
    }

    async fn token_balance(&self, wallet: &str, mint: &str) -> Result<f64> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.record(wallet).await;
        match self.amounts.get(&(wallet.to_string(), mint.to_string())) {
            Some(Ok(amount)) => Ok(*amount),
            Some(Err(message)) => Err(anyhow!(message.clone())),
            None => Ok(0.0),
        }
    }
}

#[derive(Default)]
pub struct StaticQuotes {
    quotes: HashMap<String, SwapSimulationResult>,
    calls: Mutex<Vec<(String, f64)>>,
}

impl StaticQuotes {
    pub fn with(mut self, mint: &str, output_usd_amount: f64) -> Self {
        self.quotes.insert(
            mint.to_string(),
            SwapSimulationResult {
                output_usd_amount,
                price_impact_pct: 0.4,
                slippage_bps: 50,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapQuoteProvider for StaticQuotes {
    async fn quote(&self, mint: &str, amount: f64) -> Result<SwapSimulationResult> {
        self.calls.lock().unwrap().push((mint.to_string(), amount));
        self.quotes
            .get(mint)
            .copied()
            .ok_or_else(|| anyhow!("no route for {mint}"))
    }
}
