//! Stub providers and config shared by the api integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use aggregator::{SwapQuoteProvider, TokenMetadataProvider, WalletBalanceProvider, USDC_MINT};
use api::{
    bootstrap::{build_tracker, Providers},
    config::AppConfig,
    services::PortfolioTracker,
};
use async_trait::async_trait;
use domain::{SwapSimulationResult, TokenMetadata};

pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const MSOL: &str = "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So";
pub const WALLET_A: &str = "wallet-a";
pub const WALLET_B: &str = "wallet-b";

#[derive(Default)]
pub struct StubMetadata {
    calls: AtomicUsize,
}

impl StubMetadata {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenMetadataProvider for StubMetadata {
    async fn token_metadata(&self, mint: &str) -> anyhow::Result<Option<TokenMetadata>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (symbol, price) = match mint {
            BONK => ("BONK", 0.5),
            USDC_MINT => ("USDC", 1.0),
            _ => return Ok(None),
        };
        Ok(Some(TokenMetadata {
            name: format!("{symbol} token"),
            symbol: symbol.to_string(),
            price_usd: price,
            market_cap_usd: 1_000_000.0,
            liquidity_usd: 250_000.0,
            volume_24h_usd: 40_000.0,
            price_change_24h_pct: 2.0,
        }))
    }
}

/// Balances per (wallet, mint). mSOL lookups panic so the aggregation
/// fails outright.
pub struct StubBalances {
    amounts: HashMap<(&'static str, &'static str), f64>,
}

impl StubBalances {
    pub fn new() -> Self {
        let mut amounts = HashMap::new();
        amounts.insert((WALLET_A, BONK), 200.0);
        amounts.insert((WALLET_B, BONK), 100.0);
        amounts.insert((WALLET_A, USDC_MINT), 100.0);
        Self { amounts }
    }
}

#[async_trait]
impl WalletBalanceProvider for StubBalances {
    async fn native_balance(&self, _wallet: &str) -> anyhow::Result<f64> {
        Ok(0.0)
    }

    async fn token_balance(&self, wallet: &str, mint: &str) -> anyhow::Result<f64> {
        if mint == MSOL {
            panic!("rpc client crashed");
        }
        Ok(self
            .amounts
            .iter()
            .find(|((w, m), _)| *w == wallet && *m == mint)
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0))
    }
}

/// Quotes 98.6% of the holding at the BONK price.
pub struct StubQuotes;

#[async_trait]
impl SwapQuoteProvider for StubQuotes {
    async fn quote(&self, _mint: &str, amount: f64) -> anyhow::Result<SwapSimulationResult> {
        Ok(SwapSimulationResult {
            output_usd_amount: amount * 0.5 * 0.986,
            price_impact_pct: 0.4,
            slippage_bps: 50,
        })
    }
}

pub fn test_config(tokens: &[&str]) -> AppConfig {
    AppConfig {
        token_addresses: tokens.iter().map(|t| t.to_string()).collect(),
        wallet_addresses: vec![WALLET_A.to_string(), WALLET_B.to_string()],
        rpc_url: None,
        dexscreener_api_base: "http://localhost:0".to_string(),
        jupiter_api_base: "http://localhost:0".to_string(),
        database_url: None,
        port: 0,
        frontend_origins: vec!["http://localhost:3000".to_string()],
        balance_batch_size: 3,
        balance_batch_delay: Duration::ZERO,
        aggregation_max_attempts: 1,
        aggregation_retry_base: Duration::ZERO,
        token_data_stale_after: Duration::from_secs(60),
        refresh_interval: Duration::from_secs(60),
        refresh_max_concurrency: 4,
        snapshot_interval: None,
        stable_asset_mints: vec![USDC_MINT.to_string()],
        stable_asset_symbols: vec!["USDC".to_string()],
        quote_slippage_bps: 50,
        http_timeout: Duration::from_secs(5),
    }
}

/// Tracker over the stubs; the metadata stub is returned so tests can count fetches.
pub fn stub_tracker(config: &AppConfig) -> (Arc<PortfolioTracker>, Arc<StubMetadata>) {
    let metadata = Arc::new(StubMetadata::default());
    let tracker = build_tracker(
        config,
        Providers {
            metadata: metadata.clone(),
            balances: Arc::new(StubBalances::new()),
            quotes: Arc::new(StubQuotes),
        },
    );
    (tracker, metadata)
}
