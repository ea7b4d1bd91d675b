use std::sync::Arc;

use aggregator::{
    AggregationCache, BalanceAggregator, PortfolioReducer, RetryPolicy, StableAssets,
    StaleCache, SwapQuoteCache, SwapQuoteProvider, SwapSimulator, TokenAggregator,
    TokenMetadataProvider, TrackedTokenSet, TrackedTokens, WalletBalanceProvider,
};
use anyhow::{Context, Result};
use reqwest::Client;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    repositories::{
        InMemoryPortfolioSnapshotRepository, PortfolioSnapshotRepository,
        PostgresPortfolioSnapshotRepository,
    },
    services::{
        DexScreenerClient, JupiterQuoteClient, PortfolioTracker, SnapshotScheduler,
        SolanaRpcClient, TokenPoller,
    },
    state::AppState,
};

/// The three upstream data sources the pipeline reads from.
pub struct Providers {
    pub metadata: Arc<dyn TokenMetadataProvider>,
    pub balances: Arc<dyn WalletBalanceProvider>,
    pub quotes: Arc<dyn SwapQuoteProvider>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("failed to build http client")?;
        if config.rpc_url.is_none() {
            warn!("RPC_URL not set, every wallet balance will read as zero");
        }
        Ok(Self {
            metadata: Arc::new(DexScreenerClient::new(
                client.clone(),
                config.dexscreener_api_base.clone(),
            )),
            balances: Arc::new(SolanaRpcClient::new(client.clone(), config.rpc_url.clone())),
            quotes: Arc::new(JupiterQuoteClient::new(
                client,
                config.jupiter_api_base.clone(),
                config.quote_slippage_bps,
            )),
        })
    }
}

/// Wires the aggregation pipeline. One stale cache, one live cache and one
/// quote cache per tracker; nothing here touches the network.
pub fn build_tracker(config: &AppConfig, providers: Providers) -> Arc<PortfolioTracker> {
    let balances = BalanceAggregator::new(
        providers.balances,
        config.balance_batch_size,
        config.balance_batch_delay,
    );
    let retry = RetryPolicy::new(
        config.aggregation_max_attempts as u32,
        config.aggregation_retry_base,
    );
    let aggregator = Arc::new(TokenAggregator::new(
        providers.metadata,
        balances,
        Arc::new(StaleCache::new()),
        retry,
    ));
    let cache = Arc::new(AggregationCache::new(
        aggregator,
        config.token_data_stale_after,
    ));
    let quotes = Arc::new(SwapQuoteCache::new());
    let stable = StableAssets::new(
        config.stable_asset_mints.clone(),
        config.stable_asset_symbols.clone(),
    );
    let simulator = SwapSimulator::new(providers.quotes, quotes.clone(), stable.clone());
    let reducer = PortfolioReducer::new(cache.clone(), quotes, stable);
    let tracked = Arc::new(TrackedTokens::new(TrackedTokenSet::new(
        config.token_addresses.clone(),
    )));

    Arc::new(PortfolioTracker::new(
        config.wallet_addresses.clone(),
        tracked,
        cache,
        simulator,
        reducer,
    ))
}

pub async fn build_snapshot_repo(
    config: &AppConfig,
) -> Result<Arc<dyn PortfolioSnapshotRepository>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            sqlx::migrate!("../migrations").run(&pool).await?;
            info!("snapshots stored in postgres");
            Ok(Arc::new(PostgresPortfolioSnapshotRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, snapshots are kept in memory only");
            Ok(Arc::new(InMemoryPortfolioSnapshotRepository::new()))
        }
    }
}

pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let providers = Providers::from_config(config)?;
    let tracker = build_tracker(config, providers);
    let snapshot_repo = build_snapshot_repo(config).await?;

    info!(
        wallets = config.wallet_addresses.len(),
        tokens = config.token_addresses.len(),
        "portfolio tracker ready"
    );

    Arc::new(TokenPoller::new(
        tracker.clone(),
        config.refresh_interval,
        config.refresh_max_concurrency,
    ))
    .spawn();

    if let Some(interval) = config.snapshot_interval {
        Arc::new(SnapshotScheduler::new(
            tracker.clone(),
            snapshot_repo.clone(),
            interval,
        ))
        .spawn();
    }

    Ok(AppState {
        config: config.clone(),
        tracker,
        snapshot_repo,
    })
}
