use std::{env, time::Duration};

use aggregator::USDC_MINT;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub token_addresses: Vec<String>,
    pub wallet_addresses: Vec<String>,
    pub rpc_url: Option<String>,
    pub dexscreener_api_base: String,
    pub jupiter_api_base: String,
    pub database_url: Option<String>,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub balance_batch_size: usize,
    pub balance_batch_delay: Duration,
    pub aggregation_max_attempts: usize,
    pub aggregation_retry_base: Duration,
    pub token_data_stale_after: Duration,
    pub refresh_interval: Duration,
    pub refresh_max_concurrency: usize,
    /// `None` disables periodic snapshots.
    pub snapshot_interval: Option<Duration>,
    pub stable_asset_mints: Vec<String>,
    pub stable_asset_symbols: Vec<String>,
    pub quote_slippage_bps: u32,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Reads everything from the environment. Malformed values fall back to
    /// their defaults so a bad variable never keeps the service from booting.
    pub fn from_env() -> Self {
        let stable_asset_mints = parse_list("STABLE_ASSET_MINTS")
            .unwrap_or_else(|| vec![USDC_MINT.to_string()]);
        let stable_asset_symbols =
            parse_list("STABLE_ASSET_SYMBOLS").unwrap_or_else(|| vec!["USDC".to_string()]);
        let snapshot_interval = Some(parse_duration_seconds("SNAPSHOT_INTERVAL_SECS", 0))
            .filter(|interval| !interval.is_zero());

        Self {
            token_addresses: parse_list("TOKEN_ADDRESSES").unwrap_or_default(),
            wallet_addresses: parse_list("WALLET_ADDRESSES").unwrap_or_default(),
            rpc_url: non_empty_var("RPC_URL"),
            dexscreener_api_base: non_empty_var("DEXSCREENER_API_BASE")
                .unwrap_or_else(|| "https://api.dexscreener.com".to_string()),
            jupiter_api_base: non_empty_var("JUPITER_API_BASE")
                .unwrap_or_else(|| "https://quote-api.jup.ag/v6".to_string()),
            database_url: non_empty_var("DATABASE_URL"),
            port: parse_number("PORT", 8081),
            frontend_origins: parse_origins(),
            balance_batch_size: parse_usize("BALANCE_BATCH_SIZE", 3),
            balance_batch_delay: parse_duration_millis("BALANCE_BATCH_DELAY_MS", 1000),
            aggregation_max_attempts: parse_usize("AGGREGATION_MAX_ATTEMPTS", 4),
            aggregation_retry_base: parse_duration_millis("AGGREGATION_RETRY_BASE_MS", 2000),
            token_data_stale_after: parse_duration_seconds("TOKEN_DATA_STALE_SECS", 60),
            refresh_interval: parse_duration_seconds("REFRESH_INTERVAL_SECS", 60),
            refresh_max_concurrency: parse_usize("REFRESH_MAX_CONCURRENCY", 4),
            snapshot_interval,
            stable_asset_mints,
            stable_asset_symbols,
            quote_slippage_bps: parse_number("QUOTE_SLIPPAGE_BPS", 50),
            http_timeout: parse_duration_seconds("HTTP_TIMEOUT_SECS", 15),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_origins() -> Vec<String> {
    parse_list("FRONTEND_ORIGINS").unwrap_or_else(|| vec!["http://localhost:3000".to_string()])
}

fn parse_list(key: &str) -> Option<Vec<String>> {
    env::var(key).ok().map(|raw| split_list(&raw))
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|item| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_duration_seconds(key: &str, default: u64) -> Duration {
    Duration::from_secs(parse_number(key, default))
}

fn parse_duration_millis(key: &str, default: u64) -> Duration {
    Duration::from_millis(parse_number(key, default))
}

fn parse_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
