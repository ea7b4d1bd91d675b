use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub price_change_24h_pct: f64,
}

impl TokenMetadata {
    /// Zero-valued record used when the metadata provider knows nothing about `mint`.
    pub fn placeholder(mint: &str) -> Self {
        Self {
            name: "Unknown Token".to_string(),
            symbol: mint.chars().take(4).collect::<String>().to_uppercase(),
            price_usd: 0.0,
            market_cap_usd: 0.0,
            liquidity_usd: 0.0,
            volume_24h_usd: 0.0,
            price_change_24h_pct: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WalletBalanceRecord {
    pub wallet_address: String,
    pub mint: String,
    pub token_amount: f64,
    pub usd_value: f64,
}

impl WalletBalanceRecord {
    pub fn valued(wallet_address: &str, mint: &str, token_amount: f64, price_usd: f64) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            mint: mint.to_string(),
            token_amount,
            usd_value: token_amount * price_usd,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenAggregationResult {
    pub mint: String,
    pub metadata: TokenMetadata,
    pub balances: Vec<WalletBalanceRecord>,
    pub total_usd_value: f64,
}

impl TokenAggregationResult {
    pub fn new(mint: &str, metadata: TokenMetadata, balances: Vec<WalletBalanceRecord>) -> Self {
        let total_usd_value = balances.iter().map(|b| b.usd_value).sum();
        Self {
            mint: mint.to_string(),
            metadata,
            balances,
            total_usd_value,
        }
    }

    /// Token amount held across every wallet.
    pub fn total_amount(&self) -> f64 {
        self.balances.iter().map(|b| b.token_amount).sum()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SwapSimulationResult {
    pub output_usd_amount: f64,
    pub price_impact_pct: f64,
    pub slippage_bps: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct PortfolioValuation {
    pub total_value_usd: f64,
    pub total_tokens: usize,
    pub sell_simulation_value_usd: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum TokenLoadState {
    Pending,
    Loaded {
        result: TokenAggregationResult,
        stale: bool,
    },
    Failed {
        error: String,
        last_result: Option<TokenAggregationResult>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub total_value_usd: f64,
    pub sell_simulation_value_usd: f64,
    pub wallet_count: u32,
    pub token_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewPortfolioSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_value_usd: f64,
    pub sell_simulation_value_usd: f64,
    pub wallet_count: u32,
    pub token_count: u32,
}

impl NewPortfolioSnapshot {
    pub fn from_valuation(
        valuation: &PortfolioValuation,
        wallet_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            total_value_usd: valuation.total_value_usd,
            sell_simulation_value_usd: valuation.sell_simulation_value_usd,
            wallet_count: wallet_count as u32,
            token_count: valuation.total_tokens as u32,
        }
    }

    /// Totals must be finite and non-negative before they reach the store.
    pub fn is_well_formed(&self) -> bool {
        [self.total_value_usd, self.sell_simulation_value_usd]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTokenRequest {
    pub mint: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSnapshotRequest {
    pub total_value_usd: f64,
    pub sell_simulation_value_usd: f64,
    #[serde(default)]
    pub wallet_count: u32,
    #[serde(default)]
    pub token_count: u32,
}
