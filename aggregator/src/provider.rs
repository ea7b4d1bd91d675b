use anyhow::Result;
use async_trait::async_trait;
use domain::{SwapSimulationResult, TokenMetadata};

/// Wrapped SOL mint; balances for it come from the account's lamports.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

#[async_trait]
pub trait TokenMetadataProvider: Send + Sync {
    /// `Ok(None)` means the provider has no record for `mint`.
    async fn token_metadata(&self, mint: &str) -> Result<Option<TokenMetadata>>;
}

#[async_trait]
pub trait WalletBalanceProvider: Send + Sync {
    async fn native_balance(&self, wallet: &str) -> Result<f64>;
    async fn token_balance(&self, wallet: &str, mint: &str) -> Result<f64>;
}

#[async_trait]
pub trait SwapQuoteProvider: Send + Sync {
    async fn quote(&self, mint: &str, amount: f64) -> Result<SwapSimulationResult>;
}

/// Solana addresses are base58 encodings of 32-byte public keys.
pub fn is_valid_address(value: &str) -> bool {
    matches!(bs58::decode(value).into_vec(), Ok(bytes) if bytes.len() == 32)
}
