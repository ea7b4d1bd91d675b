use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("invalid token mint: {0}")]
    InvalidMint(String),
    #[error("balance lookup task for wallet {wallet} failed: {message}")]
    LookupTask { wallet: String, message: String },
}
