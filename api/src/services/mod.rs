pub mod dexscreener;
pub mod jupiter;
mod lenient;
pub mod poller;
pub mod portfolio;
pub mod scheduler;
pub mod solana_rpc;

pub use dexscreener::DexScreenerClient;
pub use jupiter::JupiterQuoteClient;
pub use poller::{PollSummary, TokenPoller};
pub use portfolio::PortfolioTracker;
pub use scheduler::{capture_snapshot, SnapshotScheduler};
pub use solana_rpc::SolanaRpcClient;
