pub mod portfolio_repository;

pub use portfolio_repository::{
    InMemoryPortfolioSnapshotRepository, PortfolioSnapshotRepository,
    PostgresPortfolioSnapshotRepository,
};
