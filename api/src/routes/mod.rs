pub mod health;
pub mod portfolio;
pub mod snapshots;
pub mod tokens;
