use std::env;

use anyhow::Context;
use api::{bootstrap::build_snapshot_repo, config::AppConfig, telemetry};
use chrono::{Duration, Utc};
use domain::NewPortfolioSnapshot;
use rand::Rng;

/// Fills the snapshot table with a few days of plausible history so the
/// chart endpoints have something to show in development.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AppConfig::from_env();
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL must be set; in-memory snapshots vanish when this tool exits");
    }
    let days: i64 = env::args()
        .nth(1)
        .map(|raw| raw.parse().context("days must be a whole number"))
        .transpose()?
        .unwrap_or(7);

    let repo = build_snapshot_repo(&config).await?;
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut saved = 0usize;

    for day in (0..=days).rev() {
        let day_start = now - Duration::days(day);
        let trend = (days - day) as f64 * 100.0;
        let total = 40_000.0 + rng.gen_range(-5_000.0..5_000.0) + trend;
        let sell = total * 0.25 + rng.gen_range(-1_000.0..1_000.0);

        for hour in [0i64, 6, 12, 18] {
            let intraday = if hour == 0 {
                0.0
            } else {
                rng.gen_range(-1_000.0..1_000.0)
            };
            let snapshot = NewPortfolioSnapshot {
                timestamp: day_start + Duration::hours(hour),
                total_value_usd: (total + intraday).max(0.0),
                sell_simulation_value_usd: (sell + intraday * 0.25).max(0.0),
                wallet_count: 13,
                token_count: 4,
            };
            match repo.insert(&snapshot).await {
                Ok(_) => saved += 1,
                Err(err) => tracing::warn!(error = %err, "failed to save seed snapshot"),
            }
        }
    }

    println!("seeded {saved} snapshots over {days} days");
    Ok(())
}
