use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use domain::PortfolioSnapshot;
use tokio::time::sleep;
use tracing::{info, warn};

use super::portfolio::PortfolioTracker;
use crate::repositories::PortfolioSnapshotRepository;

/// Appends the current valuation to the snapshot store. Returns `None`
/// while no tracked token has loaded data, so empty portfolios are not
/// recorded as a zero valuation.
pub async fn capture_snapshot(
    tracker: &PortfolioTracker,
    repo: &dyn PortfolioSnapshotRepository,
) -> Result<Option<PortfolioSnapshot>> {
    if !tracker.has_data().await {
        return Ok(None);
    }
    let snapshot = tracker.snapshot_at(Utc::now()).await;
    let saved = repo.insert(&snapshot).await?;
    metrics::counter!("portfolio_snapshots_saved_total").increment(1);
    Ok(Some(saved))
}

pub struct SnapshotScheduler {
    tracker: Arc<PortfolioTracker>,
    repo: Arc<dyn PortfolioSnapshotRepository>,
    interval: Duration,
}

impl SnapshotScheduler {
    pub fn new(
        tracker: Arc<PortfolioTracker>,
        repo: Arc<dyn PortfolioSnapshotRepository>,
        interval: Duration,
    ) -> Self {
        Self {
            tracker,
            repo,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    pub fn spawn(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                sleep(self.interval).await;
                match capture_snapshot(&self.tracker, self.repo.as_ref()).await {
                    Ok(Some(snapshot)) => info!(
                        snapshot_id = %snapshot.id,
                        total_value_usd = snapshot.total_value_usd,
                        "portfolio snapshot saved"
                    ),
                    Ok(None) => info!("no token data yet, snapshot skipped"),
                    Err(err) => warn!(error = %err, "portfolio snapshot failed"),
                }
            }
        });
    }
}
