use std::{sync::Arc, time::Duration};

use aggregator::RefreshOutcome;
use tokio::{sync::Semaphore, time::sleep};
use tracing::{info, warn};

use super::portfolio::PortfolioTracker;

/// Periodic refresh: invalidate every tracked token, refetch them with
/// bounded concurrency, then quote the fresh holdings.
pub struct TokenPoller {
    tracker: Arc<PortfolioTracker>,
    interval: Duration,
    max_concurrency: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub loaded: usize,
    pub failed: usize,
    pub quoted: usize,
}

impl TokenPoller {
    pub fn new(tracker: Arc<PortfolioTracker>, interval: Duration, max_concurrency: usize) -> Self {
        Self {
            tracker,
            interval: interval.max(Duration::from_secs(1)),
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn spawn(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                sleep(self.interval).await;
                let summary = self.run_once().await;
                info!(
                    loaded = summary.loaded,
                    failed = summary.failed,
                    quoted = summary.quoted,
                    "token poll finished"
                );
            }
        });
    }

    pub async fn run_once(&self) -> PollSummary {
        if let RefreshOutcome::AlreadyRunning = self.tracker.refresh_all().await {
            info!("refresh already running, skipping poll");
            return PollSummary::default();
        }

        let mints = self.tracker.tracked_tokens().await;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(mints.len());
        for mint in mints {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let tracker = self.tracker.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = tracker.load_token(&mint).await;
                (mint, outcome)
            }));
        }

        let mut summary = PollSummary::default();
        let mut fresh = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((mint, Ok(_))) => {
                    summary.loaded += 1;
                    fresh.push(mint);
                }
                Ok((mint, Err(err))) => {
                    summary.failed += 1;
                    warn!(error = %err, mint = %mint, "token poll failed");
                }
                Err(join_err) => {
                    summary.failed += 1;
                    warn!(error = %join_err, "token poll task join error");
                }
            }
        }

        for mint in fresh {
            if self.tracker.simulate_cached(&mint).await.is_some() {
                summary.quoted += 1;
            }
        }
        summary
    }
}
