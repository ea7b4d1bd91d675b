use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info};

use crate::{query_cache::AggregationCache, tracked::TrackedTokens};

#[async_trait]
pub trait QueryInvalidator: Send + Sync {
    async fn invalidate(&self, mint: &str) -> bool;
}

#[async_trait]
impl QueryInvalidator for AggregationCache {
    async fn invalidate(&self, mint: &str) -> bool {
        AggregationCache::invalidate(self, mint).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed { tokens: usize },
    AlreadyRunning,
}

pub struct RefreshCoordinator {
    invalidator: Arc<dyn QueryInvalidator>,
    tracked: Arc<TrackedTokens>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshCoordinator {
    pub fn new(invalidator: Arc<dyn QueryInvalidator>, tracked: Arc<TrackedTokens>) -> Self {
        Self {
            invalidator,
            tracked,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Invalidates every tracked token; the next read refetches it.
    /// A call made while another is still running does nothing.
    pub async fn refresh_all(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight");
            return RefreshOutcome::AlreadyRunning;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let mints = self.tracked.list().await;
        join_all(mints.iter().map(|mint| self.invalidator.invalidate(mint))).await;
        info!(tokens = mints.len(), "token data invalidated");
        RefreshOutcome::Completed {
            tokens: mints.len(),
        }
    }
}
