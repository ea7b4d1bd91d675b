use std::{collections::HashMap, sync::Arc, time::Duration};

use domain::{TokenAggregationResult, TokenLoadState};
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use tracing::debug;

use crate::{error::AggregationError, orchestrator::TokenAggregator};

pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60);

#[derive(Default)]
struct Entry {
    result: Option<TokenAggregationResult>,
    error: Option<String>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    // Bumped by every invalidation so a fetch that overlaps one can't mark
    // the entry fresh again.
    generation: u64,
}

impl Entry {
    fn is_fresh(&self, stale_after: Duration) -> bool {
        !self.invalidated
            && self
                .fetched_at
                .map(|at| at.elapsed() < stale_after)
                .unwrap_or(false)
    }
}

/// Live cache of aggregation results keyed by mint. Reads through the
/// orchestrator when an entry is missing, expired, or invalidated, and lets
/// only one fetch per mint run at a time.
pub struct AggregationCache {
    aggregator: Arc<TokenAggregator>,
    stale_after: Duration,
    entries: RwLock<HashMap<String, Entry>>,
    fetch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AggregationCache {
    pub fn new(aggregator: Arc<TokenAggregator>, stale_after: Duration) -> Self {
        Self {
            aggregator,
            stale_after,
            entries: RwLock::new(HashMap::new()),
            fetch_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_fetch(
        &self,
        mint: &str,
        wallets: &[String],
    ) -> Result<TokenAggregationResult, AggregationError> {
        if let Some(hit) = self.fresh(mint).await {
            return Ok(hit);
        }

        let lock = self.fetch_lock(mint).await;
        let _guard = lock.lock().await;
        // Another caller may have finished the fetch while we waited.
        if let Some(hit) = self.fresh(mint).await {
            debug!(mint, "joined in-flight token fetch");
            return Ok(hit);
        }

        let started_at = self.generation(mint).await;
        let outcome = self.aggregator.aggregate(mint, wallets).await;
        let mut entries = self.entries.write().await;
        let entry = entries.entry(mint.to_string()).or_default();
        match &outcome {
            Ok(result) => {
                entry.result = Some(result.clone());
                entry.error = None;
                if entry.generation == started_at {
                    entry.fetched_at = Some(Instant::now());
                    entry.invalidated = false;
                } else {
                    debug!(mint, "token invalidated during fetch, keeping it stale");
                }
            }
            Err(err) => {
                entry.error = Some(err.to_string());
            }
        }
        outcome
    }

    /// Cached data regardless of freshness; never fetches.
    pub async fn peek(&self, mint: &str) -> Option<TokenAggregationResult> {
        self.entries
            .read()
            .await
            .get(mint)
            .and_then(|entry| entry.result.clone())
    }

    /// Marks the entry so the next read refetches. Returns whether an entry existed.
    pub async fn invalidate(&self, mint: &str) -> bool {
        match self.entries.write().await.get_mut(mint) {
            Some(entry) => {
                entry.invalidated = true;
                entry.generation += 1;
                true
            }
            None => false,
        }
    }

    pub async fn state(&self, mint: &str) -> TokenLoadState {
        let entries = self.entries.read().await;
        match entries.get(mint) {
            Some(Entry {
                error: Some(error),
                result,
                ..
            }) => TokenLoadState::Failed {
                error: error.clone(),
                last_result: result.clone(),
            },
            Some(entry) => match &entry.result {
                Some(result) => TokenLoadState::Loaded {
                    result: result.clone(),
                    stale: !entry.is_fresh(self.stale_after),
                },
                None => TokenLoadState::Pending,
            },
            None => TokenLoadState::Pending,
        }
    }

    async fn fresh(&self, mint: &str) -> Option<TokenAggregationResult> {
        let entries = self.entries.read().await;
        entries
            .get(mint)
            .filter(|entry| entry.is_fresh(self.stale_after))
            .and_then(|entry| entry.result.clone())
    }

    async fn generation(&self, mint: &str) -> u64 {
        self.entries
            .read()
            .await
            .get(mint)
            .map(|entry| entry.generation)
            .unwrap_or(0)
    }

    async fn fetch_lock(&self, mint: &str) -> Arc<Mutex<()>> {
        self.fetch_locks
            .lock()
            .await
            .entry(mint.to_string())
            .or_default()
            .clone()
    }
}
