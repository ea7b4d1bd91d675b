use std::collections::HashMap;

use domain::TokenAggregationResult;
use tokio::sync::RwLock;

/// Last successful aggregation per mint, kept only as a fallback for failed
/// fetches. Lives as long as the session that owns it; never evicts.
#[derive(Default)]
pub struct StaleCache {
    entries: RwLock<HashMap<String, TokenAggregationResult>>,
}

impl StaleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, mint: &str) -> Option<TokenAggregationResult> {
        self.entries.read().await.get(mint).cloned()
    }

    pub async fn put(&self, mint: &str, result: TokenAggregationResult) {
        self.entries.write().await.insert(mint.to_string(), result);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::TokenMetadata;

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let cache = StaleCache::new();
        assert!(cache.get("m").await.is_none());

        let first = TokenAggregationResult::new("m", TokenMetadata::placeholder("m"), vec![]);
        cache.put("m", first).await;
        let mut meta = TokenMetadata::placeholder("m");
        meta.price_usd = 2.0;
        cache
            .put("m", TokenAggregationResult::new("m", meta, vec![]))
            .await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("m").await.unwrap().metadata.price_usd, 2.0);
    }
}
