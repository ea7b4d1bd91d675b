use tokio::sync::RwLock;

/// Ordered set of mints; order only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedTokenSet {
    mints: Vec<String>,
}

impl TrackedTokenSet {
    pub fn new(mints: impl IntoIterator<Item = String>) -> Self {
        let mut set = Self::default();
        for mint in mints {
            set.add(&mint);
        }
        set
    }

    /// Returns false when the mint is blank or already tracked.
    pub fn add(&mut self, mint: &str) -> bool {
        let mint = mint.trim();
        if mint.is_empty() || self.contains(mint) {
            return false;
        }
        self.mints.push(mint.to_string());
        true
    }

    pub fn remove(&mut self, mint: &str) -> bool {
        let before = self.mints.len();
        self.mints.retain(|m| m != mint);
        self.mints.len() != before
    }

    pub fn clear(&mut self) {
        self.mints.clear();
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.mints.iter().any(|m| m == mint)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.mints
    }

    pub fn len(&self) -> usize {
        self.mints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
    }
}

/// Session-wide handle to the tracked set.
#[derive(Default)]
pub struct TrackedTokens {
    inner: RwLock<TrackedTokenSet>,
}

impl TrackedTokens {
    pub fn new(initial: TrackedTokenSet) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    pub async fn add(&self, mint: &str) -> bool {
        self.inner.write().await.add(mint)
    }

    pub async fn remove(&self, mint: &str) -> bool {
        self.inner.write().await.remove(mint)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn contains(&self, mint: &str) -> bool {
        self.inner.read().await.contains(mint)
    }

    pub async fn list(&self) -> Vec<String> {
        self.inner.read().await.as_slice().to_vec()
    }
}
