use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{NewPortfolioSnapshot, PortfolioSnapshot};
use sqlx::{postgres::PgRow, PgPool, Row};
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait PortfolioSnapshotRepository: Send + Sync {
    async fn insert(&self, snapshot: &NewPortfolioSnapshot) -> Result<PortfolioSnapshot>;
    /// Newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<PortfolioSnapshot>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Snapshots with `from <= timestamp <= to`, newest first.
    async fn range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PortfolioSnapshot>>;
}

fn ensure_well_formed(snapshot: &NewPortfolioSnapshot) -> Result<()> {
    if !snapshot.is_well_formed() {
        anyhow::bail!("snapshot totals must be finite and non-negative");
    }
    Ok(())
}

#[derive(Clone)]
pub struct PostgresPortfolioSnapshotRepository {
    pool: PgPool,
}

impl PostgresPortfolioSnapshotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SNAPSHOT_COLUMNS: &str = "id, snapshot_time, total_value_usd::float8 AS total_value_usd,
    sell_simulation_value_usd::float8 AS sell_simulation_value_usd,
    wallet_count, token_count, created_at";

fn snapshot_from_row(row: PgRow) -> Result<PortfolioSnapshot> {
    let wallet_count: i32 = row.try_get("wallet_count")?;
    let token_count: i32 = row.try_get("token_count")?;
    Ok(PortfolioSnapshot {
        id: row.try_get("id")?,
        timestamp: row.try_get("snapshot_time")?,
        total_value_usd: row.try_get("total_value_usd")?,
        sell_simulation_value_usd: row.try_get("sell_simulation_value_usd")?,
        wallet_count: wallet_count.max(0) as u32,
        token_count: token_count.max(0) as u32,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl PortfolioSnapshotRepository for PostgresPortfolioSnapshotRepository {
    async fn insert(&self, snapshot: &NewPortfolioSnapshot) -> Result<PortfolioSnapshot> {
        ensure_well_formed(snapshot)?;
        let row = sqlx::query(&format!(
            "INSERT INTO portfolio_snapshots
                (id, snapshot_time, total_value_usd, sell_simulation_value_usd, wallet_count, token_count)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SNAPSHOT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(snapshot.timestamp)
        .bind(snapshot.total_value_usd)
        .bind(snapshot.sell_simulation_value_usd)
        .bind(snapshot.wallet_count as i32)
        .bind(snapshot.token_count as i32)
        .fetch_one(&self.pool)
        .await?;
        snapshot_from_row(row)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PortfolioSnapshot>> {
        let rows = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM portfolio_snapshots
             ORDER BY snapshot_time DESC LIMIT $1"
        ))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(snapshot_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM portfolio_snapshots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PortfolioSnapshot>> {
        let rows = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM portfolio_snapshots
             WHERE snapshot_time >= $1 AND snapshot_time <= $2
             ORDER BY snapshot_time DESC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(snapshot_from_row).collect()
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryPortfolioSnapshotRepository {
    snapshots: RwLock<Vec<PortfolioSnapshot>>,
}

impl InMemoryPortfolioSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(snapshots: &mut [PortfolioSnapshot]) {
    snapshots.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl PortfolioSnapshotRepository for InMemoryPortfolioSnapshotRepository {
    async fn insert(&self, snapshot: &NewPortfolioSnapshot) -> Result<PortfolioSnapshot> {
        ensure_well_formed(snapshot)?;
        let saved = PortfolioSnapshot {
            id: Uuid::new_v4(),
            timestamp: snapshot.timestamp,
            total_value_usd: snapshot.total_value_usd,
            sell_simulation_value_usd: snapshot.sell_simulation_value_usd,
            wallet_count: snapshot.wallet_count,
            token_count: snapshot.token_count,
            created_at: Utc::now(),
        };
        self.snapshots.write().await.push(saved.clone());
        Ok(saved)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PortfolioSnapshot>> {
        let mut all = self.snapshots.read().await.clone();
        newest_first(&mut all);
        all.truncate(limit.max(1) as usize);
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut snapshots = self.snapshots.write().await;
        let before = snapshots.len();
        snapshots.retain(|s| s.id != id);
        Ok(snapshots.len() != before)
    }

    async fn range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PortfolioSnapshot>> {
        let mut matching: Vec<_> = self
            .snapshots
            .read()
            .await
            .iter()
            .filter(|s| s.timestamp >= from && s.timestamp <= to)
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }
}
