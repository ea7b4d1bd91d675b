use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use domain::{NewPortfolioSnapshot, PortfolioSnapshot, SaveSnapshotRequest};
use uuid::Uuid;

use crate::{error::ApiError, services::capture_snapshot, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/portfolio/snapshots",
            get(list_snapshots).post(save_snapshot),
        )
        .route("/portfolio/snapshots/capture", post(capture))
        .route("/portfolio/snapshots/range", get(snapshots_in_range))
        .route("/portfolio/snapshots/:id", delete(delete_snapshot))
}

#[derive(Debug, serde::Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

async fn list_snapshots(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<PortfolioSnapshot>>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let snapshots = state.snapshot_repo.list_recent(limit).await?;
    Ok(Json(snapshots))
}

async fn save_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<SaveSnapshotRequest>,
) -> Result<(StatusCode, Json<PortfolioSnapshot>), ApiError> {
    let snapshot = NewPortfolioSnapshot {
        timestamp: Utc::now(),
        total_value_usd: payload.total_value_usd,
        sell_simulation_value_usd: payload.sell_simulation_value_usd,
        wallet_count: payload.wallet_count,
        token_count: payload.token_count,
    };
    if !snapshot.is_well_formed() {
        return Err(ApiError::BadRequest(
            "totals must be finite and non-negative".to_string(),
        ));
    }
    let saved = state.snapshot_repo.insert(&snapshot).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn capture(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PortfolioSnapshot>), ApiError> {
    match capture_snapshot(&state.tracker, state.snapshot_repo.as_ref()).await? {
        Some(saved) => Ok((StatusCode::CREATED, Json(saved))),
        None => Err(ApiError::Conflict(
            "no token data loaded yet".to_string(),
        )),
    }
}

#[derive(Debug, serde::Deserialize)]
struct RangeQuery {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

async fn snapshots_in_range(
    State(state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<PortfolioSnapshot>>, ApiError> {
    if params.from > params.to {
        return Err(ApiError::BadRequest("`from` must not be after `to`".to_string()));
    }
    let snapshots = state.snapshot_repo.range(params.from, params.to).await?;
    Ok(Json(snapshots))
}

async fn delete_snapshot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.snapshot_repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("snapshot {id} not found")))
    }
}
