use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    wallets: usize,
    tokens: usize,
    refreshing: bool,
    balance_batch_size: usize,
    aggregation_max_attempts: usize,
    refresh_interval_secs: u64,
}

async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        wallets: state.tracker.wallets().len(),
        tokens: state.tracker.tracked_tokens().await.len(),
        refreshing: state.tracker.is_refreshing(),
        balance_batch_size: state.config.balance_batch_size,
        aggregation_max_attempts: state.config.aggregation_max_attempts,
        refresh_interval_secs: state.config.refresh_interval.as_secs(),
    })
}
