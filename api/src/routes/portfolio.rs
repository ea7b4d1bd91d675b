use aggregator::RefreshOutcome;
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use domain::PortfolioValuation;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/refresh", post(refresh_portfolio))
}

#[derive(Debug, Serialize)]
struct PortfolioResponse {
    #[serde(flatten)]
    valuation: PortfolioValuation,
    wallet_count: usize,
    tracked_tokens: Vec<String>,
}

async fn get_portfolio(State(state): State<AppState>) -> Json<PortfolioResponse> {
    let valuation = state.tracker.valuation().await;
    Json(PortfolioResponse {
        valuation,
        wallet_count: state.tracker.wallets().len(),
        tracked_tokens: state.tracker.tracked_tokens().await,
    })
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RefreshResponse {
    Completed { tokens: usize },
    AlreadyRunning,
}

/// Invalidates every tracked token. The next read refetches; a second
/// request while one is running is a no-op.
async fn refresh_portfolio(State(state): State<AppState>) -> (StatusCode, Json<RefreshResponse>) {
    match state.tracker.refresh_all().await {
        RefreshOutcome::Completed { tokens } => {
            (StatusCode::OK, Json(RefreshResponse::Completed { tokens }))
        }
        RefreshOutcome::AlreadyRunning => {
            (StatusCode::ACCEPTED, Json(RefreshResponse::AlreadyRunning))
        }
    }
}
