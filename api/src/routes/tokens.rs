use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use domain::{AddTokenRequest, SwapSimulationResult, TokenAggregationResult, TokenLoadState};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tokens",
            get(list_tokens).post(add_token).delete(clear_tokens),
        )
        .route("/tokens/:mint", get(get_token).delete(remove_token))
        .route("/tokens/:mint/simulation", get(get_simulation))
}

#[derive(Debug, Serialize)]
struct TrackedToken {
    mint: String,
    #[serde(flatten)]
    state: TokenLoadState,
}

async fn list_tokens(State(state): State<AppState>) -> Json<Vec<TrackedToken>> {
    let mut tokens = Vec::new();
    for mint in state.tracker.tracked_tokens().await {
        let load_state = state.tracker.token_state(&mint).await;
        tokens.push(TrackedToken {
            mint,
            state: load_state,
        });
    }
    Json(tokens)
}

#[derive(Debug, Serialize)]
struct AddTokenResponse {
    mint: String,
    added: bool,
}

async fn add_token(
    State(state): State<AppState>,
    Json(payload): Json<AddTokenRequest>,
) -> Result<(StatusCode, Json<AddTokenResponse>), ApiError> {
    let mint = payload.mint.trim().to_string();
    let added = state.tracker.add_token(&mint).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AddTokenResponse { mint, added })))
}

async fn clear_tokens(State(state): State<AppState>) -> StatusCode {
    state.tracker.clear_tokens().await;
    StatusCode::NO_CONTENT
}

async fn ensure_tracked(state: &AppState, mint: &str) -> Result<(), ApiError> {
    if state.tracker.is_tracked(mint).await {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("token {mint} is not tracked")))
    }
}

async fn get_token(
    State(state): State<AppState>,
    Path(mint): Path<String>,
) -> Result<Json<TokenAggregationResult>, ApiError> {
    ensure_tracked(&state, &mint).await?;
    let result = state.tracker.load_token(&mint).await?;
    Ok(Json(result))
}

async fn remove_token(
    State(state): State<AppState>,
    Path(mint): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.tracker.remove_token(&mint).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("token {mint} is not tracked")))
    }
}

/// `null` when the token is stable or nothing is held.
async fn get_simulation(
    State(state): State<AppState>,
    Path(mint): Path<String>,
) -> Result<Json<Option<SwapSimulationResult>>, ApiError> {
    ensure_tracked(&state, &mint).await?;
    let simulation = state.tracker.simulate_token(&mint).await?;
    Ok(Json(simulation))
}
