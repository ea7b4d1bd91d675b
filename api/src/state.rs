use std::sync::Arc;

use crate::{
    config::AppConfig, repositories::PortfolioSnapshotRepository,
    services::PortfolioTracker,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tracker: Arc<PortfolioTracker>,
    pub snapshot_repo: Arc<dyn PortfolioSnapshotRepository>,
}

// Axum state must be shareable across worker threads.
#[allow(dead_code)]
fn _assert_state_types_are_send_sync()
where
    AppConfig: Send + Sync + 'static,
    PortfolioTracker: Send + Sync + 'static,
    dyn PortfolioSnapshotRepository: Send + Sync,
{
}

#[allow(dead_code)]
fn _assert_state_bounds() {
    fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
    assert_bounds::<AppState>();
}
