use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::stats_page))
        .route("/rankings", get(handlers::rankings_page))
        .route("/boards/:slug", get(handlers::board_stats_page))
        .route("/boards/:slug/rankings", get(handlers::board_rankings_page))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
