pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers as outreach;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job search
        .route("/api/v1/jobs/find", post(search::handle_find_jobs))
        .route(
            "/api/v1/jobs/search-terms",
            post(search::handle_search_terms),
        )
        // Outreach
        .route("/api/v1/outreach/preview", post(outreach::handle_preview))
        .with_state(state)
}
