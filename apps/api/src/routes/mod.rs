pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extract::handlers as upload;
use crate::query::handlers as query;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes",
            post(upload::handle_upload).get(query::handle_list_resumes),
        )
        .route("/api/v1/resumes/search", get(query::handle_search))
        .route("/api/v1/resumes/stats", get(query::handle_stats))
        .route(
            "/api/v1/resumes/distribution",
            get(query::handle_distribution),
        )
        .route(
            "/api/v1/resumes/experience",
            get(query::handle_experience_analysis),
        )
        .route("/api/v1/resumes/:id", get(query::handle_get_resume))
        .route(
            "/api/v1/resumes/:id/similar",
            get(query::handle_find_similar),
        )
        .with_state(state)
}
