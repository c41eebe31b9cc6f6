use crate::AppState;
use axum::{Router, routing::get};

/// API Router Module
///
/// Mounted under `/api`, outside the guard's matcher.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
}
