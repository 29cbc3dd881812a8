use crate::AppState;
use axum::{Router, routing::get};

pub fn health_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers. Does not touch the store.
        .route("/health", get(|| async { "ok" }))
}
