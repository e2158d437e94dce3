//! Axum router configuration with middleware.
//!
//! All resource routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Bots
        .route(
            "/bots",
            post(handlers::bot::create_bot).get(handlers::bot::list_bots),
        )
        .route(
            "/bots/{id}",
            get(handlers::bot::get_bot)
                .put(handlers::bot::update_bot)
                .delete(handlers::bot::delete_bot),
        )
        .route("/bots/{id}/modules", get(handlers::bot::list_bot_modules))
        // Modules
        .route("/modules", post(handlers::module::create_module))
        .route(
            "/modules/{id}",
            get(handlers::module::get_module)
                .put(handlers::module::update_module)
                .delete(handlers::module::delete_module),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_router_builds_with_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).await.unwrap();
        let _router: Router = build_router(state);
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let axum::Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
