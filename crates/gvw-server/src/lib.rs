// GVW server: HTTP triggers for warehouse ingest and analytics.
//
// Two entry points, both driven by external schedulers rather than users:
//
// - POST /          object-change notifications; normalize and load drop
//                   files into the warehouse (ingest module)
// - GET|POST /analytics
//                   rebuild the conflict-resolution analytics tables and
//                   dashboard views (analytics module)

pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod storage;
pub mod warehouse;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

use config::Config;
use storage::Storage;
use warehouse::Warehouse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub warehouse: Warehouse,
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.cors);

    Router::new()
        .route("/", post(ingest::handle_trigger))
        .route(
            "/analytics",
            get(analytics::handle_analytics).post(analytics::handle_analytics),
        )
        .route("/health", get(health_check))
        .with_state(state)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(cors)
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(state.warehouse.pool()).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "warehouse": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Warehouse health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
