use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::config::APP_NAME;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

/// GET /api/health
async fn health() -> Json<Value> {
    info!("GET /health - Health check");

    Json(json!({
        "status": "healthy",
        "app": APP_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
