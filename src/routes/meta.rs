use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::config::{APP_NAME, CATALOG};
use crate::models::AssetClass;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_info))
        .route("/assets", get(supported_assets))
        .route("/disclaimer", get(disclaimer))
}

/// GET /api - service description and endpoint map
async fn api_info() -> Json<Value> {
    Json(json!({
        "app": APP_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-source investment research reports for a fixed asset catalog",
        "endpoints": {
            "POST /api/analyze": "Build a research report for one asset",
            "GET /api/assets": "List the supported assets",
            "GET /api/health": "Service health",
            "GET /api/disclaimer": "Usage disclaimer",
        },
    }))
}

/// GET /api/assets - the supported catalog grouped by class
async fn supported_assets() -> Json<Value> {
    info!("GET /assets - Listing supported assets");

    let group = |class: AssetClass| -> Vec<Value> {
        CATALOG
            .iter()
            .filter(|entry| entry.class == class)
            .map(|entry| json!({ "symbol": entry.symbol, "name": entry.name }))
            .collect()
    };

    Json(json!({
        "stocks": group(AssetClass::Stock),
        "crypto": group(AssetClass::Crypto),
        "indices": group(AssetClass::Index),
        "commodities": group(AssetClass::Commodity),
        "total": CATALOG.len(),
    }))
}

/// GET /api/disclaimer
async fn disclaimer() -> Json<Value> {
    Json(json!({
        "title": "Disclaimer",
        "content": "This tool aggregates public data for educational purposes only. \
            Nothing it produces is financial advice. Data may be delayed, incomplete \
            or wrong. Always do your own research before making investment decisions.",
    }))
}
