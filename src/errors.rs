use axum::response::IntoResponse;
use axum::Json;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Market data unavailable: {0}")]
    MarketData(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::UnknownAsset(symbol) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "status": "error",
                    "error": format!("Unknown asset: {}. See /api/assets for the supported list.", symbol),
                })),
            )
                .into_response(),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "error": msg })),
            )
                .into_response(),
            AppError::MarketData(msg) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "status": "error",
                    "error": format!("No usable market data: {}", msg),
                })),
            )
                .into_response(),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": msg })),
            )
                .into_response(),
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}
