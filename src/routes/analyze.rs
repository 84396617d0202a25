use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{AnalyzeRequest, Report};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

/// POST /api/analyze
///
/// Builds a full research report for one cataloged asset. Supplementary
/// sources may be degraded in the response; only missing market data turns
/// into an error.
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Report>, AppError> {
    info!(
        "POST /analyze - identifier={}, asset_class={}",
        request.identifier,
        request.asset_class.as_str()
    );

    let report = state.report_service.build_report(request).await?;

    Ok(Json(report))
}
