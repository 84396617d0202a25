use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{analyze, health, meta};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(meta::router())
        .nest("/health", health::router())
        .nest("/analyze", analyze::router());

    Router::<AppState>::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
