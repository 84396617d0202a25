mod app;
mod config;
mod errors;
mod external;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::external::fear_greed::AlternativeMeProvider;
use crate::external::market_data::MarketDataProvider;
use crate::external::multi_market::MultiMarketProvider;
use crate::external::news::{NewsApiProvider, NewsConfig};
use crate::external::options::YahooOptionsProvider;
use crate::external::ownership::YahooOwnershipProvider;
use crate::external::reddit::{RedditConfig, RedditProvider};
use crate::external::stooq::StooqProvider;
use crate::external::trends::GoogleTrendsProvider;
use crate::external::yahoo_chart::YahooChartProvider;
use crate::logging::{init_logging, LoggingConfig};
use crate::services::insights::{InsightConfig, InsightService};
use crate::services::report::ReportService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env();

    // Select market data provider based on MARKET_PROVIDER env var (defaults to multi)
    let provider_name =
        std::env::var("MARKET_PROVIDER").unwrap_or_else(|_| "multi".to_string());

    let market: Arc<dyn MarketDataProvider> = match provider_name.to_lowercase().as_str() {
        "yahoo" => {
            tracing::info!("📊 Using market data provider: Yahoo only");
            Arc::new(YahooChartProvider::new())
        }
        "stooq" => {
            tracing::info!("📊 Using market data provider: Stooq only");
            Arc::new(StooqProvider::new())
        }
        "multi" => {
            tracing::info!("📊 Using market data provider: Multi-provider (Yahoo + Stooq fallback)");
            Arc::new(MultiMarketProvider::new(
                Box::new(YahooChartProvider::new()),
                Box::new(StooqProvider::new()),
            ))
        }
        _ => {
            panic!(
                "Invalid MARKET_PROVIDER: {}. Must be 'yahoo', 'stooq', or 'multi'",
                provider_name
            );
        }
    };

    let report_service = ReportService::new(
        market,
        Arc::new(NewsApiProvider::new(NewsConfig::from_env())),
        Arc::new(RedditProvider::new(RedditConfig::from_env())),
        Arc::new(GoogleTrendsProvider::new()),
        Arc::new(AlternativeMeProvider::new()),
        Arc::new(YahooOptionsProvider::new()),
        Arc::new(YahooOwnershipProvider::new()),
        Arc::new(InsightService::new(InsightConfig::from_env())),
        config.source_timeout,
    );

    let state = AppState {
        report_service: Arc::new(report_service),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Tickerlens backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
