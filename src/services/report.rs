use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{
    self, CatalogEntry, APP_NAME, HISTORY_DAYS, NEWS_LOOKBACK_DAYS, TRENDS_LOOKBACK_DAYS,
};
use crate::errors::AppError;
use crate::external::fear_greed::FearGreedProvider;
use crate::external::market_data::{MarketDataProvider, PriceHistory};
use crate::external::news::NewsProvider;
use crate::external::options::OptionsProvider;
use crate::external::ownership::OwnershipProvider;
use crate::external::reddit::SocialMentionsProvider;
use crate::external::trends::SearchInterestProvider;
use crate::external::SourceError;
use crate::models::{
    AnalyzeRequest, AppInfo, Confidence, Headline, MarketSeriesInfo, Report, ReportMetadata,
    ReportSources, SentimentSnapshot, SourceResult, TechnicalSnapshot,
};
use crate::services::insights::{InsightInputs, InsightService};
use crate::services::{sentiment, technical};

const DISCLAIMER: &str =
    "Educational research tool. Not financial advice. Data may be delayed or incomplete.";

/// Runs one source fetch under a deadline, retrying once on a transient
/// failure. The deadline covers both attempts. Whatever happens, the source
/// keeps its slot in the report.
async fn run_source<T, F, Fut>(
    name: &str,
    confidence: Confidence,
    deadline: Duration,
    mut call: F,
) -> SourceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let outcome = tokio::time::timeout(deadline, async {
        match call().await {
            Err(e) if e.is_transient() => {
                warn!("Source {} failed transiently ({}). Retrying once...", name, e);
                call().await
            }
            other => other,
        }
    })
    .await;

    let result = match outcome {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(deadline)),
    };

    match result {
        Ok(payload) => SourceResult::available(name, confidence, payload),
        Err(e) => {
            warn!("Source {} unavailable: {}", name, e);
            SourceResult::degraded(name, confidence, e.status(), e.to_string())
        }
    }
}

/// Assembles full research reports by fanning out to every upstream source,
/// computing the derived sections and asking the insight generator for
/// commentary. Market data is the only source allowed to fail the request.
pub struct ReportService {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    social: Arc<dyn SocialMentionsProvider>,
    trends: Arc<dyn SearchInterestProvider>,
    fear_greed: Arc<dyn FearGreedProvider>,
    options: Arc<dyn OptionsProvider>,
    ownership: Arc<dyn OwnershipProvider>,
    insights: Arc<InsightService>,
    source_timeout: Duration,
}

impl ReportService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        social: Arc<dyn SocialMentionsProvider>,
        trends: Arc<dyn SearchInterestProvider>,
        fear_greed: Arc<dyn FearGreedProvider>,
        options: Arc<dyn OptionsProvider>,
        ownership: Arc<dyn OwnershipProvider>,
        insights: Arc<InsightService>,
        source_timeout: Duration,
    ) -> Self {
        Self {
            market,
            news,
            social,
            trends,
            fear_greed,
            options,
            ownership,
            insights,
            source_timeout,
        }
    }

    /// Headline search. The display name gives the better coverage, but a
    /// thinly covered name can still match on the bare ticker.
    async fn fetch_headlines(&self, entry: &CatalogEntry) -> Result<Vec<Headline>, SourceError> {
        match self.news.fetch_headlines(entry.name, NEWS_LOOKBACK_DAYS).await {
            Ok(headlines) if !headlines.is_empty() => Ok(headlines),
            _ => {
                let ticker = config::clean_symbol(entry.symbol);
                self.news.fetch_headlines(&ticker, NEWS_LOOKBACK_DAYS).await
            }
        }
    }

    pub async fn build_report(&self, request: AnalyzeRequest) -> Result<Report, AppError> {
        let entry = config::lookup(&request.identifier)
            .ok_or_else(|| AppError::UnknownAsset(request.identifier.clone()))?;

        if entry.class != request.asset_class {
            return Err(AppError::Validation(format!(
                "{} is listed as {}, not {}",
                entry.symbol,
                entry.class.as_str(),
                request.asset_class.as_str()
            )));
        }

        info!("📊 Building research report for {}", entry.symbol);

        // Market data first. Without a price series there is nothing to report on.
        let market = run_source(
            "market_data",
            Confidence::High,
            self.source_timeout,
            || self.market.fetch_daily_history(entry.symbol, HISTORY_DAYS as u32),
        )
        .await;

        let history = match market.payload.as_ref() {
            Some(history) if market.is_available() => history.clone(),
            _ => {
                let detail = market
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "no price series returned".to_string());
                return Err(AppError::MarketData(detail));
            }
        };

        let metadata = build_metadata(entry, &history);

        let technical = match technical::build_snapshot(&history) {
            Ok(snapshot) => {
                SourceResult::available("technical_indicators", Confidence::High, snapshot)
            }
            Err(note) => {
                warn!("Technical section skipped: {}", note);
                SourceResult::degraded(
                    "technical_indicators",
                    Confidence::High,
                    crate::models::SourceStatus::Unavailable,
                    note,
                )
            }
        };

        info!("Fanning out to supplementary sources for {}", entry.symbol);

        let (news, social, search, fear_greed, options, insider, institutional) = tokio::join!(
            run_source("news", Confidence::Medium, self.source_timeout, || {
                self.fetch_headlines(entry)
            }),
            run_source("social_mentions", Confidence::Low, self.source_timeout, || {
                self.social.fetch_mentions(entry.symbol, entry.class)
            }),
            run_source("search_interest", Confidence::Low, self.source_timeout, || {
                self.trends.fetch_interest(entry.name, TRENDS_LOOKBACK_DAYS)
            }),
            run_source("fear_greed", Confidence::Context, self.source_timeout, || {
                self.fear_greed.fetch_index()
            }),
            run_source("options", Confidence::Medium, self.source_timeout, || {
                self.options.fetch_summary(entry.symbol)
            }),
            run_source("insider_activity", Confidence::Medium, self.source_timeout, || {
                self.ownership.fetch_insider_activity(entry.symbol)
            }),
            run_source("institutional_ownership", Confidence::Medium, self.source_timeout, || {
                self.ownership.fetch_institutional(entry.symbol)
            }),
        );

        info!("Aggregating sentiment signals for {}", entry.symbol);

        let sentiment = sentiment::aggregate(
            fear_greed.payload.as_ref(),
            search.payload.as_ref(),
            social.payload.as_ref(),
        );

        let empty_headlines = Vec::new();
        let headlines = news.payload.as_deref().unwrap_or(&empty_headlines);

        info!("Enriching report for {} with AI commentary", entry.symbol);

        let ai_insights = self
            .insights
            .generate_bundle(&InsightInputs {
                metadata: &metadata,
                technical: technical.payload.as_ref(),
                sentiment: &sentiment,
                headlines,
                options: options.payload.as_ref(),
                insider: insider.payload.as_ref(),
            })
            .await;

        let sources = ReportSources {
            market_data: SourceResult::available(
                "market_data",
                Confidence::High,
                series_info(&history),
            ),
            news,
            social_mentions: social,
            search_interest: search,
            fear_greed,
            options,
            insider,
            institutional,
        };

        let summary = build_summary(&metadata, &technical, &sentiment, &sources);

        info!("✓ Report ready for {}", entry.symbol);

        Ok(Report {
            request,
            metadata,
            technical,
            sentiment,
            ai_insights,
            sources,
            summary,
            disclaimer: DISCLAIMER.to_string(),
            generated_at: Utc::now(),
            app: AppInfo {
                name: APP_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }
}

fn build_metadata(entry: &CatalogEntry, history: &PriceHistory) -> ReportMetadata {
    let current_price = history.last_close().unwrap_or(0.0);
    let prev_close = history.prev_close();

    let price_change = prev_close.map(|prev| current_price - prev).unwrap_or(0.0);
    let price_change_pct = match prev_close {
        Some(prev) if prev != 0.0 => (current_price - prev) / prev * 100.0,
        _ => 0.0,
    };

    ReportMetadata {
        symbol: entry.symbol.to_string(),
        name: entry.name.to_string(),
        asset_class: entry.class,
        currency: history.currency.clone(),
        current_price,
        price_change,
        price_change_pct,
    }
}

fn series_info(history: &PriceHistory) -> MarketSeriesInfo {
    let first_date = history.bars.first().map(|b| b.date).unwrap_or_default();
    let last_date = history.bars.last().map(|b| b.date).unwrap_or_default();

    MarketSeriesInfo {
        bars: history.bars.len(),
        first_date,
        last_date,
    }
}

/// Plain-language recap stitched from the sections that are present.
fn build_summary(
    metadata: &ReportMetadata,
    technical: &SourceResult<TechnicalSnapshot>,
    sentiment: &SentimentSnapshot,
    sources: &ReportSources,
) -> String {
    let mut parts = Vec::new();

    let direction = if metadata.price_change_pct > 0.0 {
        format!("up {:.2}% on the day", metadata.price_change_pct)
    } else if metadata.price_change_pct < 0.0 {
        format!("down {:.2}% on the day", metadata.price_change_pct.abs())
    } else {
        "flat on the day".to_string()
    };
    parts.push(format!(
        "{} ({}) last traded at {:.2}, {}.",
        metadata.name, metadata.symbol, metadata.current_price, direction
    ));

    match technical.payload.as_ref() {
        Some(snapshot) => parts.push(format!(
            "Technical indicators read {:?} with RSI(14) at {:.1}.",
            snapshot.overall_signal, snapshot.rsi.value
        )),
        None => parts.push("Technical indicators are unavailable for this series.".to_string()),
    }

    match sentiment {
        SentimentSnapshot::Assessed { description, .. } => parts.push(description.clone()),
        SentimentSnapshot::InsufficientData { .. } => {
            parts.push("Crowd sentiment could not be assessed this run.".to_string())
        }
    }

    let down = [
        &sources.news.status,
        &sources.social_mentions.status,
        &sources.search_interest.status,
        &sources.fear_greed.status,
        &sources.options.status,
        &sources.insider.status,
        &sources.institutional.status,
    ]
    .iter()
    .filter(|status| ***status != crate::models::SourceStatus::Available)
    .count();

    if down > 0 {
        parts.push(format!(
            "{} of 7 supplementary sources did not respond; their sections are marked accordingly.",
            down
        ));
    }

    parts.join(" ")
}
