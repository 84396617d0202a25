use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::insights::AiInsightBundle;
use super::request::{AnalyzeRequest, AssetClass};
use super::sentiment::SentimentSnapshot;
use super::source::SourceResult;
use super::sources::{
    FearGreedReading, Headline, InsiderActivity, InstitutionalOwnership, MarketSeriesInfo,
    MentionVolume, OptionsSummary, SearchInterest,
};
use super::technical::TechnicalSnapshot;

/// Identity and latest-price block at the top of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
}

/// Every source slot, mandatory and optional alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSources {
    pub market_data: SourceResult<MarketSeriesInfo>,
    pub news: SourceResult<Vec<Headline>>,
    pub social_mentions: SourceResult<MentionVolume>,
    pub search_interest: SourceResult<SearchInterest>,
    pub fear_greed: SourceResult<FearGreedReading>,
    pub options: SourceResult<OptionsSummary>,
    pub insider: SourceResult<InsiderActivity>,
    pub institutional: SourceResult<InstitutionalOwnership>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Full research report returned by `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub request: AnalyzeRequest,
    pub metadata: ReportMetadata,
    pub technical: SourceResult<TechnicalSnapshot>,
    pub sentiment: SentimentSnapshot,
    pub ai_insights: AiInsightBundle,
    pub sources: ReportSources,
    pub summary: String,
    pub disclaimer: String,
    pub generated_at: DateTime<Utc>,
    pub app: AppInfo,
}
