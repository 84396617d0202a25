use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Shape of the daily series behind a report, kept so readers can see how
/// much history the indicators were computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSeriesInfo {
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Weekly mention count vs the baseline for a widely discussed asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MentionLevel {
    High,     // > 3x baseline
    Elevated, // > 1.5x
    Low,      // < 0.5x
    Average,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionVolume {
    pub total_mentions: u32,
    pub per_subreddit: BTreeMap<String, u32>,
    pub vs_baseline: MentionLevel,
    pub lookback_days: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,  // recent week > 1.2x the prior weeks
    Falling, // recent week < 0.8x
    Stable,
}

/// Relative search interest on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInterest {
    pub current_interest: u32,
    pub average_interest: f64,
    pub trend_direction: TrendDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_7d_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FearGreedReading {
    pub value: u32, // 0 = extreme fear, 100 = extreme greed
    pub classification: String,
    pub interpretation: String,
}

/// Aggregate volumes for the nearest expiry's option chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_call_volume_ratio: Option<f64>,
    pub total_call_volume: u64,
    pub total_put_volume: u64,
    pub total_call_open_interest: u64,
    pub total_put_open_interest: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsiderTransaction {
    pub name: String,
    pub relation: Option<String>,
    pub description: String,
    pub shares: Option<i64>,
    pub value: Option<f64>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsiderActivity {
    pub transactions: Vec<InsiderTransaction>,
    pub buy_count: u32,
    pub sell_count: u32,
    pub net_shares: i64, // bought minus sold across the window
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionalHolder {
    pub organization: String,
    pub pct_held: Option<f64>,
    pub shares: Option<i64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionalOwnership {
    pub holders: Vec<InstitutionalHolder>,
}
