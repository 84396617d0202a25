use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::external::SourceError;
use crate::models::{SearchInterest, TrendDirection};

#[async_trait]
pub trait SearchInterestProvider: Send + Sync {
    /// Relative search interest (0-100) for `query` over the past `days`.
    async fn fetch_interest(&self, query: &str, days: i64) -> Result<SearchInterest, SourceError>;
}

/// Google Trends client using the same two-step widget flow the website does:
/// `explore` hands out a token per widget, `widgetdata/multiline` redeems it.
pub struct GoogleTrendsProvider {
    client: reqwest::Client,
}

impl GoogleTrendsProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GoogleTrendsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<TrendsWidget>,
}

#[derive(Debug, Deserialize)]
struct TrendsWidget {
    id: String,
    token: Option<String>,
    request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    #[serde(rename = "default")]
    timeline: MultilineDefault,
}

#[derive(Debug, Deserialize)]
struct MultilineDefault {
    #[serde(rename = "timelineData")]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    value: Vec<u32>,
}

/// Trends endpoints prepend `)]}',` to their JSON bodies.
fn strip_antijson(body: &str) -> Result<&str, SourceError> {
    let idx = body
        .find('{')
        .ok_or_else(|| SourceError::Parse("no JSON object in response".into()))?;
    Ok(&body[idx..])
}

fn timeframe(days: i64) -> &'static str {
    if days <= 30 {
        "today 1-m"
    } else if days <= 90 {
        "today 3-m"
    } else {
        "today 12-m"
    }
}

fn summarize(values: &[u32]) -> Option<SearchInterest> {
    let current = *values.last()?;
    let average = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;

    // Last week's average against everything before it
    let trend_direction = if values.len() >= 14 {
        let split = values.len() - 7;
        let recent = values[split..].iter().map(|v| f64::from(*v)).sum::<f64>() / 7.0;
        let earlier =
            values[..split].iter().map(|v| f64::from(*v)).sum::<f64>() / split as f64;

        if earlier == 0.0 && recent > 0.0 {
            TrendDirection::Rising
        } else if earlier > 0.0 && recent > earlier * 1.2 {
            TrendDirection::Rising
        } else if earlier > 0.0 && recent < earlier * 0.8 {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    } else {
        TrendDirection::Stable
    };

    let change_7d_pct = if values.len() >= 8 {
        let prior = f64::from(values[values.len() - 8]);
        if prior > 0.0 {
            Some((f64::from(current) - prior) / prior * 100.0)
        } else {
            None
        }
    } else {
        None
    };

    Some(SearchInterest {
        current_interest: current,
        average_interest: average,
        trend_direction,
        change_7d_pct,
    })
}

#[async_trait]
impl SearchInterestProvider for GoogleTrendsProvider {
    async fn fetch_interest(&self, query: &str, days: i64) -> Result<SearchInterest, SourceError> {
        let explore_req = json!({
            "comparisonItem": [{ "keyword": query, "geo": "", "time": timeframe(days) }],
            "category": 0,
            "property": "",
        })
        .to_string();

        let resp = self
            .client
            .get("https://trends.google.com/trends/api/explore")
            .query(&[("hl", "en-US"), ("tz", "0"), ("req", &explore_req)])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let explore: ExploreResponse = serde_json::from_str(strip_antijson(&body)?)
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == "TIMESERIES")
            .ok_or_else(|| SourceError::BadResponse("missing TIMESERIES widget".into()))?;

        let token = widget
            .token
            .ok_or_else(|| SourceError::BadResponse("widget without token".into()))?;
        let widget_req = widget
            .request
            .ok_or_else(|| SourceError::BadResponse("widget without request".into()))?;

        let widget_req = serde_json::to_string(&widget_req)
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let resp = self
            .client
            .get("https://trends.google.com/trends/api/widgetdata/multiline")
            .query(&[
                ("hl", "en-US"),
                ("tz", "0"),
                ("req", widget_req.as_str()),
                ("token", token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let multiline: MultilineResponse = serde_json::from_str(strip_antijson(&body)?)
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let values: Vec<u32> = multiline
            .timeline
            .timeline_data
            .iter()
            .filter_map(|p| p.value.first().copied())
            .collect();

        summarize(&values).ok_or_else(|| SourceError::BadResponse("empty timeline".into()))
    }
}
