use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::external::market_data::{MarketDataProvider, PriceBar, PriceHistory};
use crate::external::SourceError;

pub struct YahooChartProvider {
    client: reqwest::Client,
}

impl YahooChartProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YahooChartProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Vec<Option<f64>>,
    volume: Option<Vec<Option<u64>>>,
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<PriceHistory, SourceError> {
        // Yahoo supports ranges like "6mo", "1y". Map days roughly.
        let range = if days <= 30 {
            "1mo"
        } else if days <= 90 {
            "3mo"
        } else if days <= 180 {
            "6mo"
        } else if days <= 365 {
            "1y"
        } else {
            "2y"
        };

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?range={range}&interval=1d"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(err) = body.chart.error {
            return Err(SourceError::BadResponse(err.to_string()));
        }

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| SourceError::BadResponse("missing result".into()))?;

        let currency = result.meta.and_then(|m| m.currency);

        let timestamps = result
            .timestamp
            .ok_or_else(|| SourceError::BadResponse("missing timestamps".into()))?;

        // timestamp aligns with the close and volume lists by index
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::BadResponse("missing quote".into()))?;

        let volumes = quote.volume.unwrap_or_default();

        let mut bars = Vec::new();

        for (i, ts) in timestamps.iter().enumerate() {
            let close = quote.close.get(i).and_then(|v| *v);

            // skip missing closes
            let Some(close) = close else { continue };

            let dt = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| SourceError::Parse("bad timestamp".into()))?;

            bars.push(PriceBar {
                date: dt.date_naive(),
                close,
                volume: volumes.get(i).copied().flatten(),
            });
        }

        // Ensure ascending by date
        bars.sort_by_key(|b| b.date);

        Ok(PriceHistory {
            symbol: symbol.to_string(),
            currency,
            bars,
        })
    }
}
