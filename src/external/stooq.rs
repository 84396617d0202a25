use async_trait::async_trait;
use chrono::NaiveDate;

use crate::external::market_data::{MarketDataProvider, PriceBar, PriceHistory};
use crate::external::SourceError;

/// Daily-close fallback backed by stooq.com CSV downloads. Covers US stocks,
/// the major indices and continuous futures; crypto pairs have no stooq code.
pub struct StooqProvider {
    client: reqwest::Client,
}

impl StooqProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn stooq_symbol(symbol: &str) -> Option<String> {
    match symbol {
        "^GSPC" => Some("^spx".to_string()),
        "^DJI" => Some("^dji".to_string()),
        "^IXIC" => Some("^ndq".to_string()),
        "GC=F" => Some("gc.f".to_string()),
        "CL=F" => Some("cl.f".to_string()),
        s if s.ends_with("-USD") => None,
        s => Some(format!("{}.us", s.to_ascii_lowercase())),
    }
}

#[async_trait]
impl MarketDataProvider for StooqProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<PriceHistory, SourceError> {
        let stooq = stooq_symbol(symbol).ok_or_else(|| {
            SourceError::BadResponse(format!("no stooq mapping for {symbol}"))
        })?;

        let url = format!("https://stooq.com/q/d/l/?s={stooq}&i=d");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let text = resp
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        // Stooq answers bad symbols with an HTML page or a bare "No data" line
        if text.starts_with('<') || text.trim().eq_ignore_ascii_case("no data") {
            return Err(SourceError::BadResponse(format!("no data for {stooq}")));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut bars = Vec::new();

        for record in reader.records() {
            let record = record.map_err(|e| SourceError::Parse(e.to_string()))?;

            // Date,Open,High,Low,Close,Volume with "-" for gaps
            let Some(date) = record
                .get(0)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            else {
                continue;
            };
            let Some(close) = record.get(4).and_then(|c| c.parse::<f64>().ok()) else {
                continue;
            };
            let volume = record.get(5).and_then(|v| v.parse::<u64>().ok());

            bars.push(PriceBar {
                date,
                close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(SourceError::BadResponse(format!("empty history for {stooq}")));
        }

        bars.sort_by_key(|b| b.date);

        // The download is full-history; keep only the requested window
        if bars.len() > days as usize {
            let cut = bars.len() - days as usize;
            bars.drain(..cut);
        }

        Ok(PriceHistory {
            symbol: symbol.to_string(),
            currency: None,
            bars,
        })
    }
}
