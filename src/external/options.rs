use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::external::SourceError;
use crate::models::OptionsSummary;

#[async_trait]
pub trait OptionsProvider: Send + Sync {
    /// Volume and open-interest totals for the nearest expiry.
    async fn fetch_summary(&self, symbol: &str) -> Result<OptionsSummary, SourceError>;
}

/// Yahoo v7 option-chain client. Indices, crypto pairs and futures have no
/// listed chain there and come back as a bad-response error.
pub struct YahooOptionsProvider {
    client: reqwest::Client,
}

impl YahooOptionsProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YahooOptionsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: OptionChain,
}

#[derive(Debug, Deserialize)]
struct OptionChain {
    result: Option<Vec<OptionResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OptionResult {
    options: Vec<OptionBlock>,
}

#[derive(Debug, Deserialize)]
struct OptionBlock {
    #[serde(rename = "expirationDate")]
    expiration_date: Option<i64>,
    #[serde(default)]
    calls: Vec<OptionContract>,
    #[serde(default)]
    puts: Vec<OptionContract>,
}

#[derive(Debug, Deserialize)]
struct OptionContract {
    volume: Option<u64>,
    #[serde(rename = "openInterest")]
    open_interest: Option<u64>,
}

fn total_volume(contracts: &[OptionContract]) -> u64 {
    contracts.iter().filter_map(|c| c.volume).sum()
}

fn total_open_interest(contracts: &[OptionContract]) -> u64 {
    contracts.iter().filter_map(|c| c.open_interest).sum()
}

#[async_trait]
impl OptionsProvider for YahooOptionsProvider {
    async fn fetch_summary(&self, symbol: &str) -> Result<OptionsSummary, SourceError> {
        let url = format!("https://query1.finance.yahoo.com/v7/finance/options/{symbol}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body: OptionsResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(err) = body.option_chain.error {
            return Err(SourceError::BadResponse(err.to_string()));
        }

        let result = body
            .option_chain
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| SourceError::BadResponse("missing result".into()))?;

        // First block is the nearest expiry
        let block = result
            .options
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::BadResponse(format!("no option chain for {symbol}")))?;

        let total_call_volume = total_volume(&block.calls);
        let total_put_volume = total_volume(&block.puts);

        let put_call_volume_ratio = if total_call_volume > 0 {
            Some(total_put_volume as f64 / total_call_volume as f64)
        } else {
            None
        };

        Ok(OptionsSummary {
            put_call_volume_ratio,
            total_call_volume,
            total_put_volume,
            total_call_open_interest: total_open_interest(&block.calls),
            total_put_open_interest: total_open_interest(&block.puts),
            expiration_date: block
                .expiration_date
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive()),
        })
    }
}
