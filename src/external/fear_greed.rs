use async_trait::async_trait;
use serde::Deserialize;

use crate::external::SourceError;
use crate::models::FearGreedReading;

#[async_trait]
pub trait FearGreedProvider: Send + Sync {
    /// Latest market-wide fear/greed index value (0-100).
    async fn fetch_index(&self) -> Result<FearGreedReading, SourceError>;
}

/// Client for alternative.me's free crypto fear & greed endpoint.
pub struct AlternativeMeProvider {
    client: reqwest::Client,
}

impl AlternativeMeProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AlternativeMeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

// The API serializes the numeric value as a string
#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
}

fn interpret(value: u32) -> &'static str {
    if value <= 25 {
        "Extreme fear in the market. Historically these levels have coincided with capitulation."
    } else if value <= 45 {
        "Fear. Investors are cautious and risk appetite is below normal."
    } else if value <= 55 {
        "Neutral. No strong crowd bias in either direction."
    } else if value <= 75 {
        "Greed. Risk appetite is elevated and optimism is the dominant mood."
    } else {
        "Extreme greed. Crowded optimism that has often preceded pullbacks."
    }
}

#[async_trait]
impl FearGreedProvider for AlternativeMeProvider {
    async fn fetch_index(&self) -> Result<FearGreedReading, SourceError> {
        let resp = self
            .client
            .get("https://api.alternative.me/fng/")
            .query(&[("limit", "1")])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body: FngResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let entry = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::BadResponse("empty data array".into()))?;

        let value: u32 = entry
            .value
            .parse()
            .map_err(|_| SourceError::Parse(format!("non-numeric index value: {}", entry.value)))?;

        Ok(FearGreedReading {
            value,
            classification: entry.value_classification,
            interpretation: interpret(value).to_string(),
        })
    }
}
