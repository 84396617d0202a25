use async_trait::async_trait;
use chrono::NaiveDate;

use crate::external::SourceError;

#[derive(Debug, Clone)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Daily history for one symbol, ascending by date.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub symbol: String,
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn prev_close(&self) -> Option<f64> {
        let n = self.bars.len();
        if n < 2 {
            return None;
        }
        Some(self.bars[n - 2].close)
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<PriceHistory, SourceError>;
}
