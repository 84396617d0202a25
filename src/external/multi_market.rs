use async_trait::async_trait;
use tracing::{info, warn};

use crate::external::market_data::{MarketDataProvider, PriceHistory};
use crate::external::SourceError;

/// MultiMarketProvider chains daily-history providers.
///
/// Strategy:
/// 1. Ask the primary provider (Yahoo chart API, free, no key)
/// 2. If it is rate limited or fails, fall back to Stooq CSV downloads
/// 3. If both fail, surface one combined error for the report
pub struct MultiMarketProvider {
    primary: Box<dyn MarketDataProvider>,
    fallback: Box<dyn MarketDataProvider>,
}

impl MultiMarketProvider {
    pub fn new(
        primary: Box<dyn MarketDataProvider>,
        fallback: Box<dyn MarketDataProvider>,
    ) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl MarketDataProvider for MultiMarketProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<PriceHistory, SourceError> {
        match self.primary.fetch_daily_history(symbol, days).await {
            Ok(history) => {
                info!(
                    "✓ Successfully fetched {} bars for {} from primary provider",
                    history.bars.len(),
                    symbol
                );
                return Ok(history);
            }
            Err(SourceError::RateLimited) => {
                info!("⚠️ Primary provider rate limited for {}, trying fallback", symbol);
            }
            Err(e) => {
                warn!("Primary provider error for {}: {}", symbol, e);
            }
        }

        match self.fallback.fetch_daily_history(symbol, days).await {
            Ok(history) => {
                info!(
                    "✓ Successfully fetched {} bars for {} from fallback provider",
                    history.bars.len(),
                    symbol
                );
                Ok(history)
            }
            Err(e) => {
                warn!("Fallback provider failed for {}: {}", symbol, e);
                Err(SourceError::BadResponse(format!(
                    "Failed to fetch {} from all providers (Yahoo, Stooq). \
                    The symbol may not exist, or all providers are down.",
                    symbol
                )))
            }
        }
    }
}
