use std::time::Duration;

use crate::models::AssetClass;

pub const APP_NAME: &str = "tickerlens";

/// Indicator and lookback settings shared across the analysis pipeline.
pub const RSI_PERIOD: usize = 14;
pub const MA_PERIODS: [usize; 3] = [20, 50, 200];
pub const VOLUME_LOOKBACK_DAYS: usize = 30;
pub const NEWS_LOOKBACK_DAYS: i64 = 7;
pub const TRENDS_LOOKBACK_DAYS: i64 = 30;
pub const HISTORY_DAYS: i64 = 365;

/// Minimum number of daily closes required before technical analysis runs.
pub const MIN_SERIES_LEN: usize = 20;

/// Weekly mention count considered "typical" for a widely discussed asset.
pub const MENTION_BASELINE: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Upper bound on any single source fetch, retry included.
    pub source_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);
        let source_timeout = std::env::var("SOURCE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Self {
            port,
            source_timeout,
        }
    }
}

pub struct CatalogEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub class: AssetClass,
}

/// Assets the service knows how to analyze. Symbols follow Yahoo conventions
/// (`^` prefix for indices, `-USD` for crypto pairs, `=F` for futures).
pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry { symbol: "AAPL", name: "Apple Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "MSFT", name: "Microsoft Corporation", class: AssetClass::Stock },
    CatalogEntry { symbol: "GOOGL", name: "Alphabet Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "AMZN", name: "Amazon.com Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "NVDA", name: "NVIDIA Corporation", class: AssetClass::Stock },
    CatalogEntry { symbol: "META", name: "Meta Platforms Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "TSLA", name: "Tesla Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "JPM", name: "JPMorgan Chase & Co.", class: AssetClass::Stock },
    CatalogEntry { symbol: "V", name: "Visa Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "JNJ", name: "Johnson & Johnson", class: AssetClass::Stock },
    CatalogEntry { symbol: "WMT", name: "Walmart Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "PG", name: "Procter & Gamble Co.", class: AssetClass::Stock },
    CatalogEntry { symbol: "DIS", name: "The Walt Disney Company", class: AssetClass::Stock },
    CatalogEntry { symbol: "NFLX", name: "Netflix Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "AMD", name: "Advanced Micro Devices Inc.", class: AssetClass::Stock },
    CatalogEntry { symbol: "BTC-USD", name: "Bitcoin", class: AssetClass::Crypto },
    CatalogEntry { symbol: "ETH-USD", name: "Ethereum", class: AssetClass::Crypto },
    CatalogEntry { symbol: "SOL-USD", name: "Solana", class: AssetClass::Crypto },
    CatalogEntry { symbol: "ADA-USD", name: "Cardano", class: AssetClass::Crypto },
    CatalogEntry { symbol: "DOGE-USD", name: "Dogecoin", class: AssetClass::Crypto },
    CatalogEntry { symbol: "^GSPC", name: "S&P 500", class: AssetClass::Index },
    CatalogEntry { symbol: "^DJI", name: "Dow Jones Industrial Average", class: AssetClass::Index },
    CatalogEntry { symbol: "^IXIC", name: "NASDAQ Composite", class: AssetClass::Index },
    CatalogEntry { symbol: "GC=F", name: "Gold Futures", class: AssetClass::Commodity },
    CatalogEntry { symbol: "CL=F", name: "Crude Oil Futures", class: AssetClass::Commodity },
];

pub fn lookup(symbol: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|entry| entry.symbol.eq_ignore_ascii_case(symbol))
}

/// Subreddits worth scanning for a given asset class.
pub fn subreddits_for(class: AssetClass) -> &'static [&'static str] {
    match class {
        AssetClass::Stock | AssetClass::Index => &["wallstreetbets", "stocks", "investing"],
        AssetClass::Crypto => &["CryptoCurrency", "Bitcoin", "ethereum"],
        AssetClass::Commodity => &["wallstreetbets", "investing"],
    }
}

/// Strips Yahoo symbol decorations so the name works as a search term
/// ("^GSPC" -> "GSPC", "BTC-USD" -> "BTC", "GC=F" -> "GC").
pub fn clean_symbol(symbol: &str) -> String {
    let s = symbol.trim_start_matches('^');
    let s = s.strip_suffix("-USD").unwrap_or(s);
    let s = s.strip_suffix("=F").unwrap_or(s);
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("aapl").is_some());
        assert!(lookup("AAPL").is_some());
        assert!(lookup("btc-usd").is_some());
        assert!(lookup("ZZZZ").is_none());
    }

    #[test]
    fn clean_symbol_strips_decorations() {
        assert_eq!(clean_symbol("^GSPC"), "GSPC");
        assert_eq!(clean_symbol("BTC-USD"), "BTC");
        assert_eq!(clean_symbol("GC=F"), "GC");
        assert_eq!(clean_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn catalog_classes_have_subreddits() {
        for entry in CATALOG {
            assert!(!subreddits_for(entry.class).is_empty());
        }
    }
}
