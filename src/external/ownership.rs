use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::external::SourceError;
use crate::models::{
    InsiderActivity, InsiderTransaction, InstitutionalHolder, InstitutionalOwnership,
};

const MAX_ROWS: usize = 10;

#[async_trait]
pub trait OwnershipProvider: Send + Sync {
    /// Recent insider filings with a rough buy/sell tally.
    async fn fetch_insider_activity(&self, symbol: &str) -> Result<InsiderActivity, SourceError>;

    /// Largest institutional holders on record.
    async fn fetch_institutional(
        &self,
        symbol: &str,
    ) -> Result<InstitutionalOwnership, SourceError>;
}

/// Yahoo v10 quoteSummary client. Only listed companies carry these modules;
/// indices, crypto and futures come back empty.
pub struct YahooOwnershipProvider {
    client: reqwest::Client,
}

impl YahooOwnershipProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_module(&self, symbol: &str, module: &str) -> Result<QuoteSummaryResult, SourceError> {
        let url = format!("https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}");

        let resp = self
            .client
            .get(url)
            .query(&[("modules", module)])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(err) = body.quote_summary.error {
            return Err(SourceError::BadResponse(err.to_string()));
        }

        body.quote_summary
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| SourceError::BadResponse(format!("no {module} data for {symbol}")))
    }
}

impl Default for YahooOwnershipProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "insiderTransactions")]
    insider_transactions: Option<InsiderTransactionsModule>,
    #[serde(rename = "institutionOwnership")]
    institution_ownership: Option<InstitutionOwnershipModule>,
}

#[derive(Debug, Deserialize)]
struct InsiderTransactionsModule {
    #[serde(default)]
    transactions: Vec<RawInsiderTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawInsiderTransaction {
    #[serde(rename = "filerName")]
    filer_name: Option<String>,
    #[serde(rename = "filerRelation")]
    filer_relation: Option<String>,
    #[serde(rename = "transactionText")]
    transaction_text: Option<String>,
    shares: Option<RawNumber>,
    value: Option<RawNumber>,
    #[serde(rename = "startDate")]
    start_date: Option<RawDate>,
}

#[derive(Debug, Deserialize)]
struct InstitutionOwnershipModule {
    #[serde(rename = "ownershipList", default)]
    ownership_list: Vec<RawHolder>,
}

#[derive(Debug, Deserialize)]
struct RawHolder {
    organization: Option<String>,
    #[serde(rename = "pctHeld")]
    pct_held: Option<RawNumber>,
    position: Option<RawNumber>,
    value: Option<RawNumber>,
}

// Yahoo wraps every number as {raw, fmt}
#[derive(Debug, Deserialize)]
struct RawNumber {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    raw: Option<i64>,
    fmt: Option<String>,
}

impl RawDate {
    fn to_naive(&self) -> Option<NaiveDate> {
        if let Some(ts) = self.raw {
            return DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive());
        }
        self.fmt
            .as_deref()
            .and_then(|f| NaiveDate::parse_from_str(f, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TradeSide {
    Buy,
    Sell,
    Other,
}

fn classify(text: &str) -> TradeSide {
    let lower = text.to_lowercase();
    if lower.contains("buy") || lower.contains("purchase") {
        TradeSide::Buy
    } else if lower.contains("sale") || lower.contains("sell") {
        TradeSide::Sell
    } else {
        TradeSide::Other
    }
}

#[async_trait]
impl OwnershipProvider for YahooOwnershipProvider {
    async fn fetch_insider_activity(&self, symbol: &str) -> Result<InsiderActivity, SourceError> {
        let result = self.fetch_module(symbol, "insiderTransactions").await?;

        let raw = result
            .insider_transactions
            .ok_or_else(|| SourceError::BadResponse(format!("no insider module for {symbol}")))?
            .transactions;

        let mut buy_count = 0u32;
        let mut sell_count = 0u32;
        let mut net_shares = 0i64;
        let mut transactions = Vec::new();

        for tx in raw {
            let description = tx.transaction_text.unwrap_or_default();
            let shares = tx.shares.and_then(|s| s.raw).map(|s| s as i64);

            match classify(&description) {
                TradeSide::Buy => {
                    buy_count += 1;
                    net_shares += shares.unwrap_or(0);
                }
                TradeSide::Sell => {
                    sell_count += 1;
                    net_shares -= shares.unwrap_or(0);
                }
                TradeSide::Other => {}
            }

            if transactions.len() < MAX_ROWS {
                transactions.push(InsiderTransaction {
                    name: tx.filer_name.unwrap_or_else(|| "unknown".to_string()),
                    relation: tx.filer_relation,
                    description,
                    shares,
                    value: tx.value.and_then(|v| v.raw),
                    date: tx.start_date.as_ref().and_then(RawDate::to_naive),
                });
            }
        }

        Ok(InsiderActivity {
            transactions,
            buy_count,
            sell_count,
            net_shares,
        })
    }

    async fn fetch_institutional(
        &self,
        symbol: &str,
    ) -> Result<InstitutionalOwnership, SourceError> {
        let result = self.fetch_module(symbol, "institutionOwnership").await?;

        let holders = result
            .institution_ownership
            .ok_or_else(|| SourceError::BadResponse(format!("no ownership module for {symbol}")))?
            .ownership_list
            .into_iter()
            .take(MAX_ROWS)
            .map(|h| InstitutionalHolder {
                organization: h.organization.unwrap_or_else(|| "unknown".to_string()),
                // pctHeld raw is a fraction; report it as a percentage
                pct_held: h.pct_held.and_then(|p| p.raw).map(|p| p * 100.0),
                shares: h.position.and_then(|p| p.raw).map(|p| p as i64),
                value: h.value.and_then(|v| v.raw),
            })
            .collect();

        Ok(InstitutionalOwnership { holders })
    }
}
