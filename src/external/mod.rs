pub mod fear_greed;
pub mod market_data;
pub mod multi_market;
pub mod news;
pub mod options;
pub mod ownership;
pub mod reddit;
pub mod stooq;
pub mod trends;
pub mod yahoo_chart;

use std::time::Duration;

use thiserror::Error;

use crate::models::SourceStatus;

/// Failure at the boundary with one upstream source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl SourceError {
    /// Report-facing status for this failure.
    pub fn status(&self) -> SourceStatus {
        match self {
            SourceError::RateLimited => SourceStatus::RateLimited,
            SourceError::MissingCredential(_) | SourceError::Timeout(_) => {
                SourceStatus::Unavailable
            }
            SourceError::Network(_) | SourceError::BadResponse(_) | SourceError::Parse(_) => {
                SourceStatus::Error
            }
        }
    }

    /// Whether an immediate retry has any chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Network(_))
    }
}
