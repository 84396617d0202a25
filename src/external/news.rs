use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::external::SourceError;
use crate::models::Headline;

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub page_size: u32,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEWSAPI_KEY").ok(),
            page_size: std::env::var("NEWS_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Recent English-language headlines matching `query`, newest first.
    async fn fetch_headlines(&self, query: &str, days: i64) -> Result<Vec<Headline>, SourceError>;
}

/// newsapi.org `/v2/everything` client. Works on the free tier; a missing
/// key degrades the news section instead of failing the report.
pub struct NewsApiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    page_size: u32,
}

impl NewsApiProvider {
    pub fn new(config: NewsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key,
            page_size: config.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    message: Option<String>,
    articles: Option<Vec<NewsApiArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<NewsApiSource>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_headlines(&self, query: &str, days: i64) -> Result<Vec<Headline>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("NEWSAPI_KEY"))?;

        let to = Utc::now();
        let from = to - Duration::days(days);

        let resp = self
            .client
            .get("https://newsapi.org/v2/everything")
            .query(&[
                ("q", query),
                ("from", &from.format("%Y-%m-%d").to_string()),
                ("to", &to.format("%Y-%m-%d").to_string()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", &self.page_size.to_string()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body: NewsApiResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if body.status != "ok" {
            return Err(SourceError::BadResponse(
                body.message
                    .unwrap_or_else(|| format!("API returned status: {}", body.status)),
            ));
        }

        let articles = body.articles.unwrap_or_default();

        let headlines = articles
            .into_iter()
            .filter_map(|a| {
                let title = a.title?;
                // newsapi tombstones deleted articles instead of dropping them
                if title == "[Removed]" {
                    return None;
                }
                Some(Headline {
                    title,
                    source: a
                        .source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "unknown".to_string()),
                    url: a.url,
                    published_at: a
                        .published_at
                        .as_deref()
                        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                        .map(|d| d.with_timezone(&Utc)),
                    description: a.description,
                })
            })
            .collect();

        Ok(headlines)
    }
}
