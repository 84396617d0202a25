use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::config::{clean_symbol, subreddits_for, MENTION_BASELINE};
use crate::external::SourceError;
use crate::models::{AssetClass, MentionLevel, MentionVolume};

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub user_agent: String,
}

impl RedditConfig {
    pub fn from_env() -> Self {
        Self {
            user_agent: std::env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "tickerlens/0.1 (market research)".to_string()),
        }
    }
}

#[async_trait]
pub trait SocialMentionsProvider: Send + Sync {
    /// Counts mentions of `symbol` across the subreddits for its class over
    /// the past week. Zero mentions is a valid answer; Err means the source
    /// itself was unreachable.
    async fn fetch_mentions(
        &self,
        symbol: &str,
        class: AssetClass,
    ) -> Result<MentionVolume, SourceError>;
}

/// Credential-less client for reddit's public search JSON.
pub struct RedditProvider {
    client: reqwest::Client,
}

impl RedditProvider {
    pub fn new(config: RedditConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    async fn count_in_subreddit(
        &self,
        subreddit: &str,
        query: &str,
        matcher: &Regex,
    ) -> Result<u32, SourceError> {
        let url = format!("https://www.reddit.com/r/{subreddit}/search.json");

        let resp = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("restrict_sr", "1"),
                ("t", "week"),
                ("limit", "100"),
                ("sort", "new"),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        let body: RedditListing = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let count = body
            .data
            .children
            .iter()
            .filter(|post| {
                matcher.is_match(&post.data.title)
                    || post
                        .data
                        .selftext
                        .as_deref()
                        .is_some_and(|text| matcher.is_match(text))
            })
            .count();

        Ok(count as u32)
    }
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    children: Vec<RedditPost>,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    data: RedditPostData,
}

#[derive(Debug, Deserialize)]
struct RedditPostData {
    title: String,
    selftext: Option<String>,
}

fn mention_level(total: u32) -> MentionLevel {
    let ratio = f64::from(total) / MENTION_BASELINE;
    if ratio > 3.0 {
        MentionLevel::High
    } else if ratio > 1.5 {
        MentionLevel::Elevated
    } else if ratio < 0.5 {
        MentionLevel::Low
    } else {
        MentionLevel::Average
    }
}

#[async_trait]
impl SocialMentionsProvider for RedditProvider {
    async fn fetch_mentions(
        &self,
        symbol: &str,
        class: AssetClass,
    ) -> Result<MentionVolume, SourceError> {
        let term = clean_symbol(symbol);

        // Word-boundary match so "V" does not count every word containing a v
        let matcher = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&term)))
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let subreddits = subreddits_for(class);

        let counts = join_all(
            subreddits
                .iter()
                .map(|sub| self.count_in_subreddit(sub, &term, &matcher)),
        )
        .await;

        let mut per_subreddit = BTreeMap::new();
        let mut failed = 0usize;

        for (sub, outcome) in subreddits.iter().zip(counts) {
            match outcome {
                Ok(count) => {
                    per_subreddit.insert(sub.to_string(), count);
                }
                Err(e) => {
                    warn!("r/{} search failed for {}: {}", sub, term, e);
                    per_subreddit.insert(sub.to_string(), 0);
                    failed += 1;
                }
            }
        }

        // A quiet week is data; every subreddit erroring is a down source
        if failed == subreddits.len() {
            return Err(SourceError::BadResponse(format!(
                "all {} subreddit searches failed",
                subreddits.len()
            )));
        }

        let total_mentions: u32 = per_subreddit.values().sum();

        Ok(MentionVolume {
            total_mentions,
            per_subreddit,
            vs_baseline: mention_level(total_mentions),
            lookback_days: 7,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_levels_follow_baseline_multiples() {
        assert_eq!(mention_level(0), MentionLevel::Low);
        assert_eq!(mention_level(14), MentionLevel::Low);
        assert_eq!(mention_level(15), MentionLevel::Average);
        assert_eq!(mention_level(30), MentionLevel::Average);
        assert_eq!(mention_level(46), MentionLevel::Elevated);
        assert_eq!(mention_level(91), MentionLevel::High);
    }

    #[test]
    fn matcher_requires_word_boundaries() {
        let matcher = Regex::new(r"(?i)\bAMD\b").unwrap();
        assert!(matcher.is_match("AMD earnings tomorrow"));
        assert!(matcher.is_match("thoughts on amd?"));
        assert!(!matcher.is_match("blamdridge"));
    }
}
