use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{
    AiInsightBundle, BundleStatus, Headline, InsiderActivity, NewsSentimentInsight, NewsTone,
    OptionsSummary, PricePosition, ReportMetadata, SentimentSnapshot, TechnicalSnapshot,
    VolumeReading,
};
use crate::services::cache::TtlCache;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM features are disabled")]
    Disabled,
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("API error: {0}")]
    ApiError(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration for the insight generator
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub max_output_tokens: usize,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub cache_ttl: Duration,
}

impl InsightConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        Self {
            enabled: api_key.is_some(),
            api_key,
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string()),
            max_output_tokens: 500,
            timeout: std::env::var("AI_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
            max_attempts: std::env::var("AI_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            cache_ttl: std::env::var("AI_CACHE_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|m: u64| Duration::from_secs(m * 60))
                .unwrap_or(Duration::from_secs(3600)),
        }
    }
}

/// Trait for hosted text-generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;
}

/// Gemini API request/response structures
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

/// Gemini provider implementation
pub struct GeminiProvider {
    api_key: String,
    model: String,
    max_output_tokens: usize,
    max_attempts: u32,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, max_output_tokens: usize, timeout: Duration, max_attempts: u32) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model,
            max_output_tokens,
            max_attempts,
            client,
        }
    }

    async fn call_gemini_with_retry(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut attempt = 0;
        let mut delay = Duration::from_millis(500);

        loop {
            match self.call_gemini(prompt, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        error!(
                            "Gemini API call failed after {} attempts: {}",
                            self.max_attempts, e
                        );
                        return Err(e);
                    }

                    warn!(
                        "Gemini API call failed (attempt {}/{}): {}. Retrying in {:?}...",
                        attempt, self.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    async fn call_gemini(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("No text in response".to_string()))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.call_gemini_with_retry(prompt, temperature).await
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers. The model is told to answer with bare text or
// strict JSON, but real answers come fenced, quoted or padded with prose.
// ---------------------------------------------------------------------------

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, then the closing fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Accepts a free-text one-liner; "null"-style sentinels mean no insight.
fn parse_one_liner(text: &str) -> Option<String> {
    let cleaned = strip_code_fences(text).trim().trim_matches('"').trim();
    if cleaned.is_empty() {
        return None;
    }

    let lowered = cleaned.trim_end_matches('.').to_lowercase();
    if matches!(lowered.as_str(), "null" | "none" | "n/a") {
        return None;
    }

    Some(cleaned.to_string())
}

#[derive(Debug, Deserialize)]
struct RawNewsSentiment {
    sentiment: String,
    #[serde(default)]
    key_themes: Vec<String>,
    notable_event: Option<String>,
}

fn parse_news_sentiment(text: &str) -> Option<NewsSentimentInsight> {
    let body = extract_json_object(strip_code_fences(text))?;
    let raw: RawNewsSentiment = serde_json::from_str(body).ok()?;

    let tone = match raw.sentiment.to_lowercase().as_str() {
        "positive" => NewsTone::Positive,
        "negative" => NewsTone::Negative,
        _ => NewsTone::Neutral,
    };

    Some(NewsSentimentInsight {
        tone,
        key_themes: raw.key_themes,
        notable_event: raw.notable_event.and_then(|e| parse_one_liner(&e)),
    })
}

fn parse_findings(text: &str) -> Option<Vec<String>> {
    let body = extract_json_array(strip_code_fences(text))?;
    let raw: Vec<String> = serde_json::from_str(body).ok()?;
    Some(
        raw.into_iter()
            .filter(|item| !item.trim().is_empty())
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Prompt builders
// ---------------------------------------------------------------------------

fn fmt_position(position: Option<PricePosition>) -> &'static str {
    match position {
        Some(PricePosition::Above) => "above",
        Some(PricePosition::Below) => "below",
        None => "n/a",
    }
}

fn fmt_sentiment(sentiment: &SentimentSnapshot) -> String {
    match sentiment.score() {
        Some(score) => format!("blended score {score:.2}"),
        None => "insufficient data".to_string(),
    }
}

fn technical_summary_prompt(meta: &ReportMetadata, technical: &TechnicalSnapshot) -> String {
    format!(
        r#"You are a markets analyst writing for retail investors. Summarize the technical picture for {symbol} in one sentence of at most 15 words.

Data:
- Price: {price:.2} ({change:+.2}% on the day)
- RSI(14): {rsi:.1} ({zone:?})
- Price vs MA20: {ma20}, MA50: {ma50}, MA200: {ma200}
- Overall signal: {signal:?}

Reply with the sentence only. No preamble, no disclaimers."#,
        symbol = meta.symbol,
        price = meta.current_price,
        change = meta.price_change_pct,
        rsi = technical.rsi.value,
        zone = technical.rsi.zone,
        ma20 = fmt_position(technical.moving_averages.price_vs_ma_20),
        ma50 = fmt_position(technical.moving_averages.price_vs_ma_50),
        ma200 = fmt_position(technical.moving_averages.price_vs_ma_200),
        signal = technical.overall_signal,
    )
}

fn news_sentiment_prompt(meta: &ReportMetadata, headlines: &[Headline]) -> String {
    let listing: String = headlines
        .iter()
        .take(10)
        .map(|h| format!("- {}\n", h.title))
        .collect();

    format!(
        r#"Classify the sentiment of these recent headlines about {name} ({symbol}).

Headlines:
{listing}
Respond with JSON only, in exactly this format:
{{"sentiment": "Positive|Neutral|Negative", "key_themes": ["theme1", "theme2"], "notable_event": "one event or null"}}"#,
        name = meta.name,
        symbol = meta.symbol,
        listing = listing,
    )
}

fn price_momentum_prompt(meta: &ReportMetadata, technical: &TechnicalSnapshot) -> String {
    format!(
        r#"In one sentence of at most 15 words, characterize the price momentum of {symbol}.

Data:
- Day change: {change:+.2}%
- RSI(14): {rsi:.1}
- Overall signal: {signal:?}

Reply with the sentence only."#,
        symbol = meta.symbol,
        change = meta.price_change_pct,
        rsi = technical.rsi.value,
        signal = technical.overall_signal,
    )
}

fn support_resistance_prompt(meta: &ReportMetadata, technical: &TechnicalSnapshot) -> String {
    let fmt_ma = |ma: Option<f64>| match ma {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    };

    format!(
        r#"Using only these moving averages as reference levels for {symbol}, name the nearest likely support and resistance in one sentence of at most 15 words.

Data:
- Price: {price:.2}
- MA20: {ma20}, MA50: {ma50}, MA200: {ma200}

If every average is n/a, reply null. Reply with the sentence only."#,
        symbol = meta.symbol,
        price = meta.current_price,
        ma20 = fmt_ma(technical.moving_averages.ma_20),
        ma50 = fmt_ma(technical.moving_averages.ma_50),
        ma200 = fmt_ma(technical.moving_averages.ma_200),
    )
}

fn volume_anomaly_prompt(meta: &ReportMetadata, volume: &VolumeReading) -> String {
    format!(
        r#"Today {symbol} traded {current} shares against a 30-day average of {average} ({pct:.0}% of normal).

In one sentence of at most 15 words, say what this volume suggests about conviction behind the move. If the volume is unremarkable, reply null."#,
        symbol = meta.symbol,
        current = volume.current,
        average = volume.average_30d,
        pct = volume.vs_average_pct,
    )
}

fn risk_assessment_prompt(
    meta: &ReportMetadata,
    technical: &TechnicalSnapshot,
    options: Option<&OptionsSummary>,
) -> String {
    let volatility = match technical.volatility_30d_pct {
        Some(v) => format!("{v:.1}%"),
        None => "n/a".to_string(),
    };
    let risk = match technical.risk_level {
        Some(level) => format!("{level:?}"),
        None => "n/a".to_string(),
    };
    let put_call = match options.and_then(|o| o.put_call_volume_ratio) {
        Some(ratio) => format!("{ratio:.2}"),
        None => "n/a".to_string(),
    };

    format!(
        r#"In one sentence of at most 15 words, state what a cautious investor should note about {symbol} right now.

Data:
- 30-day realized volatility: {volatility} (risk level: {risk})
- Put/call volume ratio: {put_call}

Reply with the sentence only."#,
        symbol = meta.symbol,
        volatility = volatility,
        risk = risk,
        put_call = put_call,
    )
}

fn cross_signal_prompt(
    meta: &ReportMetadata,
    technical: Option<&TechnicalSnapshot>,
    sentiment: &SentimentSnapshot,
    headlines: &[Headline],
    options: Option<&OptionsSummary>,
    insider: Option<&InsiderActivity>,
) -> String {
    let technical_line = match technical {
        Some(t) => format!("{:?}, RSI {:.1}", t.overall_signal, t.rsi.value),
        None => "unavailable".to_string(),
    };
    let put_call = match options.and_then(|o| o.put_call_volume_ratio) {
        Some(ratio) => format!("{ratio:.2}"),
        None => "n/a".to_string(),
    };
    let insider_line = match insider {
        Some(activity) => format!(
            "{} buys / {} sells in recent filings",
            activity.buy_count, activity.sell_count
        ),
        None => "n/a".to_string(),
    };

    format!(
        r#"Look for agreements or contradictions between these signals for {symbol}:
- Technicals: {technical_line}
- Crowd sentiment: {sentiment_line}
- Recent headlines: {headline_count}
- Put/call volume ratio: {put_call}
- Insider activity: {insider_line}

Respond with a JSON array of at most 3 short findings, each under 20 words. Respond with [] if nothing stands out."#,
        symbol = meta.symbol,
        technical_line = technical_line,
        sentiment_line = fmt_sentiment(sentiment),
        headline_count = headlines.len(),
        put_call = put_call,
        insider_line = insider_line,
    )
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Everything the generator needs from the already-assembled report sections.
pub struct InsightInputs<'a> {
    pub metadata: &'a ReportMetadata,
    pub technical: Option<&'a TechnicalSnapshot>,
    pub sentiment: &'a SentimentSnapshot,
    pub headlines: &'a [Headline],
    pub options: Option<&'a OptionsSummary>,
    pub insider: Option<&'a InsiderActivity>,
}

/// Insight generator with provider abstraction and per-report caching.
/// It never fails a report: a disabled provider or a string of bad answers
/// just yields an unavailable bundle.
pub struct InsightService {
    provider: Option<Arc<dyn LlmProvider>>,
    cache: TtlCache<String, AiInsightBundle>,
    cache_ttl: Duration,
    max_parse_attempts: u32,
}

impl InsightService {
    pub fn new(config: InsightConfig) -> Self {
        let provider = if config.enabled {
            if let Some(api_key) = &config.api_key {
                info!("Initializing AI insights with model: {}", config.model);
                let provider = GeminiProvider::new(
                    api_key.clone(),
                    config.model.clone(),
                    config.max_output_tokens,
                    config.timeout,
                    config.max_attempts,
                );
                Some(Arc::new(provider) as Arc<dyn LlmProvider>)
            } else {
                warn!("GEMINI_API_KEY not configured. AI insights disabled.");
                None
            }
        } else {
            info!("AI insights are disabled in configuration");
            None
        };

        Self {
            provider,
            cache: TtlCache::new(),
            cache_ttl: config.cache_ttl,
            max_parse_attempts: config.max_attempts.max(1),
        }
    }

    /// Direct construction for tests and alternative providers.
    pub fn from_parts(provider: Option<Arc<dyn LlmProvider>>, cache_ttl: Duration) -> Self {
        Self {
            provider,
            cache: TtlCache::new(),
            cache_ttl,
            max_parse_attempts: 2,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate_bundle(&self, inputs: &InsightInputs<'_>) -> AiInsightBundle {
        let Some(provider) = self.provider.as_ref() else {
            info!("AI insights disabled; returning unavailable bundle");
            return AiInsightBundle::unavailable();
        };

        let cache_key = Self::cache_key(inputs);
        if let Some(hit) = self.cache.get(&cache_key) {
            info!("AI insight cache hit for {}", inputs.metadata.symbol);
            return hit;
        }

        let bundle = self.build_bundle(provider.as_ref(), inputs).await;

        // An unavailable bundle should not occupy the cache for a whole hour
        if bundle.status == BundleStatus::Available {
            self.cache.insert(cache_key, bundle.clone(), self.cache_ttl);
        }

        bundle
    }

    /// Key is symbol + hour bucket + a digest of the inputs, so a mid-hour
    /// data change still produces fresh commentary.
    fn cache_key(inputs: &InsightInputs<'_>) -> String {
        let fingerprint = json!({
            "price": inputs.metadata.current_price,
            "change_pct": inputs.metadata.price_change_pct,
            "signal": inputs.technical.map(|t| t.overall_signal),
            "rsi": inputs.technical.map(|t| t.rsi.value),
            "sentiment": inputs.sentiment.score(),
            "headlines": inputs
                .headlines
                .iter()
                .map(|h| h.title.as_str())
                .collect::<Vec<_>>(),
            "put_call": inputs.options.and_then(|o| o.put_call_volume_ratio),
            "insider": inputs.insider.map(|a| (a.buy_count, a.sell_count)),
        })
        .to_string();

        format!(
            "{}_{}_{}",
            inputs.metadata.symbol,
            Utc::now().format("%Y-%m-%d-%H"),
            Self::digest(&fingerprint)
        )
    }

    fn digest(fingerprint: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        fingerprint.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    async fn build_bundle(
        &self,
        provider: &dyn LlmProvider,
        inputs: &InsightInputs<'_>,
    ) -> AiInsightBundle {
        let mut bundle = AiInsightBundle::unavailable();

        if let Some(technical) = inputs.technical {
            bundle.technical_summary = self
                .one_liner(provider, &technical_summary_prompt(inputs.metadata, technical), 0.3)
                .await;

            bundle.price_momentum = self
                .one_liner(provider, &price_momentum_prompt(inputs.metadata, technical), 0.3)
                .await;

            bundle.support_resistance = self
                .one_liner(provider, &support_resistance_prompt(inputs.metadata, technical), 0.2)
                .await;

            if let Some(volume) = technical.volume.as_ref() {
                bundle.volume_commentary = self
                    .one_liner(provider, &volume_anomaly_prompt(inputs.metadata, volume), 0.3)
                    .await;
            }

            bundle.risk_assessment = self
                .one_liner(
                    provider,
                    &risk_assessment_prompt(inputs.metadata, technical, inputs.options),
                    0.3,
                )
                .await;
        }

        if !inputs.headlines.is_empty() {
            bundle.news_sentiment = self
                .parsed(
                    provider,
                    &news_sentiment_prompt(inputs.metadata, inputs.headlines),
                    0.2,
                    parse_news_sentiment,
                )
                .await;
        }

        bundle.cross_signal_findings = self
            .parsed(
                provider,
                &cross_signal_prompt(
                    inputs.metadata,
                    inputs.technical,
                    inputs.sentiment,
                    inputs.headlines,
                    inputs.options,
                    inputs.insider,
                ),
                0.4,
                parse_findings,
            )
            .await
            .unwrap_or_default();

        if bundle.has_content() {
            bundle.status = BundleStatus::Available;
        }

        bundle
    }

    async fn one_liner(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        temperature: f32,
    ) -> Option<String> {
        self.parsed(provider, prompt, temperature, parse_one_liner).await
    }

    /// One insight: ask, parse defensively, re-ask once on garbage, then skip.
    async fn parsed<T, P>(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
        temperature: f32,
        parse: P,
    ) -> Option<T>
    where
        P: Fn(&str) -> Option<T>,
    {
        for attempt in 1..=self.max_parse_attempts {
            match provider.generate(prompt, temperature).await {
                Ok(text) => {
                    if let Some(value) = parse(&text) {
                        return Some(value);
                    }
                    warn!(
                        "Unparseable insight response (attempt {}/{})",
                        attempt, self.max_parse_attempts
                    );
                }
                Err(e) => {
                    // the provider already retried transport errors internally
                    warn!("Insight generation failed: {}", e);
                    return None;
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssetClass, MovingAverages, OverallSignal, RsiReading, RsiZone, SentimentSnapshot,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        reply: String,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            asset_class: AssetClass::Stock,
            currency: Some("USD".to_string()),
            current_price: 189.5,
            price_change: 1.5,
            price_change_pct: 0.8,
        }
    }

    fn technical() -> TechnicalSnapshot {
        TechnicalSnapshot {
            rsi: RsiReading {
                value: 55.0,
                zone: RsiZone::Neutral,
                interpretation: "test".to_string(),
            },
            moving_averages: MovingAverages {
                ma_20: Some(185.0),
                ma_50: Some(180.0),
                ma_200: Some(170.0),
                price_vs_ma_20: Some(PricePosition::Above),
                price_vs_ma_50: Some(PricePosition::Above),
                price_vs_ma_200: Some(PricePosition::Above),
            },
            volume: None,
            volatility_30d_pct: Some(22.0),
            risk_level: Some(crate::models::RiskLevel::Moderate),
            overall_signal: OverallSignal::Bullish,
        }
    }

    fn sentiment() -> SentimentSnapshot {
        SentimentSnapshot::Assessed {
            assessment: crate::models::SentimentAssessment::Neutral,
            score: 0.0,
            description: "test".to_string(),
            signals_used: vec!["fear_greed".to_string()],
        }
    }

    #[test]
    fn strips_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("plain text"), "plain text");
    }

    #[test]
    fn extracts_embedded_json() {
        let text = "Sure! Here you go: {\"sentiment\": \"Positive\"} Hope that helps.";
        assert_eq!(extract_json_object(text), Some("{\"sentiment\": \"Positive\"}"));
        assert_eq!(extract_json_object("no braces"), None);
    }

    #[test]
    fn one_liner_rejects_null_sentinels() {
        assert_eq!(parse_one_liner("null"), None);
        assert_eq!(parse_one_liner("None."), None);
        assert_eq!(parse_one_liner("N/A"), None);
        assert_eq!(parse_one_liner("  "), None);
        assert_eq!(
            parse_one_liner("\"Momentum is strong.\""),
            Some("Momentum is strong.".to_string())
        );
    }

    #[test]
    fn parses_news_sentiment_with_fences_and_prose() {
        let text = "```json\n{\"sentiment\": \"positive\", \"key_themes\": [\"earnings\"], \"notable_event\": \"null\"}\n```";
        let parsed = parse_news_sentiment(text).unwrap();
        assert_eq!(parsed.tone, NewsTone::Positive);
        assert_eq!(parsed.key_themes, vec!["earnings".to_string()]);
        assert!(parsed.notable_event.is_none());

        assert!(parse_news_sentiment("not json at all").is_none());
    }

    #[test]
    fn parses_findings_array() {
        let parsed = parse_findings("[\"RSI and sentiment disagree\", \"\"]").unwrap();
        assert_eq!(parsed, vec!["RSI and sentiment disagree".to_string()]);

        assert_eq!(parse_findings("[]").unwrap(), Vec::<String>::new());
        assert!(parse_findings("no array").is_none());
    }

    #[tokio::test]
    async fn disabled_service_returns_unavailable() {
        let service = InsightService::from_parts(None, Duration::from_secs(60));
        let meta = metadata();
        let snapshot = technical();
        let sent = sentiment();

        let bundle = service
            .generate_bundle(&InsightInputs {
                metadata: &meta,
                technical: Some(&snapshot),
                sentiment: &sent,
                headlines: &[],
                options: None,
                insider: None,
            })
            .await;

        assert_eq!(bundle.status, BundleStatus::Unavailable);
        assert!(!bundle.has_content());
    }

    #[tokio::test]
    async fn persistent_null_answers_leave_bundle_unavailable() {
        let provider = ScriptedProvider::new("null");
        let service =
            InsightService::from_parts(Some(provider.clone()), Duration::from_secs(60));
        let meta = metadata();
        let snapshot = technical();
        let sent = sentiment();

        let bundle = service
            .generate_bundle(&InsightInputs {
                metadata: &meta,
                technical: Some(&snapshot),
                sentiment: &sent,
                headlines: &[],
                options: None,
                insider: None,
            })
            .await;

        assert_eq!(bundle.status, BundleStatus::Unavailable);
        assert!(bundle.technical_summary.is_none());
        assert!(bundle.cross_signal_findings.is_empty());
        // every insight re-asked once before giving up
        assert!(provider.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn good_answers_fill_the_bundle() {
        let provider = ScriptedProvider::new("Price is consolidating above rising averages.");
        let service =
            InsightService::from_parts(Some(provider.clone()), Duration::from_secs(60));
        let meta = metadata();
        let snapshot = technical();
        let sent = sentiment();

        let bundle = service
            .generate_bundle(&InsightInputs {
                metadata: &meta,
                technical: Some(&snapshot),
                sentiment: &sent,
                headlines: &[],
                options: None,
                insider: None,
            })
            .await;

        assert_eq!(bundle.status, BundleStatus::Available);
        assert!(bundle.technical_summary.is_some());
        assert!(bundle.price_momentum.is_some());
        assert!(bundle.risk_assessment.is_some());
        // no headlines were supplied, so no news section
        assert!(bundle.news_sentiment.is_none());
    }

    #[tokio::test]
    async fn identical_inputs_hit_the_cache() {
        let provider = ScriptedProvider::new("Steady accumulation with no red flags.");
        let service =
            InsightService::from_parts(Some(provider.clone()), Duration::from_secs(60));
        let meta = metadata();
        let snapshot = technical();
        let sent = sentiment();

        let inputs = InsightInputs {
            metadata: &meta,
            technical: Some(&snapshot),
            sentiment: &sent,
            headlines: &[],
            options: None,
            insider: None,
        };

        service.generate_bundle(&inputs).await;
        let calls_after_first = provider.calls.load(Ordering::SeqCst);

        service.generate_bundle(&inputs).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test]
    async fn expired_cache_entry_triggers_regeneration() {
        let provider = ScriptedProvider::new("Steady accumulation with no red flags.");
        let service =
            InsightService::from_parts(Some(provider.clone()), Duration::from_millis(50));
        let meta = metadata();
        let snapshot = technical();
        let sent = sentiment();

        let inputs = InsightInputs {
            metadata: &meta,
            technical: Some(&snapshot),
            sentiment: &sent,
            headlines: &[],
            options: None,
            insider: None,
        };

        service.generate_bundle(&inputs).await;
        let calls_after_first = provider.calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(80)).await;

        service.generate_bundle(&inputs).await;
        assert!(provider.calls.load(Ordering::SeqCst) > calls_after_first);
    }
}
