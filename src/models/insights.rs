use serde::{Deserialize, Serialize};

use super::source::Confidence;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BundleStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NewsTone {
    Positive,
    Neutral,
    Negative,
}

/// Structured read of recent headlines, produced by the model as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSentimentInsight {
    pub tone: NewsTone,
    pub key_themes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notable_event: Option<String>,
}

/// Model-written commentary. Everything here is advisory text layered on top
/// of numbers the pipeline already computed, never a number of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiInsightBundle {
    pub status: BundleStatus,
    pub confidence: Confidence, // always AI-GENERATED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_sentiment: Option<NewsSentimentInsight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_momentum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_resistance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_commentary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cross_signal_findings: Vec<String>,
}

impl AiInsightBundle {
    /// Placeholder bundle for when the model is disabled or every call failed.
    pub fn unavailable() -> Self {
        Self {
            status: BundleStatus::Unavailable,
            confidence: Confidence::AiGenerated,
            technical_summary: None,
            news_sentiment: None,
            price_momentum: None,
            support_resistance: None,
            volume_commentary: None,
            risk_assessment: None,
            cross_signal_findings: Vec::new(),
        }
    }

    pub fn has_content(&self) -> bool {
        self.technical_summary.is_some()
            || self.news_sentiment.is_some()
            || self.price_momentum.is_some()
            || self.support_resistance.is_some()
            || self.volume_commentary.is_some()
            || self.risk_assessment.is_some()
            || !self.cross_signal_findings.is_empty()
    }
}
