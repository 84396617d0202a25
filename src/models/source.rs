use serde::{Deserialize, Serialize};

/// Availability of one upstream source within a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Available,
    Unavailable,
    RateLimited,
    Error,
}

/// How much weight a reader should give a report section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Confidence {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "CONTEXT ONLY")]
    Context,
    #[serde(rename = "AI-GENERATED")]
    AiGenerated,
}

/// One source's slot in a report. A failed source keeps its slot with a
/// status and detail instead of failing the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult<T> {
    pub source: String,
    pub status: SourceStatus,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl<T> SourceResult<T> {
    pub fn available(source: &str, confidence: Confidence, payload: T) -> Self {
        Self {
            source: source.to_string(),
            status: SourceStatus::Available,
            confidence,
            payload: Some(payload),
            error_detail: None,
        }
    }

    pub fn degraded(
        source: &str,
        confidence: Confidence,
        status: SourceStatus,
        detail: String,
    ) -> Self {
        Self {
            source: source.to_string(),
            status,
            confidence,
            payload: None,
            error_detail: Some(detail),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SourceStatus::Available && self.payload.is_some()
    }
}
