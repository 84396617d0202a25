use serde::{Deserialize, Serialize};

/// Blended mood label across fear/greed, search interest and social mentions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SentimentAssessment {
    StronglyBullish, // score >= 0.4
    LeaningBullish,  // >= 0.1
    Neutral,
    LeaningBearish,  // <= -0.1
    StronglyBearish, // <= -0.4
}

/// Output of the sentiment aggregator. Wide-market signals (fear/greed)
/// weigh more than asset-specific chatter, and a signal that was down at
/// fetch time simply drops out of the blend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentSnapshot {
    Assessed {
        assessment: SentimentAssessment,
        score: f64, // -1.0 to +1.0
        description: String,
        signals_used: Vec<String>,
    },
    InsufficientData {
        note: String,
    },
}

impl SentimentSnapshot {
    pub fn score(&self) -> Option<f64> {
        match self {
            SentimentSnapshot::Assessed { score, .. } => Some(*score),
            SentimentSnapshot::InsufficientData { .. } => None,
        }
    }

    pub fn assessment(&self) -> Option<SentimentAssessment> {
        match self {
            SentimentSnapshot::Assessed { assessment, .. } => Some(*assessment),
            SentimentSnapshot::InsufficientData { .. } => None,
        }
    }
}
