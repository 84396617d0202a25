use crate::models::{
    FearGreedReading, MentionLevel, MentionVolume, SearchInterest, SentimentAssessment,
    SentimentSnapshot, TrendDirection,
};

// Wide-market mood outweighs asset-specific attention, which outweighs chatter
const FEAR_GREED_WEIGHT: f64 = 0.5;
const SEARCH_WEIGHT: f64 = 0.3;
const SOCIAL_WEIGHT: f64 = 0.2;

/// Blends whatever sentiment signals survived the fetch phase into one score.
/// Signals that were down are simply absent; the weights renormalize over
/// what's left.
pub fn aggregate(
    fear_greed: Option<&FearGreedReading>,
    search: Option<&SearchInterest>,
    social: Option<&MentionVolume>,
) -> SentimentSnapshot {
    let mut weighted = 0.0;
    let mut weight_total = 0.0;
    let mut signals_used = Vec::new();

    if let Some(fg) = fear_greed {
        // 0-100 index centered to -1..+1
        let score = (f64::from(fg.value) - 50.0) / 50.0;
        weighted += score * FEAR_GREED_WEIGHT;
        weight_total += FEAR_GREED_WEIGHT;
        signals_used.push("fear_greed".to_string());
    }

    if let Some(interest) = search {
        let score = match interest.trend_direction {
            TrendDirection::Rising => 0.5,
            TrendDirection::Falling => -0.5,
            TrendDirection::Stable => 0.0,
        };
        weighted += score * SEARCH_WEIGHT;
        weight_total += SEARCH_WEIGHT;
        signals_used.push("search_interest".to_string());
    }

    // Mention volume only means something once people are actually talking;
    // a zero-mention week carries no directional information.
    if let Some(mentions) = social {
        if mentions.total_mentions > 0 {
            let score = match mentions.vs_baseline {
                MentionLevel::High => 0.5,
                MentionLevel::Low => -0.3,
                MentionLevel::Elevated | MentionLevel::Average => 0.0,
            };
            weighted += score * SOCIAL_WEIGHT;
            weight_total += SOCIAL_WEIGHT;
            signals_used.push("social_mentions".to_string());
        }
    }

    if weight_total == 0.0 {
        return SentimentSnapshot::InsufficientData {
            note: "No sentiment sources responded; skipping the blended assessment.".to_string(),
        };
    }

    let score = weighted / weight_total;
    let assessment = assess(score);

    SentimentSnapshot::Assessed {
        assessment,
        score,
        description: describe(assessment, score, &signals_used),
        signals_used,
    }
}

fn assess(score: f64) -> SentimentAssessment {
    if score >= 0.4 {
        SentimentAssessment::StronglyBullish
    } else if score >= 0.1 {
        SentimentAssessment::LeaningBullish
    } else if score <= -0.4 {
        SentimentAssessment::StronglyBearish
    } else if score <= -0.1 {
        SentimentAssessment::LeaningBearish
    } else {
        SentimentAssessment::Neutral
    }
}

fn label(assessment: SentimentAssessment) -> &'static str {
    match assessment {
        SentimentAssessment::StronglyBullish => "strongly bullish",
        SentimentAssessment::LeaningBullish => "leaning bullish",
        SentimentAssessment::Neutral => "neutral",
        SentimentAssessment::LeaningBearish => "leaning bearish",
        SentimentAssessment::StronglyBearish => "strongly bearish",
    }
}

fn describe(assessment: SentimentAssessment, score: f64, signals: &[String]) -> String {
    format!(
        "Blended sentiment is {} (score {:.2}) across {} signal{}.",
        label(assessment),
        score,
        signals.len(),
        if signals.len() == 1 { "" } else { "s" }
    )
}
