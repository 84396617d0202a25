use serde::{Deserialize, Serialize};

/// RSI bands used when labelling momentum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought, // >= 70
    Bullish,    // 60..70
    Neutral,    // 40..60
    Bearish,    // 30..40
    Oversold,   // < 30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64, // 0-100
    pub zone: RsiZone,
    pub interpretation: String,
}

/// Which side of a moving average the latest close sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PricePosition {
    Above,
    Below,
}

/// Simple moving averages over the daily close series. Longer windows stay
/// None when the history is too short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    pub price_vs_ma_20: Option<PricePosition>,
    pub price_vs_ma_50: Option<PricePosition>,
    pub price_vs_ma_200: Option<PricePosition>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatus {
    Elevated,     // > 1.5x average
    AboveAverage, // > 1.2x
    BelowAverage, // < 0.8x
    Average,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeReading {
    pub current: u64,
    pub average_30d: u64,
    pub vs_average_pct: f64, // current / average * 100
    pub status: VolumeStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,      // 30d realized volatility < 20% annualized
    Moderate, // < 40%
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OverallSignal {
    Bullish,
    Bearish,
    Neutral,
}

/// Everything computed locally from the daily price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: RsiReading,
    pub moving_averages: MovingAverages,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_30d_pct: Option<f64>, // annualized, from daily log returns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub overall_signal: OverallSignal,
}
