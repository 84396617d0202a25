use crate::config::{MA_PERIODS, MIN_SERIES_LEN, RSI_PERIOD, VOLUME_LOOKBACK_DAYS};
use crate::external::market_data::PriceHistory;
use crate::models::{
    MovingAverages, OverallSignal, PricePosition, RiskLevel, RsiReading, RsiZone,
    TechnicalSnapshot, VolumeReading, VolumeStatus,
};
use crate::services::indicators;

/// Computes the full technical section from a daily history. Errs when the
/// series is too short to say anything defensible.
pub fn build_snapshot(history: &PriceHistory) -> Result<TechnicalSnapshot, String> {
    let closes = history.closes();

    if closes.len() < MIN_SERIES_LEN {
        return Err(format!(
            "insufficient history: {} daily closes, need {}",
            closes.len(),
            MIN_SERIES_LEN
        ));
    }

    let current_price = closes[closes.len() - 1];

    let rsi_value = indicators::rsi(&closes, RSI_PERIOD)
        .last()
        .and_then(|v| *v)
        .ok_or_else(|| "series shorter than the RSI window".to_string())?;

    let moving_averages = build_moving_averages(&closes, current_price);
    let volume = build_volume(history);
    let volatility_30d_pct = indicators::realized_volatility_pct(&closes, VOLUME_LOOKBACK_DAYS);
    let risk_level = volatility_30d_pct.map(risk_level_from_volatility);
    let overall_signal = overall_signal(rsi_value, &moving_averages);

    Ok(TechnicalSnapshot {
        rsi: rsi_reading(rsi_value),
        moving_averages,
        volume,
        volatility_30d_pct,
        risk_level,
        overall_signal,
    })
}

fn rsi_reading(value: f64) -> RsiReading {
    let (zone, interpretation) = if value >= 70.0 {
        (
            RsiZone::Overbought,
            "Overbought. The recent run-up may be stretched; pullbacks are common from here.",
        )
    } else if value >= 60.0 {
        (
            RsiZone::Bullish,
            "Bullish momentum. Buyers are in control without being overheated.",
        )
    } else if value >= 40.0 {
        (
            RsiZone::Neutral,
            "Neutral momentum. Neither buyers nor sellers clearly dominate.",
        )
    } else if value >= 30.0 {
        (
            RsiZone::Bearish,
            "Bearish momentum. Sellers currently have the upper hand.",
        )
    } else {
        (
            RsiZone::Oversold,
            "Oversold. Heavy selling may be exhausting itself; bounces are common from here.",
        )
    };

    RsiReading {
        value,
        zone,
        interpretation: interpretation.to_string(),
    }
}

fn last_sma(closes: &[f64], window: usize) -> Option<f64> {
    indicators::sma(closes, window).last().and_then(|v| *v)
}

fn position(current: f64, ma: Option<f64>) -> Option<PricePosition> {
    ma.map(|m| {
        if current > m {
            PricePosition::Above
        } else {
            PricePosition::Below
        }
    })
}

fn build_moving_averages(closes: &[f64], current_price: f64) -> MovingAverages {
    let [w20, w50, w200] = MA_PERIODS;

    let ma_20 = last_sma(closes, w20);
    let ma_50 = last_sma(closes, w50);
    let ma_200 = last_sma(closes, w200);

    MovingAverages {
        price_vs_ma_20: position(current_price, ma_20),
        price_vs_ma_50: position(current_price, ma_50),
        price_vs_ma_200: position(current_price, ma_200),
        ma_20,
        ma_50,
        ma_200,
    }
}

fn build_volume(history: &PriceHistory) -> Option<VolumeReading> {
    let current = history.bars.last()?.volume?;

    let volumes: Vec<f64> = history
        .bars
        .iter()
        .filter_map(|b| b.volume.map(|v| v as f64))
        .collect();

    // The trailing window includes today, matching how traders quote "vs 30d avg"
    let average = indicators::trailing_mean(&volumes, VOLUME_LOOKBACK_DAYS)?;
    if average <= 0.0 {
        return None;
    }

    let ratio = current as f64 / average;

    let status = if ratio > 1.5 {
        VolumeStatus::Elevated
    } else if ratio > 1.2 {
        VolumeStatus::AboveAverage
    } else if ratio < 0.8 {
        VolumeStatus::BelowAverage
    } else {
        VolumeStatus::Average
    };

    Some(VolumeReading {
        current,
        average_30d: average.round() as u64,
        vs_average_pct: ratio * 100.0,
        status,
    })
}

fn risk_level_from_volatility(volatility_pct: f64) -> RiskLevel {
    if volatility_pct < 20.0 {
        RiskLevel::Low
    } else if volatility_pct < 40.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

/// Momentum call from MA positioning, vetoed by extreme RSI. An overbought
/// or oversold reading turns the call neutral rather than chasing it.
fn overall_signal(rsi_value: f64, mas: &MovingAverages) -> OverallSignal {
    if rsi_value >= 70.0 || rsi_value <= 30.0 {
        return OverallSignal::Neutral;
    }

    let votes: i32 = [mas.price_vs_ma_20, mas.price_vs_ma_50, mas.price_vs_ma_200]
        .iter()
        .flatten()
        .map(|p| match p {
            PricePosition::Above => 1,
            PricePosition::Below => -1,
        })
        .sum();

    if votes >= 1 {
        OverallSignal::Bullish
    } else if votes <= -1 {
        OverallSignal::Bearish
    } else {
        OverallSignal::Neutral
    }
}
