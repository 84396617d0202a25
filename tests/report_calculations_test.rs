/// Report Calculation Accuracy Tests
///
/// Tests for the indicator, sentiment-blend and source-summary calculations
/// that feed the analyze endpoint's research reports.

// ---------------------------------------------------------------------------
// RSI and Momentum Zones
// ---------------------------------------------------------------------------

#[cfg(test)]
mod rsi_zones {
    /// Wilder-smoothed RSI; a lossless window reads exactly 100.
    fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
        if prices.len() < 2 || period == 0 {
            return vec![None; prices.len()];
        }
        let mut result = vec![None; prices.len()];
        let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

        let gains: Vec<f64> = changes.iter().map(|&c| c.max(0.0)).collect();
        let losses: Vec<f64> = changes.iter().map(|&c| (-c).max(0.0)).collect();

        let alpha = 1.0 / period as f64;
        let mut avg_gain = gains[..period.min(gains.len())].iter().sum::<f64>() / period as f64;
        let mut avg_loss = losses[..period.min(losses.len())].iter().sum::<f64>() / period as f64;

        let rsi_from = |avg_gain: f64, avg_loss: f64| {
            if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
            }
        };

        if period < prices.len() {
            result[period] = Some(rsi_from(avg_gain, avg_loss));
        }

        for i in period..changes.len() {
            avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;
            result[i + 1] = Some(rsi_from(avg_gain, avg_loss));
        }
        result
    }

    fn zone(value: f64) -> &'static str {
        if value >= 70.0 {
            "overbought"
        } else if value >= 60.0 {
            "bullish"
        } else if value >= 40.0 {
            "neutral"
        } else if value >= 30.0 {
            "bearish"
        } else {
            "oversold"
        }
    }

    #[test]
    fn test_rsi_uptrend_reads_high() {
        let uptrend: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let last = rsi(&uptrend, 14).last().and_then(|&v| v).unwrap();
        assert!(last > 70.0, "relentless uptrend should read > 70, got {}", last);
    }

    #[test]
    fn test_rsi_downtrend_reads_low() {
        let downtrend: Vec<f64> = (0..30).map(|i| 80.0 - i as f64).collect();
        let last = rsi(&downtrend, 14).last().and_then(|&v| v).unwrap();
        assert!(last < 30.0, "relentless downtrend should read < 30, got {}", last);
    }

    #[test]
    fn test_rsi_flat_series_reads_exactly_one_hundred() {
        // No losses at all: the gain/loss ratio degenerates and the reading
        // pins to 100 rather than 99.0099...
        let flat = vec![100.0; 30];
        let last = rsi(&flat, 14).last().and_then(|&v| v).unwrap();
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_rsi_stays_in_band() {
        let volatile: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64).sin() * 20.0).collect();
        for value in rsi(&volatile, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(value), "RSI out of range: {}", value);
        }
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(zone(70.0), "overbought");
        assert_eq!(zone(69.9), "bullish");
        assert_eq!(zone(60.0), "bullish");
        assert_eq!(zone(59.9), "neutral");
        assert_eq!(zone(40.0), "neutral");
        assert_eq!(zone(39.9), "bearish");
        assert_eq!(zone(30.0), "bearish");
        assert_eq!(zone(29.9), "oversold");
    }
}

// ---------------------------------------------------------------------------
// Overall Technical Signal
// ---------------------------------------------------------------------------

#[cfg(test)]
mod overall_signal {
    #[derive(Debug, PartialEq, Clone, Copy)]
    enum Position {
        Above,
        Below,
    }

    /// Extreme RSI vetoes the trend call; otherwise the moving averages vote.
    fn signal(rsi: f64, positions: &[Option<Position>]) -> &'static str {
        if rsi >= 70.0 || rsi <= 30.0 {
            return "neutral";
        }

        let votes: i32 = positions
            .iter()
            .flatten()
            .map(|p| match p {
                Position::Above => 1,
                Position::Below => -1,
            })
            .sum();

        if votes >= 1 {
            "bullish"
        } else if votes <= -1 {
            "bearish"
        } else {
            "neutral"
        }
    }

    #[test]
    fn test_all_above_is_bullish() {
        let positions = [Some(Position::Above); 3];
        assert_eq!(signal(55.0, &positions), "bullish");
    }

    #[test]
    fn test_all_below_is_bearish() {
        let positions = [Some(Position::Below); 3];
        assert_eq!(signal(45.0, &positions), "bearish");
    }

    #[test]
    fn test_overbought_vetoes_bullish_positioning() {
        let positions = [Some(Position::Above); 3];
        assert_eq!(signal(75.0, &positions), "neutral");
    }

    #[test]
    fn test_oversold_vetoes_bearish_positioning() {
        let positions = [Some(Position::Below); 3];
        assert_eq!(signal(25.0, &positions), "neutral");
    }

    #[test]
    fn test_veto_boundary_is_inclusive() {
        let positions = [Some(Position::Above); 3];
        assert_eq!(signal(70.0, &positions), "neutral");
        assert_eq!(signal(30.0, &positions), "neutral");
        assert_eq!(signal(69.99, &positions), "bullish");
    }

    #[test]
    fn test_split_votes_cancel_out() {
        // above short average, below long one, third missing
        let positions = [Some(Position::Above), Some(Position::Below), None];
        assert_eq!(signal(50.0, &positions), "neutral");
    }

    #[test]
    fn test_single_available_average_decides() {
        let positions = [Some(Position::Above), None, None];
        assert_eq!(signal(50.0, &positions), "bullish");
    }

    #[test]
    fn test_no_averages_is_neutral() {
        let positions: [Option<Position>; 3] = [None, None, None];
        assert_eq!(signal(50.0, &positions), "neutral");
    }
}

// ---------------------------------------------------------------------------
// Sentiment Blend
// ---------------------------------------------------------------------------

#[cfg(test)]
mod sentiment_blend {
    const FEAR_GREED_WEIGHT: f64 = 0.5;
    const SEARCH_WEIGHT: f64 = 0.3;
    const SOCIAL_WEIGHT: f64 = 0.2;

    /// Weighted average over the present signals, weights renormalized.
    fn blend(
        fear_greed: Option<f64>,
        search: Option<f64>,
        social: Option<f64>,
    ) -> Option<f64> {
        let mut weighted = 0.0;
        let mut total = 0.0;

        if let Some(score) = fear_greed {
            weighted += score * FEAR_GREED_WEIGHT;
            total += FEAR_GREED_WEIGHT;
        }
        if let Some(score) = search {
            weighted += score * SEARCH_WEIGHT;
            total += SEARCH_WEIGHT;
        }
        if let Some(score) = social {
            weighted += score * SOCIAL_WEIGHT;
            total += SOCIAL_WEIGHT;
        }

        if total == 0.0 {
            return None;
        }
        Some(weighted / total)
    }

    fn fear_greed_score(index: u32) -> f64 {
        (f64::from(index) - 50.0) / 50.0
    }

    fn assessment(score: f64) -> &'static str {
        if score >= 0.4 {
            "strongly_bullish"
        } else if score >= 0.1 {
            "leaning_bullish"
        } else if score <= -0.4 {
            "strongly_bearish"
        } else if score <= -0.1 {
            "leaning_bearish"
        } else {
            "neutral"
        }
    }

    #[test]
    fn test_fear_greed_centering() {
        assert_eq!(fear_greed_score(50), 0.0);
        assert_eq!(fear_greed_score(100), 1.0);
        assert_eq!(fear_greed_score(0), -1.0);
        assert!((fear_greed_score(75) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_signals_present() {
        // fg=1.0, search rising=0.5, social high=0.5
        // (0.5 + 0.15 + 0.1) / 1.0 = 0.75
        let score = blend(Some(1.0), Some(0.5), Some(0.5)).unwrap();
        assert!((score - 0.75).abs() < 1e-9);
        assert_eq!(assessment(score), "strongly_bullish");
    }

    #[test]
    fn test_missing_signal_renormalizes() {
        // only fear/greed present: its score passes through untouched
        let score = blend(Some(0.4), None, None).unwrap();
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_two_signals_renormalize() {
        // fg=1.0 (w 0.5), social=-0.3 (w 0.2)
        // (0.5 - 0.06) / 0.7 = 0.62857
        let score = blend(Some(1.0), None, Some(-0.3)).unwrap();
        assert!((score - 0.628_571_428).abs() < 1e-6);
    }

    #[test]
    fn test_no_signals_yields_no_score() {
        assert_eq!(blend(None, None, None), None);
    }

    #[test]
    fn test_assessment_boundaries() {
        assert_eq!(assessment(0.4), "strongly_bullish");
        assert_eq!(assessment(0.39), "leaning_bullish");
        assert_eq!(assessment(0.1), "leaning_bullish");
        assert_eq!(assessment(0.09), "neutral");
        assert_eq!(assessment(-0.09), "neutral");
        assert_eq!(assessment(-0.1), "leaning_bearish");
        assert_eq!(assessment(-0.39), "leaning_bearish");
        assert_eq!(assessment(-0.4), "strongly_bearish");
    }

    #[test]
    fn test_blend_stays_in_unit_range() {
        for fg in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            for search in [Some(-0.5), Some(0.0), Some(0.5), None] {
                for social in [Some(-0.3), Some(0.0), Some(0.5), None] {
                    let score = blend(Some(fg), search, social).unwrap();
                    assert!(
                        (-1.0..=1.0).contains(&score),
                        "blend out of range: {}",
                        score
                    );
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Social Mention Levels
// ---------------------------------------------------------------------------

#[cfg(test)]
mod mention_levels {
    const BASELINE: f64 = 30.0;

    fn level(total: u32) -> &'static str {
        let ratio = f64::from(total) / BASELINE;
        if ratio > 3.0 {
            "high"
        } else if ratio > 1.5 {
            "elevated"
        } else if ratio < 0.5 {
            "low"
        } else {
            "average"
        }
    }

    #[test]
    fn test_silence_is_low() {
        assert_eq!(level(0), "low");
        assert_eq!(level(14), "low");
    }

    #[test]
    fn test_baseline_is_average() {
        assert_eq!(level(15), "average");
        assert_eq!(level(30), "average");
        assert_eq!(level(45), "average");
    }

    #[test]
    fn test_multiples_escalate() {
        assert_eq!(level(46), "elevated");
        assert_eq!(level(90), "elevated");
        assert_eq!(level(91), "high");
        assert_eq!(level(300), "high");
    }
}

// ---------------------------------------------------------------------------
// Volume Status
// ---------------------------------------------------------------------------

#[cfg(test)]
mod volume_status {
    /// Mean over the trailing window, today included.
    fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
        if values.is_empty() || window == 0 {
            return None;
        }
        let take = window.min(values.len());
        let slice = &values[values.len() - take..];
        Some(slice.iter().sum::<f64>() / take as f64)
    }

    fn status(current: f64, average: f64) -> &'static str {
        let ratio = current / average;
        if ratio > 1.5 {
            "elevated"
        } else if ratio > 1.2 {
            "above_average"
        } else if ratio < 0.8 {
            "below_average"
        } else {
            "average"
        }
    }

    #[test]
    fn test_trailing_mean_includes_today() {
        // 29 quiet days then a 2x spike; today is part of its own average
        let mut volumes = vec![1_000_000.0; 29];
        volumes.push(2_000_000.0);
        let mean = trailing_mean(&volumes, 30).unwrap();
        assert!((mean - 1_033_333.333).abs() < 1.0);
    }

    #[test]
    fn test_trailing_mean_short_series_uses_what_exists() {
        let mean = trailing_mean(&[10.0, 20.0, 30.0], 30).unwrap();
        assert!((mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_spike_is_elevated() {
        assert_eq!(status(2_000_000.0, 1_000_000.0), "elevated");
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(status(1_500_001.0, 1_000_000.0), "elevated");
        assert_eq!(status(1_500_000.0, 1_000_000.0), "above_average");
        assert_eq!(status(1_200_000.0, 1_000_000.0), "average");
        assert_eq!(status(1_000_000.0, 1_000_000.0), "average");
        assert_eq!(status(800_000.0, 1_000_000.0), "average");
        assert_eq!(status(799_999.0, 1_000_000.0), "below_average");
    }
}

// ---------------------------------------------------------------------------
// Fear & Greed Interpretation Bands
// ---------------------------------------------------------------------------

#[cfg(test)]
mod fear_greed_bands {
    fn band(value: u32) -> &'static str {
        if value <= 25 {
            "extreme_fear"
        } else if value <= 45 {
            "fear"
        } else if value <= 55 {
            "neutral"
        } else if value <= 75 {
            "greed"
        } else {
            "extreme_greed"
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(band(0), "extreme_fear");
        assert_eq!(band(25), "extreme_fear");
        assert_eq!(band(26), "fear");
        assert_eq!(band(45), "fear");
        assert_eq!(band(46), "neutral");
        assert_eq!(band(55), "neutral");
        assert_eq!(band(56), "greed");
        assert_eq!(band(75), "greed");
        assert_eq!(band(76), "extreme_greed");
        assert_eq!(band(100), "extreme_greed");
    }
}

// ---------------------------------------------------------------------------
// Search Interest Trend
// ---------------------------------------------------------------------------

#[cfg(test)]
mod search_trend {
    /// Last week's average against everything before it.
    fn direction(values: &[u32]) -> &'static str {
        if values.len() < 14 {
            return "stable";
        }
        let split = values.len() - 7;
        let recent = values[split..].iter().map(|v| f64::from(*v)).sum::<f64>() / 7.0;
        let earlier = values[..split].iter().map(|v| f64::from(*v)).sum::<f64>() / split as f64;

        if earlier == 0.0 && recent > 0.0 {
            "rising"
        } else if earlier > 0.0 && recent > earlier * 1.2 {
            "rising"
        } else if earlier > 0.0 && recent < earlier * 0.8 {
            "falling"
        } else {
            "stable"
        }
    }

    fn change_7d_pct(values: &[u32]) -> Option<f64> {
        if values.len() < 8 {
            return None;
        }
        let current = f64::from(*values.last()?);
        let prior = f64::from(values[values.len() - 8]);
        if prior > 0.0 {
            Some((current - prior) / prior * 100.0)
        } else {
            None
        }
    }

    #[test]
    fn test_hot_week_is_rising() {
        let mut values = vec![10u32; 21];
        values.extend([25; 7]);
        assert_eq!(direction(&values), "rising");
    }

    #[test]
    fn test_cooling_week_is_falling() {
        let mut values = vec![50u32; 21];
        values.extend([30; 7]);
        assert_eq!(direction(&values), "falling");
    }

    #[test]
    fn test_steady_interest_is_stable() {
        let values = vec![40u32; 28];
        assert_eq!(direction(&values), "stable");
    }

    #[test]
    fn test_interest_from_nothing_is_rising() {
        let mut values = vec![0u32; 21];
        values.extend([5; 7]);
        assert_eq!(direction(&values), "rising");
    }

    #[test]
    fn test_short_series_is_stable() {
        assert_eq!(direction(&[10, 90, 10, 90]), "stable");
    }

    #[test]
    fn test_change_week_over_week() {
        let mut values = vec![50u32; 21];
        values.extend([60; 7]);
        // compares to the value 7 days before the last one
        let change = change_7d_pct(&values).unwrap();
        assert!((change - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_undefined_against_zero_base() {
        let mut values = vec![0u32; 8];
        values.push(50);
        assert_eq!(change_7d_pct(&values[1..]), None);
    }
}

// ---------------------------------------------------------------------------
// Report Arithmetic
// ---------------------------------------------------------------------------

#[cfg(test)]
mod report_arithmetic {
    fn price_change_pct(current: f64, prev: Option<f64>) -> f64 {
        match prev {
            Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
            _ => 0.0,
        }
    }

    fn put_call_ratio(put_volume: u64, call_volume: u64) -> Option<f64> {
        if call_volume == 0 {
            return None;
        }
        Some(put_volume as f64 / call_volume as f64)
    }

    #[test]
    fn test_day_change_pct() {
        let pct = price_change_pct(110.0, Some(100.0));
        assert!((pct - 10.0).abs() < 1e-9);

        let pct = price_change_pct(95.0, Some(100.0));
        assert!((pct - (-5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_day_change_without_prior_close() {
        assert_eq!(price_change_pct(110.0, None), 0.0);
        assert_eq!(price_change_pct(110.0, Some(0.0)), 0.0);
    }

    #[test]
    fn test_put_call_ratio() {
        let ratio = put_call_ratio(8_000, 10_000).unwrap();
        assert!((ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_put_call_ratio_without_call_volume() {
        assert_eq!(put_call_ratio(8_000, 0), None);
    }

    #[test]
    fn test_bearish_skew_reads_above_one() {
        let ratio = put_call_ratio(15_000, 10_000).unwrap();
        assert!(ratio > 1.0, "more puts than calls should read above 1.0");
    }
}
