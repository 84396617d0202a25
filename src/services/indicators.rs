/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // We build a running sum using scan, and subtract the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Relative Strength Index (RSI)
///
/// Measures momentum by comparing recent gains to recent losses.
/// RSI values range from 0 to 100:
/// - Below 30: Oversold condition (potential buy signal)
/// - Above 70: Overbought condition (potential sell signal)
/// - 50: Neutral momentum
///
/// Calculation (Wilder smoothing):
/// 1. Calculate price changes (gains and losses)
/// 2. Seed with the simple average over the first `period` changes
/// 3. Smooth with alpha = 1/period afterwards
/// 4. RSI = 100 - (100 / (1 + avg_gain / avg_loss))
///
/// A window with zero average loss reads as exactly 100.
///
/// Returns `None` for the first `period` values, then `Some(rsi)` for subsequent values.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if prices.len() < 2 || period == 0 {
        return vec![None; prices.len()];
    }

    let mut result = vec![None; prices.len()];

    // Calculate price changes
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    if changes.is_empty() {
        return result;
    }

    // Separate gains and losses
    let gains: Vec<f64> = changes.iter().map(|&c| if c > 0.0 { c } else { 0.0 }).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| if c < 0.0 { -c } else { 0.0 }).collect();

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

    // First RSI value (at index period)
    if period < prices.len() {
        result[period] = Some(rsi_from(avg_gain, avg_loss));
    }

    // Calculate subsequent RSI values using Wilder smoothing
    for i in period..changes.len() {
        avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;

        result[i + 1] = Some(rsi_from(avg_gain, avg_loss));
    }

    result
}

/// Mean over the trailing `window` values (fewer if the series is shorter).
/// Unlike `sma` this always produces a value for a non-empty series, which is
/// what the volume comparison wants for young listings.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }

    let start = values.len().saturating_sub(window);
    let slice = &values[start..];

    Some(slice.iter().sum::<f64>() / slice.len() as f64)
}

/// Annualized volatility (in percent) from daily log returns over the
/// trailing `window` days. Needs at least 10 usable returns.
pub fn realized_volatility_pct(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < 2 || window == 0 {
        return None;
    }

    let start = closes.len().saturating_sub(window + 1);
    let slice = &closes[start..];

    let returns: Vec<f64> = slice
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if returns.len() < 10 {
        return None;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (returns.len() - 1) as f64;

    // 252 trading days per year
    Some(variance.sqrt() * 252.0_f64.sqrt() * 100.0)
}
