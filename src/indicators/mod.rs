//! Rolling-window indicator math over daily bars.
//!
//! All functions are pure and take chronological (oldest first) input.
//! Windows that the input cannot fill yield `None` rather than a partial value.

use crate::models::signal::{Signal, TradeLevels};
use crate::models::stock::PriceBar;

pub const RSI_PERIOD: usize = 14;
pub const SHORT_MA_WINDOW: usize = 20;
pub const LONG_MA_WINDOW: usize = 50;
pub const VOLATILITY_WINDOW: usize = 10;

pub const OVERSOLD_BELOW: f64 = 35.0;
pub const OVERBOUGHT_ABOVE: f64 = 65.0;

pub const BUY_VOLATILITY_FACTOR: f64 = 0.8;
pub const TARGET_VOLATILITY_FACTOR: f64 = 1.2;

/// Close-to-close changes; one element shorter than `closes`.
pub fn deltas(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Splits deltas into (gains, losses), both non-negative and the same length.
pub fn split_gains_losses(deltas: &[f64]) -> (Vec<f64>, Vec<f64>) {
    deltas
        .iter()
        .map(|&d| if d > 0.0 { (d, 0.0) } else { (0.0, -d) })
        .unzip()
}

/// Trailing simple average of the last `window` values.
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// RSI from simple trailing means of gains and losses over `period` deltas.
///
/// Requires `period + 1` closes. A window without losses is 100 when it has
/// gains and 50 when it has no movement at all, so the result is always
/// finite and within [0, 100].
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let (gains, losses) = split_gains_losses(&deltas(closes));
    let avg_gain = sma(&gains, period)?;
    let avg_loss = sma(&losses, period)?;
    rsi_from_averages(avg_gain, avg_loss)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let value = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    };

    if value.is_finite() {
        Some(value.clamp(0.0, 100.0))
    } else {
        None
    }
}

/// `(latest / prior - 1) * 100`
pub fn percent_change(latest: f64, prior: f64) -> f64 {
    (latest / prior - 1.0) * 100.0
}

/// Percent deviation of `price` from `average`.
pub fn distance_from_average(price: f64, average: f64) -> f64 {
    (price / average - 1.0) * 100.0
}

/// Mean high-low range over the trailing `window` bars, or over all bars when
/// fewer exist. `None` only for an empty series.
pub fn mean_range(bars: &[PriceBar], window: usize) -> Option<f64> {
    if bars.is_empty() || window == 0 {
        return None;
    }
    let tail = &bars[bars.len().saturating_sub(window)..];
    let total: f64 = tail.iter().map(|b| b.high - b.low).sum();
    Some(total / tail.len() as f64)
}

/// Maps an RSI reading onto exactly one band.
pub fn classify_signal(rsi: f64) -> Signal {
    if rsi < OVERSOLD_BELOW {
        Signal::Oversold
    } else if rsi > OVERBOUGHT_ABOVE {
        Signal::Overbought
    } else {
        Signal::Neutral
    }
}

pub fn trade_levels(price: f64, volatility10: f64) -> TradeLevels {
    TradeLevels {
        buy: price - BUY_VOLATILITY_FACTOR * volatility10,
        target: price + TARGET_VOLATILITY_FACTOR * volatility10,
    }
}
