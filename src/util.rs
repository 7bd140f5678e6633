use chrono::{DateTime, Utc};
use chrono_tz::{America, Tz};
use crate::models::stock::PriceBar;
use crate::errors::{Result, HunterError};

/// Current time on the B3 clock.
pub fn now_sao_paulo() -> DateTime<Tz> {
    Utc::now().with_timezone(&America::Sao_Paulo)
}

/// Last `n` elements of `values` (all of them when shorter).
pub fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

/// Rejects bars whose prices cannot feed the indicator math.
pub fn validate_bars(bars: &[PriceBar]) -> Result<()> {
    for bar in bars {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(HunterError::DataError(format!("non-finite price on {}", bar.date)));
        }
        if bar.close <= 0.0 {
            return Err(HunterError::DataError(format!("non-positive close {} on {}", bar.close, bar.date)));
        }
        if bar.high < bar.low {
            return Err(HunterError::DataError(format!(
                "high {} below low {} on {}", bar.high, bar.low, bar.date
            )));
        }
    }

    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(HunterError::DataError(format!(
                "bars out of order at {}", pair[1].date
            )));
        }
    }

    Ok(())
}

/// `R$ 1234.56`
pub fn format_brl(value: f64) -> String {
    format!("R$ {:.2}", value)
}

/// Signed percentage with two decimals, e.g. `+1.25%`.
pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Renders a series as a one-line block sparkline.
pub fn sparkline(values: &[f64]) -> String {
    const TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return String::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    finite
        .iter()
        .map(|v| {
            if span == 0.0 {
                TICKS[TICKS.len() / 2]
            } else {
                let idx = ((v - min) / span * (TICKS.len() - 1) as f64).round() as usize;
                TICKS[idx.min(TICKS.len() - 1)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn tail_handles_short_input() {
        assert_eq!(tail(&[1, 2, 3], 2), &[2, 3]);
        assert_eq!(tail(&[1, 2, 3], 10), &[1, 2, 3]);
    }

    #[test]
    fn validate_rejects_nan_and_disorder() {
        assert!(validate_bars(&[bar(3, 10.0), bar(4, 11.0)]).is_ok());
        assert!(validate_bars(&[bar(3, f64::NAN)]).is_err());
        assert!(validate_bars(&[bar(4, 10.0), bar(3, 11.0)]).is_err());
    }

    #[test]
    fn formats() {
        assert_eq!(format_brl(12.346), "R$ 12.35");
        assert_eq!(format_percent(1.254), "+1.25%");
        assert_eq!(format_percent(-0.5), "-0.50%");
    }

    #[test]
    fn sparkline_spans_low_to_high() {
        assert_eq!(sparkline(&[1.0, 2.0, 3.0]), "▁▅█");
        assert_eq!(sparkline(&[5.0, 5.0]), "▅▅");
        assert_eq!(sparkline(&[]), "");
    }
}
