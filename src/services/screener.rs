use crate::models::signal::Signal;
use crate::models::stock::IndicatorResult;
use crate::indicators;
use serde::Serialize;
use std::cmp::Ordering;

/// One line of the opportunity table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRow {
    pub ticker: String,
    pub price: f64,
    pub rsi: Option<f64>,
    pub distance_from_ma20: Option<f64>,
    pub signal: Option<Signal>,
}

/// Ranks results by RSI ascending (most oversold first) and keeps the top
/// `limit`. Results without an RSI reading sort last; ties keep input order.
pub fn rank_opportunities(results: &[IndicatorResult], limit: usize) -> Vec<OpportunityRow> {
    let mut ranked: Vec<&IndicatorResult> = results.iter().collect();
    ranked.sort_by(|a, b| match (a.rsi14, b.rsi14) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|r| OpportunityRow {
            ticker: r.ticker.clone(),
            price: r.latest_price,
            rsi: r.rsi14,
            distance_from_ma20: r.distance_from_ma20,
            signal: r.rsi14.map(indicators::classify_signal),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(ticker: &str, rsi: Option<f64>) -> IndicatorResult {
        IndicatorResult {
            ticker: ticker.to_string(),
            company_name: ticker.to_string(),
            latest_price: 20.0,
            prior_close: 20.0,
            percent_change: 0.0,
            rsi14: rsi,
            ma20: None,
            ma50: None,
            distance_from_ma20: None,
            volatility10: 1.0,
            analyst_target: 23.0,
            recent_close_series: vec![20.0],
        }
    }

    #[test]
    fn ranks_by_rsi_with_missing_last() {
        let results = vec![
            result("A", Some(50.0)),
            result("B", None),
            result("C", Some(20.0)),
            result("D", Some(80.0)),
        ];
        let rows = rank_opportunities(&results, 10);
        let order: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "D", "B"]);
        assert_eq!(rows[0].signal, Some(Signal::Oversold));
        assert_eq!(rows[1].signal, Some(Signal::Neutral));
        assert_eq!(rows[2].signal, Some(Signal::Overbought));
        assert_eq!(rows[3].signal, None);
    }

    #[test]
    fn limit_truncates() {
        let results: Vec<IndicatorResult> = (0..15).map(|i| result(&format!("T{}", i), Some(i as f64 * 5.0))).collect();
        let rows = rank_opportunities(&results, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].ticker, "T0");
    }
}
