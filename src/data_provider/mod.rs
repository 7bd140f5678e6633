use chrono::DateTime;
use chrono_tz::Tz;
use log::info;

use crate::models::stock::IndicatorResult;
use crate::errors::Unavailable;
use crate::services::indicator_engine::TickerOutcome;
use crate::util;
use std::collections::HashMap;

/// Results of one refresh cycle.
///
/// Built once from a batch and never mutated; the next cycle builds a new one.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    taken_at: DateTime<Tz>,
    results: Vec<IndicatorResult>,
    unavailable: Vec<Unavailable>,
    // ticker -> position in `results`
    ticker_index: HashMap<String, usize>,
}

impl DashboardSnapshot {
    /// Splits batch outcomes into results and unavailable tickers, keeping
    /// the batch order.
    pub fn from_outcomes(outcomes: Vec<TickerOutcome>) -> Self {
        Self::from_outcomes_at(outcomes, util::now_sao_paulo())
    }

    pub fn from_outcomes_at(outcomes: Vec<TickerOutcome>, taken_at: DateTime<Tz>) -> Self {
        let mut results = Vec::new();
        let mut unavailable = Vec::new();

        for (_, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(u) => unavailable.push(u),
            }
        }

        let ticker_index = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.ticker.clone(), i))
            .collect();

        info!(
            "Snapshot at {}: {} available, {} unavailable",
            taken_at.format("%H:%M:%S"),
            results.len(),
            unavailable.len()
        );

        Self { taken_at, results, unavailable, ticker_index }
    }

    pub fn taken_at(&self) -> &DateTime<Tz> {
        &self.taken_at
    }

    pub fn results(&self) -> &[IndicatorResult] {
        &self.results
    }

    pub fn unavailable(&self) -> &[Unavailable] {
        &self.unavailable
    }

    pub fn get(&self, ticker: &str) -> Option<&IndicatorResult> {
        self.ticker_index.get(ticker).map(|&idx| &self.results[idx])
    }

    /// Results for `tickers` in the given order, skipping unavailable ones.
    pub fn select<S: AsRef<str>>(&self, tickers: &[S]) -> Vec<&IndicatorResult> {
        tickers.iter().filter_map(|t| self.get(t.as_ref())).collect()
    }

    pub fn unavailable_reason(&self, ticker: &str) -> Option<&Unavailable> {
        self.unavailable.iter().find(|u| u.ticker == ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UnavailableReason;

    fn result(ticker: &str, rsi: f64) -> IndicatorResult {
        IndicatorResult {
            ticker: ticker.to_string(),
            company_name: ticker.to_string(),
            latest_price: 10.0,
            prior_close: 9.5,
            percent_change: 5.26,
            rsi14: Some(rsi),
            ma20: Some(9.8),
            ma50: None,
            distance_from_ma20: Some(2.0),
            volatility10: 0.4,
            analyst_target: 11.5,
            recent_close_series: vec![9.5, 10.0],
        }
    }

    #[test]
    fn splits_and_indexes_outcomes() {
        let outcomes = vec![
            ("A.SA".to_string(), Ok(result("A.SA", 30.0))),
            ("B.SA".to_string(), Err(Unavailable::new("B.SA", UnavailableReason::NoData))),
            ("C.SA".to_string(), Ok(result("C.SA", 70.0))),
        ];
        let snapshot = DashboardSnapshot::from_outcomes(outcomes);

        assert_eq!(snapshot.results().len(), 2);
        assert_eq!(snapshot.get("C.SA").unwrap().rsi14, Some(70.0));
        assert!(snapshot.get("B.SA").is_none());
        assert_eq!(snapshot.unavailable_reason("B.SA").unwrap().reason, UnavailableReason::NoData);

        let picked: Vec<&str> = snapshot
            .select(&["C.SA", "B.SA", "A.SA"])
            .iter()
            .map(|r| r.ticker.as_str())
            .collect();
        assert_eq!(picked, vec!["C.SA", "A.SA"]);
    }
}
