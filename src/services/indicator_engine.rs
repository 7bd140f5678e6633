use crate::models::stock::{AssetMetadata, IndicatorResult, PriceBar};
use crate::scrapers::base::MarketDataSource;
use crate::errors::{Result, HunterError, Unavailable, UnavailableReason};
use crate::config::Config;
use crate::indicators;
use crate::util;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;

/// Outcome for one ticker in a batch
pub type TickerOutcome = (String, std::result::Result<IndicatorResult, Unavailable>);

/// Computes indicator snapshots for tickers through a market-data source.
///
/// Holds no state between calls; every call fetches fresh bars.
pub struct IndicatorEngine {
    config: Config,
    source: Arc<dyn MarketDataSource + Send + Sync>,
}

impl IndicatorEngine {
    pub fn new(config: Config, source: Arc<dyn MarketDataSource + Send + Sync>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches history and metadata for `ticker` and derives its indicators.
    ///
    /// Any failure yields `Unavailable`; a partially computed result is never
    /// returned.
    pub async fn compute_indicators(&self, ticker: &str) -> std::result::Result<IndicatorResult, Unavailable> {
        match self.try_compute(ticker).await {
            Ok(result) => Ok(result),
            Err(reason) => {
                warn!("{} unavailable from {}: {}", ticker, self.source.source_name(), reason);
                Err(Unavailable::new(ticker, reason))
            }
        }
    }

    async fn try_compute(&self, ticker: &str) -> std::result::Result<IndicatorResult, UnavailableReason> {
        let bars = self.source.fetch_price_history(ticker, &self.config.lookback).await?;
        if bars.is_empty() {
            return Err(UnavailableReason::NoData);
        }

        let metadata = match self.source.fetch_metadata(ticker).await {
            Ok(metadata) => metadata,
            Err(e) if !self.config.require_metadata => {
                warn!("Metadata for {} failed, using fallbacks: {}", ticker, e);
                AssetMetadata::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(build_result(ticker, &bars, &metadata, &self.config)?)
    }

    /// Runs tickers one after another.
    pub async fn compute_batch<S: AsRef<str>>(&self, tickers: &[S]) -> Vec<TickerOutcome> {
        let mut outcomes = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let ticker = ticker.as_ref();
            outcomes.push((ticker.to_string(), self.compute_indicators(ticker).await));
        }
        log_batch_summary(&outcomes);
        outcomes
    }

    /// Runs all tickers concurrently; output order matches input order.
    pub async fn compute_batch_concurrent<S: AsRef<str>>(&self, tickers: &[S]) -> Vec<TickerOutcome> {
        let futures = tickers.iter().map(|ticker| async move {
            let ticker = ticker.as_ref();
            (ticker.to_string(), self.compute_indicators(ticker).await)
        });
        let outcomes = join_all(futures).await;
        log_batch_summary(&outcomes);
        outcomes
    }
}

fn log_batch_summary(outcomes: &[TickerOutcome]) {
    let ok = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
    info!("Computed indicators for {}/{} tickers", ok, outcomes.len());
}

/// Derives an `IndicatorResult` from bars already in hand.
///
/// Needs at least two bars with positive finite prices.
pub fn build_result(
    ticker: &str,
    bars: &[PriceBar],
    metadata: &AssetMetadata,
    config: &Config,
) -> Result<IndicatorResult> {
    if bars.len() < 2 {
        return Err(HunterError::InsufficientHistory(format!(
            "{} has {} bar(s), need at least 2", ticker, bars.len()
        )));
    }
    util::validate_bars(bars)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let latest_price = closes[closes.len() - 1];
    let prior_close = closes[closes.len() - 2];

    let rsi14 = indicators::rsi(&closes, indicators::RSI_PERIOD);
    let ma20 = indicators::sma(&closes, indicators::SHORT_MA_WINDOW);
    let ma50 = indicators::sma(&closes, indicators::LONG_MA_WINDOW);
    let distance_from_ma20 = ma20.map(|ma| indicators::distance_from_average(latest_price, ma));
    let volatility10 = indicators::mean_range(bars, indicators::VOLATILITY_WINDOW)
        .ok_or_else(|| HunterError::DataError(format!("{} has no range data", ticker)))?;

    if rsi14.is_none() {
        debug!("{}: {} bars, RSI{} left absent", ticker, bars.len(), indicators::RSI_PERIOD);
    }

    let analyst_target = metadata
        .target_mean_price
        .unwrap_or(latest_price * config.target_fallback_multiplier);
    let company_name = metadata.long_name.clone().unwrap_or_else(|| ticker.to_string());

    Ok(IndicatorResult {
        ticker: ticker.to_string(),
        company_name,
        latest_price,
        prior_close,
        percent_change: indicators::percent_change(latest_price, prior_close),
        rsi14,
        ma20,
        ma50,
        distance_from_ma20,
        volatility10,
        analyst_target,
        recent_close_series: util::tail(&closes, config.history_len).to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
            })
            .collect()
    }

    #[test]
    fn full_history_populates_every_field() {
        let closes: Vec<f64> = (0..250).map(|i| 30.0 + (i as f64 * 0.3).sin() * 2.0 + i as f64 * 0.01).collect();
        let bars = bars_from_closes(&closes);
        let meta = AssetMetadata {
            long_name: Some("WEG S.A.".to_string()),
            target_mean_price: Some(55.0),
        };

        let result = build_result("WEGE3.SA", &bars, &meta, &Config::new()).unwrap();
        assert_eq!(result.company_name, "WEG S.A.");
        assert_eq!(result.analyst_target, 55.0);
        assert!(result.rsi14.is_some());
        assert!(result.distance_from_ma20.is_some());
        assert_eq!(result.recent_close_series.len(), 60);
        assert_eq!(*result.recent_close_series.last().unwrap(), result.latest_price);
        assert!((result.volatility10 - 2.0).abs() < 1e-9);

        let expected_ma50: f64 = closes[200..].iter().sum::<f64>() / 50.0;
        assert!((result.ma50.unwrap() - expected_ma50).abs() < 1e-9);
    }

    #[test]
    fn short_history_leaves_windows_absent() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let result = build_result("X", &bars_from_closes(&closes), &AssetMetadata::default(), &Config::new()).unwrap();
        assert!(result.rsi14.is_none());
        assert!(result.ma20.is_none());
        assert!(result.ma50.is_none());
        assert!(result.distance_from_ma20.is_none());
        assert_eq!(result.recent_close_series.len(), 10);
    }

    #[test]
    fn metadata_fallbacks_apply() {
        let bars = bars_from_closes(&[10.0, 20.0]);
        let result = build_result("RENT3.SA", &bars, &AssetMetadata::default(), &Config::new()).unwrap();
        assert_eq!(result.company_name, "RENT3.SA");
        assert!((result.analyst_target - 23.0).abs() < 1e-9);
        assert!((result.percent_change - 100.0).abs() < 1e-9);
        assert_eq!(result.prior_close, 10.0);
    }

    #[test]
    fn single_bar_is_insufficient() {
        let bars = bars_from_closes(&[10.0]);
        let err = build_result("X", &bars, &AssetMetadata::default(), &Config::new()).unwrap_err();
        assert!(matches!(err, HunterError::InsufficientHistory(_)));
    }

    #[test]
    fn non_positive_close_is_rejected() {
        let bars = bars_from_closes(&[10.0, 0.0]);
        let err = build_result("X", &bars, &AssetMetadata::default(), &Config::new()).unwrap_err();
        assert!(matches!(err, HunterError::DataError(_)));
    }
}
