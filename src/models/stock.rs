use chrono::NaiveDate;
use serde::Serialize;

/// One trading session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Supplementary fields from the provider's quote metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetMetadata {
    pub long_name: Option<String>,
    pub target_mean_price: Option<f64>,
}

/// Indicators for one ticker, recomputed on every refresh.
///
/// Optional fields are absent when the history is shorter than the window
/// the indicator needs; everything else is always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub ticker: String,
    pub company_name: String,
    pub latest_price: f64,
    pub prior_close: f64,
    pub percent_change: f64,
    pub rsi14: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub distance_from_ma20: Option<f64>,
    pub volatility10: f64,
    pub analyst_target: f64,
    pub recent_close_series: Vec<f64>,
}
