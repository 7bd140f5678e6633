use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HunterError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, HunterError>;

impl From<String> for HunterError {
    fn from(s: String) -> Self {
        HunterError::Unknown(s)
    }
}

impl From<&str> for HunterError {
    fn from(s: &str) -> Self {
        HunterError::Unknown(s.to_string())
    }
}

/// Why a ticker could not be turned into an `IndicatorResult`.
#[derive(Debug, Clone, PartialEq)]
pub enum UnavailableReason {
    /// The provider answered but returned no price bars.
    NoData,
    /// Fewer bars than the minimum needed for latest/prior close.
    InsufficientHistory,
    /// Bars or metadata could not be interpreted (non-finite prices, bad JSON).
    MalformedData(String),
    /// Network, HTTP status, rate limit or unknown symbol.
    Provider(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NoData => write!(f, "no price data"),
            UnavailableReason::InsufficientHistory => write!(f, "insufficient history"),
            UnavailableReason::MalformedData(msg) => write!(f, "malformed data: {}", msg),
            UnavailableReason::Provider(msg) => write!(f, "provider failure: {}", msg),
        }
    }
}

impl From<HunterError> for UnavailableReason {
    fn from(e: HunterError) -> Self {
        match e {
            HunterError::RequestError(e) => UnavailableReason::Provider(e.to_string()),
            HunterError::ProviderError(msg) => UnavailableReason::Provider(msg),
            HunterError::InsufficientHistory(_) => UnavailableReason::InsufficientHistory,
            HunterError::JsonError(e) => UnavailableReason::MalformedData(e.to_string()),
            HunterError::DateError(e) => UnavailableReason::MalformedData(e.to_string()),
            HunterError::DataError(msg) => UnavailableReason::MalformedData(msg),
            HunterError::Unknown(msg) => UnavailableReason::Provider(msg),
        }
    }
}

/// Per-ticker absence signal returned by the indicator engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{ticker} unavailable: {reason}")]
pub struct Unavailable {
    pub ticker: String,
    pub reason: UnavailableReason,
}

impl Unavailable {
    pub fn new(ticker: &str, reason: impl Into<UnavailableReason>) -> Self {
        Self {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_to_provider_reason() {
        let reason: UnavailableReason = HunterError::ProviderError("Not Found".into()).into();
        assert_eq!(reason, UnavailableReason::Provider("Not Found".to_string()));
    }

    #[test]
    fn data_errors_map_to_malformed() {
        let reason: UnavailableReason = HunterError::DataError("close is NaN".into()).into();
        assert!(matches!(reason, UnavailableReason::MalformedData(_)));
    }

    #[test]
    fn unavailable_display_names_ticker() {
        let u = Unavailable::new("PETR4.SA", UnavailableReason::NoData);
        assert_eq!(u.to_string(), "PETR4.SA unavailable: no price data");
    }
}
