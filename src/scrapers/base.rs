use crate::models::stock::{AssetMetadata, PriceBar};
use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for market-data providers
#[async_trait]
pub trait MarketDataSource {
    /// Name of the provider, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch daily bars for `ticker` over `lookback` (e.g. "1y").
    /// Returns bars in chronological order, oldest first.
    async fn fetch_price_history(&self, ticker: &str, lookback: &str) -> Result<Vec<PriceBar>>;

    /// Fetch display name and analyst consensus target.
    /// Fields the provider does not know are left as `None`.
    async fn fetch_metadata(&self, ticker: &str) -> Result<AssetMetadata>;
}
