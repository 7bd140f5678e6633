use crate::models::stock::{AssetMetadata, PriceBar};
use crate::errors::{Result, HunterError};
use crate::scrapers::base::MarketDataSource;
use crate::config::Config;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::{America, Tz};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use log::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance chart and quote-summary scraper
///
/// Quote-summary requests need a session cookie plus the crumb issued for it;
/// both are obtained lazily and the crumb is cached until Yahoo rejects it.
pub struct YahooScraper {
    client: Client,
    base_url: String,
    cookie_url: String,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
    crumb: Mutex<Option<String>>,
}

impl YahooScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(HunterError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cookie_url: config.cookie_url.clone(),
            request_interval: config.min_request_interval,
            last_request: Mutex::new(None),
            crumb: Mutex::new(None),
        })
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(time) = *last {
            let elapsed = time.elapsed();
            if elapsed < self.request_interval {
                let wait = self.request_interval - elapsed;
                debug!("Waiting {:?} before next Yahoo request", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }

    async fn fetch_text(&self, url: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String)> {
        self.wait_for_rate_limit().await;

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let (status, text) = self.fetch_text(url, query).await?;
        json_from_response(status, &text)
    }

    /// Returns the cached crumb, priming the session cookie and asking for a
    /// new one when none is cached.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie host answers 404 but still sets the session cookie
        if let Err(e) = self.fetch_text(&self.cookie_url, &[]).await {
            debug!("Cookie priming request failed: {}", e);
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let (status, text) = self.fetch_text(&url, &[]).await?;
        let crumb = text.trim();
        if !status.is_success() || crumb.is_empty() || crumb.contains(|c: char| c == '<' || c == '{' || c.is_whitespace()) {
            return Err(HunterError::ProviderError(format!(
                "could not obtain crumb (HTTP status {})", status
            )));
        }

        debug!("Obtained Yahoo crumb");
        *cached = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

#[async_trait]
impl MarketDataSource for YahooScraper {
    fn source_name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_price_history(&self, ticker: &str, lookback: &str) -> Result<Vec<PriceBar>> {
        debug!("Fetching {} daily bars for {}", lookback, ticker);

        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let json = self
            .get_json(&url, &[("range", lookback), ("interval", "1d"), ("events", "div,splits")])
            .await?;

        let bars = parse_chart(&json)?;
        debug!("Got {} bars for {}", bars.len(), ticker);
        Ok(bars)
    }

    async fn fetch_metadata(&self, ticker: &str) -> Result<AssetMetadata> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, ticker);

        let mut retried = false;
        let json = loop {
            let crumb = self.crumb().await?;
            let query = [("modules", "price,financialData"), ("crumb", crumb.as_str())];
            let (status, text) = self.fetch_text(&url, &query).await?;

            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!("Yahoo rejected crumb for {}, refreshing session", ticker);
                self.invalidate_crumb().await;
                retried = true;
                continue;
            }
            break json_from_response(status, &text)?;
        };

        let metadata = parse_quote_summary(&json)?;
        if metadata.long_name.is_none() || metadata.target_mean_price.is_none() {
            info!("Partial metadata for {}: {:?}", ticker, metadata);
        }
        Ok(metadata)
    }
}

/// Non-success statuses become `ProviderError`, using Yahoo's JSON error
/// description when the body carries one.
fn json_from_response(status: StatusCode, text: &str) -> Result<Value> {
    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|v| provider_error_description(&v))
            .unwrap_or_else(|| format!("HTTP status {}", status.as_u16()));
        return Err(HunterError::ProviderError(detail));
    }

    Ok(serde_json::from_str(text)?)
}

fn provider_error_description(json: &Value) -> Option<String> {
    json.as_object()?
        .values()
        .filter_map(|section| section.get("error"))
        .find(|e| !e.is_null())
        .map(|e| {
            e.get("description")
                .and_then(|d| d.as_str())
                .or_else(|| e.get("code").and_then(|c| c.as_str()))
                .unwrap_or("unknown provider error")
                .to_string()
        })
}

/// Parses a `/v8/finance/chart` response into chronological bars.
///
/// Rows where any of open/high/low/close is null are skipped. Dates are taken
/// in the exchange timezone reported by the response, São Paulo otherwise.
pub fn parse_chart(json: &Value) -> Result<Vec<PriceBar>> {
    if let Some(description) = provider_error_description(json) {
        return Err(HunterError::ProviderError(description));
    }

    let result = json
        .get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| HunterError::DataError("chart response has no result".to_string()))?;

    let tz: Tz = result
        .get("meta")
        .and_then(|m| m.get("exchangeTimezoneName"))
        .and_then(|n| n.as_str())
        .and_then(|n| n.parse().ok())
        .unwrap_or(America::Sao_Paulo);

    let timestamps = match result.get("timestamp").and_then(|t| t.as_array()) {
        Some(ts) => ts,
        None => return Ok(Vec::new()),
    };

    let quote = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|q| q.first())
        .ok_or_else(|| HunterError::DataError("chart response has no quote block".to_string()))?;

    let opens = quote_column(quote, "open")?;
    let highs = quote_column(quote, "high")?;
    let lows = quote_column(quote, "low")?;
    let closes = quote_column(quote, "close")?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let ts = ts
            .as_i64()
            .ok_or_else(|| HunterError::DataError(format!("invalid timestamp {}", ts)))?;

        let value = |col: &Vec<Value>| col.get(i).and_then(|v| v.as_f64());
        let (open, high, low, close) = match (value(opens), value(highs), value(lows), value(closes)) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let date = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| HunterError::DataError(format!("timestamp out of range {}", ts)))?
            .with_timezone(&tz)
            .date_naive();

        bars.push(PriceBar { date, open, high, low, close });
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    // intraday snapshot of the current session can repeat the last date
    bars.dedup_by(|later, earlier| {
        if later.date == earlier.date {
            *earlier = later.clone();
            true
        } else {
            false
        }
    });

    Ok(bars)
}

fn quote_column<'a>(quote: &'a Value, name: &str) -> Result<&'a Vec<Value>> {
    quote
        .get(name)
        .and_then(|c| c.as_array())
        .ok_or_else(|| HunterError::DataError(format!("chart quote missing '{}'", name)))
}

/// Parses a `/v10/finance/quoteSummary` response with `price` and
/// `financialData` modules.
pub fn parse_quote_summary(json: &Value) -> Result<AssetMetadata> {
    if let Some(description) = provider_error_description(json) {
        return Err(HunterError::ProviderError(description));
    }

    let result = json
        .get("quoteSummary")
        .and_then(|q| q.get("result"))
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| HunterError::DataError("quoteSummary response has no result".to_string()))?;

    let long_name = result
        .get("price")
        .and_then(|p| p.get("longName"))
        .and_then(|n| n.as_str())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    // numeric fields come either as {"raw": x, "fmt": "..."} or as a bare number
    let target_mean_price = result
        .get("financialData")
        .and_then(|f| f.get("targetMeanPrice"))
        .and_then(|t| t.get("raw").unwrap_or(t).as_f64())
        .filter(|t| t.is_finite() && *t > 0.0);

    Ok(AssetMetadata { long_name, target_mean_price })
}
