use std::time::Duration;

/// B3 universe scanned by default, sorted like the screener expects.
pub const DEFAULT_UNIVERSE: [&str; 35] = [
    "ABEV3.SA", "ALOS3.SA", "AZUL4.SA", "BBAS3.SA", "BBDC4.SA", "BPAC11.SA", "CIEL3.SA",
    "COGN3.SA", "CPLE6.SA", "CSNA3.SA", "CVCB3.SA", "CYRE3.SA", "DIRR3.SA", "ELET3.SA",
    "EMBR3.SA", "GGBR4.SA", "GOLL4.SA", "HAPV3.SA", "HYPE3.SA", "ITUB4.SA", "KLBN11.SA",
    "LREN3.SA", "MGLU3.SA", "MRVE3.SA", "PETR4.SA", "PRIO3.SA", "RADL3.SA", "RAIZ4.SA",
    "RENT3.SA", "STBP3.SA", "SUZB3.SA", "TOTS3.SA", "VALE3.SA", "VBBR3.SA", "WEGE3.SA",
];

pub const DEFAULT_FAVORITES: [&str; 4] = ["EMBR3.SA", "RENT3.SA", "DIRR3.SA", "TOTS3.SA"];

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Any response from here sets the session cookie the crumb is bound to.
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub tickers: Vec<String>,
    pub favorites: Vec<String>,
    pub lookback: String,
    pub history_len: usize,
    pub screener_limit: usize,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub min_request_interval: Duration,
    pub target_fallback_multiplier: f64,
    pub require_metadata: bool,
    pub base_url: String,
    pub cookie_url: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            tickers: DEFAULT_UNIVERSE.iter().map(|t| t.to_string()).collect(),
            favorites: DEFAULT_FAVORITES.iter().map(|t| t.to_string()).collect(),
            lookback: "1y".to_string(),
            history_len: 60,
            screener_limit: 10,
            refresh_interval: Duration::from_secs(30 * 60),
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(500),
            target_fallback_multiplier: 1.15,
            require_metadata: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
        }
    }

    /// Replaces the universe; duplicates are dropped keeping first occurrence.
    pub fn with_tickers<S: AsRef<str>>(mut self, tickers: &[S]) -> Self {
        self.tickers = normalize_symbols(tickers);
        self
    }

    pub fn with_favorites<S: AsRef<str>>(mut self, favorites: &[S]) -> Self {
        self.favorites = normalize_symbols(favorites);
        self
    }

    pub fn with_lookback(mut self, lookback: &str) -> Self {
        self.lookback = lookback.to_string();
        self
    }

    pub fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len;
        self
    }

    pub fn with_screener_limit(mut self, limit: usize) -> Self {
        self.screener_limit = limit;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_target_fallback_multiplier(mut self, multiplier: f64) -> Self {
        self.target_fallback_multiplier = multiplier;
        self
    }

    pub fn with_require_metadata(mut self, require: bool) -> Self {
        self.require_metadata = require;
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_cookie_url(mut self, url: &str) -> Self {
        self.cookie_url = url.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

// Trimmed, upper-cased, empty entries skipped, first occurrence wins
fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for s in symbols {
        let symbol = s.as_ref().trim().to_uppercase();
        if symbol.is_empty() || out.contains(&symbol) {
            continue;
        }
        out.push(symbol);
    }
    out
}
