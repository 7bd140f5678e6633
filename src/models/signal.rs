use serde::Serialize;

/// Momentum band derived from RSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    Oversold,
    Overbought,
    Neutral,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Oversold => "Oversold / technical opportunity",
            Signal::Overbought => "Overbought / exhaustion risk",
            Signal::Neutral => "Consolidation / neutral",
        }
    }

    /// Card commentary for the band.
    pub fn commentary(&self) -> &'static str {
        match self {
            Signal::Oversold => {
                "Trading under heavy pessimism. Price sits below recent support, \
                 which often precedes a rebound."
            }
            Signal::Overbought => {
                "Stretched move. Buying pressure has peaked and a pullback toward \
                 the 20-session average is likely."
            }
            Signal::Neutral => {
                "Balanced zone. Suits gradual accumulation without chasing an entry."
            }
        }
    }

    /// Short status used in the opportunity table.
    pub fn status(&self) -> &'static str {
        match self {
            Signal::Oversold => "BUY",
            Signal::Overbought => "EXHAUSTED",
            Signal::Neutral => "NEUTRAL",
        }
    }
}

/// Suggested entry and exit levels around the latest price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeLevels {
    pub buy: f64,
    pub target: f64,
}
