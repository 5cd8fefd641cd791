//! Market data: predictions, signals, analyzed coins and tickers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::de;
use crate::poller::PollResult;
use crate::transform::{SignalStats, percent_change};

/// One forecast point produced by the prediction model service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    /// Forecast date (`YYYY-MM-DD`).
    pub date: String,
    /// Price at the time of the forecast.
    #[serde(default)]
    pub current_price: Decimal,
    /// Predicted price for `date`.
    #[serde(alias = "prediction")]
    pub predicted_price: Decimal,
    /// Lower confidence bound.
    #[serde(default)]
    pub lower_bound: Decimal,
    /// Upper confidence bound.
    #[serde(default)]
    pub upper_bound: Decimal,
    /// Model accuracy in percent, when reported.
    #[serde(default)]
    pub accuracy: Option<Decimal>,
}

impl PricePrediction {
    /// Percent change from the current to the predicted price.
    pub fn change_percent(&self) -> Option<Decimal> {
        percent_change(self.current_price, self.predicted_price)
    }

    /// Width of the confidence interval.
    pub fn band_width(&self) -> Decimal {
        self.upper_bound - self.lower_bound
    }
}

/// A full predictions payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub predictions: Vec<PricePrediction>,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl PredictionSet {
    /// The first `days` forecast points (the 7- and 30-day views).
    pub fn horizon(&self, days: usize) -> &[PricePrediction] {
        &self.predictions[..days.min(self.predictions.len())]
    }
}

/// A discrete trading recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalKind {
    Buy,
    Sell,
    #[default]
    Wait,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Wait => write!(f, "WAIT"),
        }
    }
}

impl Serialize for SignalKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SignalKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_uppercase().as_str() {
            "BUY" | "STRONG_BUY" => Self::Buy,
            "SELL" | "STRONG_SELL" => Self::Sell,
            _ => Self::Wait,
        })
    }
}

/// Trading signal for a symbol/timeframe pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: String,
    pub signal: SignalKind,
    #[serde(default)]
    pub rsi: Option<Decimal>,
    #[serde(default)]
    pub stochastic: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_change_24h: Option<Decimal>,
}

impl MarketSignal {
    /// Base asset of the symbol (`BTC/USDT` → `BTC`).
    pub fn base_asset(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }
}

/// A coin with its server-side indicator analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedCoin {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub volume: Decimal,
    #[serde(default)]
    pub change_24h: Decimal,
    /// Raw indicator map as produced by the analyzer.
    #[serde(default)]
    pub signals: serde_json::Value,
    #[serde(default, deserialize_with = "de::optional_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A spot ticker from the coin list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTicker {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub price_change_24h: Decimal,
    #[serde(default)]
    pub high_24h: Decimal,
    #[serde(default)]
    pub low_24h: Decimal,
    #[serde(default)]
    pub volume: Decimal,
}

/// A streamed market ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: Decimal,
    /// Change in percent.
    pub change: Decimal,
    pub volume: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub market_open: bool,
}

/// Latest ticker snapshot ("last message wins").
#[derive(Debug, Clone, Default)]
pub struct TickerState {
    pub tickers: Vec<Ticker>,
    pub last_update: Option<DateTime<Utc>>,
    pub connected: bool,
}

/// Dashboard and strategy view state.
#[derive(Debug, Default)]
pub struct MarketState {
    pub predictions: PollResult<PredictionSet>,
    pub signals: PollResult<Vec<MarketSignal>>,
    pub analyzed_coins: PollResult<Vec<AnalyzedCoin>>,
    pub coins: PollResult<Vec<CoinTicker>>,
    pub tickers: TickerState,
    /// Selected row in the signals table.
    pub selected_signal: Option<usize>,
}

impl MarketState {
    pub fn signal_stats(&self) -> SignalStats {
        self.signals
            .data
            .as_deref()
            .map(SignalStats::from_signals)
            .unwrap_or_default()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.data.as_ref().map_or(0, Vec::len)
    }
}
