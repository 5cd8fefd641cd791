//! Portfolio positions and their analysis.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::poller::PollResult;

/// Trend classification of a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    #[serde(other)]
    Neutral,
}

/// Size and performance of a holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub amount: Decimal,
    pub avg_price: Decimal,
    /// Profit/loss in percent.
    pub profit_loss: Decimal,
}

/// Server-side analysis of a holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    #[serde(default)]
    pub trend: Trend,
    /// Strength on a 0–10 scale.
    #[serde(default)]
    pub strength: u8,
    #[serde(default)]
    pub target_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub key_metrics: BTreeMap<String, String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// A holding with its market data and analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub change_24h: Decimal,
    pub position: Holding,
    #[serde(default)]
    pub analysis: PositionAnalysis,
}

impl PortfolioPosition {
    /// Current value of the holding.
    pub fn market_value(&self) -> Decimal {
        self.position.amount * self.price
    }

    /// Check if position is profitable.
    pub fn is_profitable(&self) -> bool {
        self.position.profit_loss > Decimal::ZERO
    }
}

/// A named group of positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCategory {
    pub name: String,
    #[serde(default)]
    pub coins: Vec<PortfolioPosition>,
}

/// Portfolio snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub categories: Vec<PortfolioCategory>,
}

impl Portfolio {
    /// All positions across categories, in category order.
    pub fn positions(&self) -> Vec<&PortfolioPosition> {
        self.categories.iter().flat_map(|c| c.coins.iter()).collect()
    }

    /// Sum of market values.
    pub fn total_value(&self) -> Decimal {
        self.positions().iter().map(|p| p.market_value()).sum()
    }

    /// Mean profit/loss percent across positions, `None` when empty.
    pub fn average_profit_loss(&self) -> Option<Decimal> {
        let positions = self.positions();
        if positions.is_empty() {
            return None;
        }
        let total: Decimal = positions.iter().map(|p| p.position.profit_loss).sum();
        Some(total / Decimal::from(positions.len()))
    }

    /// Get profitable positions.
    pub fn profitable_positions(&self) -> Vec<&PortfolioPosition> {
        self.positions()
            .into_iter()
            .filter(|p| p.is_profitable())
            .collect()
    }
}

/// Portfolio tab state.
#[derive(Debug, Default)]
pub struct PortfolioState {
    pub feed: PollResult<Portfolio>,
    pub selected_index: Option<usize>,
}

impl PortfolioState {
    pub fn position_count(&self) -> usize {
        self.feed.data.as_ref().map_or(0, |p| p.positions().len())
    }

    pub fn selected(&self) -> Option<&PortfolioPosition> {
        let index = self.selected_index?;
        self.feed.data.as_ref()?.positions().into_iter().nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Portfolio {
        serde_json::from_str(
            r#"{"categories":[
                {"name":"DeFi","coins":[{"symbol":"BNB","name":"Binance Coin","category":"DeFi",
                  "price":325.75,"change_24h":2.8,
                  "position":{"amount":10.5,"avg_price":280.50,"profit_loss":15.2},
                  "analysis":{"trend":"BULLISH","strength":8,"target_price":400.00,
                              "stop_loss":290.00,"key_metrics":{"market_dominance":"High"},
                              "highlights":["fast finality"]}}]},
                {"name":"DeSci","coins":[{"symbol":"ATOM","price":8.25,
                  "position":{"amount":100,"avg_price":7.50,"profit_loss":-4.0},
                  "analysis":{"trend":"SIDEWAYS","strength":6}}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_flatten_positions() {
        let portfolio = sample();
        let symbols: Vec<_> = portfolio.positions().iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BNB", "ATOM"]);
        assert_eq!(portfolio.positions()[1].analysis.trend, Trend::Neutral);
    }

    #[test]
    fn test_totals() {
        let portfolio = sample();
        // 10.5 * 325.75 + 100 * 8.25
        assert_eq!(portfolio.total_value(), dec!(3420.375) + dec!(825));
        assert_eq!(portfolio.average_profit_loss(), Some(dec!(5.6)));
        assert_eq!(portfolio.profitable_positions().len(), 1);
    }

    #[test]
    fn test_empty_portfolio_has_no_average() {
        assert_eq!(Portfolio::default().average_profit_loss(), None);
    }
}
