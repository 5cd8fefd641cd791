//! Signal statistics for the strategy panel.

use crate::state::{MarketSignal, SignalKind};

/// Counts over the latest signal snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalStats {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
}

impl SignalStats {
    /// Count signals by kind.
    pub fn from_signals(signals: &[MarketSignal]) -> Self {
        signals.iter().fold(Self::default(), |mut stats, signal| {
            stats.total += 1;
            match signal.signal {
                SignalKind::Buy => stats.buy += 1,
                SignalKind::Sell => stats.sell += 1,
                SignalKind::Wait => {}
            }
            stats
        })
    }

    /// Signals that are neither BUY nor SELL.
    pub fn wait(&self) -> usize {
        self.total - self.buy - self.sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(symbol: &str, kind: SignalKind) -> MarketSignal {
        MarketSignal {
            symbol: symbol.to_string(),
            timeframe: "1h".to_string(),
            signal: kind,
            rsi: None,
            stochastic: None,
            price: None,
            price_change_24h: None,
        }
    }

    #[test]
    fn test_counts() {
        let signals = vec![
            signal("BTC/USDT", SignalKind::Buy),
            signal("ETH/USDT", SignalKind::Sell),
            signal("SOL/USDT", SignalKind::Buy),
            signal("BNB/USDT", SignalKind::Wait),
        ];
        let stats = SignalStats::from_signals(&signals);
        assert_eq!(
            stats,
            SignalStats {
                total: 4,
                buy: 2,
                sell: 1
            }
        );
        assert_eq!(stats.wait(), 1);
    }

    #[test]
    fn test_empty() {
        assert_eq!(SignalStats::from_signals(&[]), SignalStats::default());
    }
}
