// src/services/strategies/advanced.rs

use crate::services::indicators;
use crate::services::market_data::ChartSeries;
use crate::services::strategies::{Signal, Strategy};

/// Multi-indicator vote: RSI, MACD histogram and position inside the
/// Bollinger bands each get one voice; two agreeing votes move.
pub struct AdvancedStrategy {
    pub rsi_period: usize,
    pub bollinger_period: usize,
}

impl Default for AdvancedStrategy {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            bollinger_period: 20,
        }
    }
}

impl Strategy for AdvancedStrategy {
    fn name(&self) -> &'static str {
        "ADVANCED_STRATEGY"
    }

    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal {
        let closes = &series.close;
        let Some(&price) = closes.last() else {
            return Signal::Hold;
        };

        let mut bullish = 0;
        let mut bearish = 0;

        if let Some(&rsi) = indicators::rsi(closes, self.rsi_period).last() {
            if rsi < 30.0 {
                bullish += 1;
            } else if rsi > 70.0 {
                bearish += 1;
            }
        }

        let (_, _, histogram) = indicators::macd(closes);
        if let Some(&h) = histogram.last() {
            if h > 0.0 {
                bullish += 1;
            } else if h < 0.0 {
                bearish += 1;
            }
        }

        let (upper, _, lower) = indicators::bollinger(closes, self.bollinger_period, 2.0);
        if let (Some(&u), Some(&l)) = (upper.last(), lower.last()) {
            if price < l {
                bullish += 1;
            } else if price > u {
                bearish += 1;
            }
        }

        if bullish >= 2 && balance > 0.0 {
            Signal::Buy
        } else if bearish >= 2 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
