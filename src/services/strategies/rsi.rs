// src/services/strategies/rsi.rs

use crate::services::indicators;
use crate::services::market_data::ChartSeries;
use crate::services::strategies::{Signal, Strategy};

/// Classic oversold/overbought RSI play.
pub struct RsiStrategy {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &'static str {
        "RSI_STRATEGY"
    }

    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal {
        let rsi = indicators::rsi(&series.close, self.period);
        let Some(&current) = rsi.last() else {
            return Signal::Hold;
        };

        if current < self.oversold && balance > 0.0 {
            Signal::Buy
        } else if current > self.overbought {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
