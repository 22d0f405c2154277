// src/services/strategies/grid.rs

use crate::services::market_data::ChartSeries;
use crate::services::strategies::{Signal, Strategy};

/// Range trading: buy near the bottom of the recent range, sell near the
/// top, hold in the middle band. Useful for sideways markets.
pub struct GridTradingStrategy {
    pub lookback: usize,
    /// Fraction of the range treated as the buy zone (and, mirrored,
    /// the sell zone).
    pub edge_fraction: f64,
}

impl Default for GridTradingStrategy {
    fn default() -> Self {
        Self {
            lookback: 50,
            edge_fraction: 0.25,
        }
    }
}

impl Strategy for GridTradingStrategy {
    fn name(&self) -> &'static str {
        "GRID_TRADING_STRATEGY"
    }

    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal {
        let closes = &series.close;
        let Some(&price) = closes.last() else {
            return Signal::Hold;
        };
        let window = &closes[closes.len().saturating_sub(self.lookback)..];

        let low = window.iter().cloned().fold(f64::MAX, f64::min);
        let high = window.iter().cloned().fold(f64::MIN, f64::max);
        let range = high - low;
        if range <= 0.0 {
            return Signal::Hold;
        }

        let position = (price - low) / range;

        if position <= self.edge_fraction && balance > 0.0 {
            Signal::Buy
        } else if position >= 1.0 - self.edge_fraction {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::strategies::series_from_closes;

    fn range_series(last: f64) -> ChartSeries {
        // oscillates between 90 and 110, then closes at `last`
        let mut closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 90.0 } else { 110.0 })
            .collect();
        closes.push(last);
        series_from_closes(&closes)
    }

    #[test]
    fn bottom_of_the_range_buys() {
        let series = range_series(91.0);
        assert_eq!(
            GridTradingStrategy::default().evaluate(&series, 1_000.0),
            Signal::Buy
        );
    }

    #[test]
    fn top_of_the_range_sells() {
        let series = range_series(109.0);
        assert_eq!(
            GridTradingStrategy::default().evaluate(&series, 1_000.0),
            Signal::Sell
        );
    }

    #[test]
    fn middle_of_the_range_holds() {
        let series = range_series(100.0);
        assert_eq!(
            GridTradingStrategy::default().evaluate(&series, 1_000.0),
            Signal::Hold
        );
    }

    #[test]
    fn flat_range_holds() {
        let series = series_from_closes(&[100.0; 30]);
        assert_eq!(
            GridTradingStrategy::default().evaluate(&series, 1_000.0),
            Signal::Hold
        );
    }
}
