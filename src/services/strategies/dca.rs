// src/services/strategies/dca.rs

use crate::services::indicators;
use crate::services::market_data::ChartSeries;
use crate::services::strategies::{Signal, Strategy};

/// Dollar cost averaging: accumulate when price dips below its recent
/// average, otherwise wait. Never sells.
pub struct DcaStrategy {
    pub sma_period: usize,
    /// Buy when the close is below `dip_factor * SMA`.
    pub dip_factor: f64,
}

impl Default for DcaStrategy {
    fn default() -> Self {
        Self {
            sma_period: 20,
            dip_factor: 0.97,
        }
    }
}

impl Strategy for DcaStrategy {
    fn name(&self) -> &'static str {
        "DCA_STRATEGY"
    }

    fn evaluate(&self, series: &ChartSeries, balance: f64) -> Signal {
        let closes = &series.close;
        let Some(&price) = closes.last() else {
            return Signal::Hold;
        };
        let Some(average) = indicators::sma(closes, self.sma_period) else {
            return Signal::Hold;
        };

        if price < average * self.dip_factor && balance > 0.0 {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}
